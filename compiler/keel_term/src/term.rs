//! The [`Term`] tree.

use std::fmt;

use crate::{CoqEmitter, TermEmitter};

/// Numeric payload: a natural (`%N`) or an integer (`%Z`).
///
/// Integers are kept as sign plus magnitude so both the full signed and the
/// full unsigned 128-bit range are representable.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Num {
    Nat(u128),
    Int { negative: bool, magnitude: u128 },
}

impl Num {
    pub fn nat(value: u128) -> Self {
        Num::Nat(value)
    }

    pub fn int(value: i128) -> Self {
        Num::Int {
            negative: value < 0,
            magnitude: value.unsigned_abs(),
        }
    }

    /// A non-negative integer too large for `i128`.
    pub fn int_unsigned(value: u128) -> Self {
        Num::Int {
            negative: false,
            magnitude: value,
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Num::Nat(n) => write!(f, "{n}%N"),
            Num::Int {
                negative: true,
                magnitude,
            } if magnitude != 0 => write!(f, "(-{magnitude})%Z"),
            Num::Int { magnitude, .. } => write!(f, "{magnitude}%Z"),
        }
    }
}

/// A serialized semantic term.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Term {
    /// Constructor application; no arguments renders as a bare constant.
    Ctor {
        name: &'static str,
        args: Vec<Term>,
    },
    Str(String),
    Bool(bool),
    Num(Num),
    List(Vec<Term>),
    Tuple(Vec<Term>),
}

impl Term {
    pub fn ctor(name: &'static str, args: Vec<Term>) -> Self {
        Term::Ctor { name, args }
    }

    /// Nullary constructor.
    pub fn atom(name: &'static str) -> Self {
        Term::Ctor {
            name,
            args: Vec::new(),
        }
    }

    pub fn str(s: impl Into<String>) -> Self {
        Term::Str(s.into())
    }

    pub fn bool(b: bool) -> Self {
        Term::Bool(b)
    }

    pub fn nat(n: impl Into<u128>) -> Self {
        Term::Num(Num::nat(n.into()))
    }

    pub fn int(z: impl Into<i128>) -> Self {
        Term::Num(Num::int(z.into()))
    }

    pub fn list(items: impl IntoIterator<Item = Term>) -> Self {
        Term::List(items.into_iter().collect())
    }

    pub fn pair(a: Term, b: Term) -> Self {
        Term::Tuple(vec![a, b])
    }

    pub fn some(t: Term) -> Self {
        Term::ctor("Some", vec![t])
    }

    pub fn none() -> Self {
        Term::atom("None")
    }

    pub fn option(t: Option<Term>) -> Self {
        t.map_or_else(Term::none, Term::some)
    }

    pub fn inl(t: Term) -> Self {
        Term::ctor("inl", vec![t])
    }

    pub fn inr(t: Term) -> Self {
        Term::ctor("inr", vec![t])
    }

    /// Constructor name, if this is a constructor application.
    pub fn head(&self) -> Option<&'static str> {
        match self {
            Term::Ctor { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Constructor arguments; empty for non-constructors.
    pub fn args(&self) -> &[Term] {
        match self {
            Term::Ctor { args, .. } => args,
            _ => &[],
        }
    }

    /// Stream this term into `out`, children in positional order.
    pub fn emit<E: TermEmitter + ?Sized>(&self, out: &mut E) {
        match self {
            Term::Ctor { name, args } => {
                out.open_ctor(name);
                for arg in args {
                    arg.emit(out);
                }
                out.close_ctor();
            }
            Term::Str(s) => out.string(s),
            Term::Bool(b) => out.boolean(*b),
            Term::Num(n) => out.number(*n),
            Term::List(items) => {
                out.open_list();
                for item in items {
                    item.emit(out);
                }
                out.close_list();
            }
            Term::Tuple(items) => {
                out.open_tuple();
                for item in items {
                    item.emit(out);
                }
                out.close_tuple();
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut emitter = CoqEmitter::new();
        self.emit(&mut emitter);
        f.write_str(&emitter.output())
    }
}
