//! Term Emitter
//!
//! Streaming serialization of [`Term`]s. The emitter receives the
//! open/close/append protocol and is the only place concrete syntax lives.

use crate::{Num, Term};

/// Receiver of the term-construction protocol.
///
/// Calls arrive in positional order: `open_*`, then each child, then the
/// matching `close_*`. Literal payloads are appended with [`string`],
/// [`boolean`] and [`number`].
///
/// [`string`]: TermEmitter::string
/// [`boolean`]: TermEmitter::boolean
/// [`number`]: TermEmitter::number
pub trait TermEmitter {
    fn open_ctor(&mut self, name: &'static str);
    fn close_ctor(&mut self);
    fn open_list(&mut self);
    fn close_list(&mut self);
    fn open_tuple(&mut self);
    fn close_tuple(&mut self);
    fn string(&mut self, s: &str);
    fn boolean(&mut self, b: bool);
    fn number(&mut self, n: Num);
}

#[derive(Debug)]
enum Frame {
    /// The head is written lazily so nullary constructors render bare.
    Ctor { name: &'static str, opened: bool },
    List { count: usize },
    Tuple { count: usize },
}

/// Renders Gallina syntax into a string buffer.
///
/// - constructor application: `(C a b)`, or `C` with no arguments
/// - list: `nil` or `(a :: b :: nil)`
/// - tuple: `(a, b)`
/// - string: `"..."` with `"` doubled
/// - numbers: `3%N`, `(-3)%Z`
///
/// Consecutive top-level terms are separated by a newline.
#[derive(Debug, Default)]
pub struct CoqEmitter {
    buffer: String,
    frames: Vec<Frame>,
    top_level: usize,
}

impl CoqEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        CoqEmitter {
            buffer: String::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Every opened constructor, list and tuple has been closed.
    pub fn is_balanced(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn output(self) -> String {
        self.buffer
    }

    /// Separator bookkeeping before any child or payload.
    fn begin_item(&mut self) {
        match self.frames.last_mut() {
            Some(Frame::Ctor { name, opened }) => {
                if !*opened {
                    self.buffer.push('(');
                    self.buffer.push_str(name);
                    *opened = true;
                }
                self.buffer.push(' ');
            }
            Some(Frame::List { count }) => {
                self.buffer.push_str(if *count == 0 { "(" } else { " :: " });
                *count += 1;
            }
            Some(Frame::Tuple { count }) => {
                self.buffer.push_str(if *count == 0 { "(" } else { ", " });
                *count += 1;
            }
            None => {
                if self.top_level > 0 {
                    self.buffer.push('\n');
                }
                self.top_level += 1;
            }
        }
    }
}

impl TermEmitter for CoqEmitter {
    fn open_ctor(&mut self, name: &'static str) {
        self.begin_item();
        self.frames.push(Frame::Ctor {
            name,
            opened: false,
        });
    }

    fn close_ctor(&mut self) {
        match self.frames.pop() {
            Some(Frame::Ctor { opened: true, .. }) => self.buffer.push(')'),
            Some(Frame::Ctor { name, opened: false }) => self.buffer.push_str(name),
            // Mismatched close: keep the frame so `is_balanced` reports it.
            Some(other) => self.frames.push(other),
            None => {}
        }
    }

    fn open_list(&mut self) {
        self.begin_item();
        self.frames.push(Frame::List { count: 0 });
    }

    fn close_list(&mut self) {
        match self.frames.pop() {
            Some(Frame::List { count: 0 }) => self.buffer.push_str("nil"),
            Some(Frame::List { .. }) => self.buffer.push_str(" :: nil)"),
            Some(other) => self.frames.push(other),
            None => {}
        }
    }

    fn open_tuple(&mut self) {
        self.begin_item();
        self.frames.push(Frame::Tuple { count: 0 });
    }

    fn close_tuple(&mut self) {
        match self.frames.pop() {
            Some(Frame::Tuple { count: 0 }) => self.buffer.push_str("tt"),
            Some(Frame::Tuple { .. }) => self.buffer.push(')'),
            Some(other) => self.frames.push(other),
            None => {}
        }
    }

    fn string(&mut self, s: &str) {
        self.begin_item();
        self.buffer.push('"');
        for c in s.chars() {
            if c == '"' {
                self.buffer.push('"');
            }
            self.buffer.push(c);
        }
        self.buffer.push('"');
    }

    fn boolean(&mut self, b: bool) {
        self.begin_item();
        self.buffer.push_str(if b { "true" } else { "false" });
    }

    fn number(&mut self, n: Num) {
        use std::fmt::Write;
        self.begin_item();
        let _ = write!(self.buffer, "{n}");
    }
}

/// Render a single term with [`CoqEmitter`].
pub fn render(term: &Term) -> String {
    let mut emitter = CoqEmitter::with_capacity(256);
    term.emit(&mut emitter);
    emitter.output()
}
