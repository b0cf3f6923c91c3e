//! Itanium C++ ABI symbol mangling.
//!
//! Best-effort host compatibility: nested names, local names, cv-qualified
//! methods, constructors, destructors, operators, builtin and compound
//! types and template arguments are encoded as the ABI specifies.
//! Substitution compression (`S_`, `S0_`, ...) is not applied, so symbols
//! that repeat a component are longer than the host's.

use std::fmt::Write;

use smallvec::SmallVec;

use keel_ir::{
    BuiltinType, Decl, DeclId, DeclKind, FunctionDecl, OverloadedOperator, Qualifiers,
    TemplateArg, TranslationUnit, TypeId, TypeKind,
};

use super::{anon_kind, HostMangler};

const PREFIX: &str = "_Z";

/// Mangler producing Itanium ABI symbols.
#[derive(Copy, Clone, Debug, Default)]
pub struct ItaniumMangler;

impl HostMangler for ItaniumMangler {
    fn mangle_decl(&self, unit: &TranslationUnit, id: DeclId) -> Option<String> {
        let decl = unit.decl(id);
        if decl.templated {
            return None;
        }
        let mut out = String::with_capacity(64);
        out.push_str(PREFIX);
        match &decl.kind {
            DeclKind::Function(f) => {
                let leaf = self.function_leaf(unit, decl, f, f.params.len())?;
                self.push_name(unit, id, &leaf, Qualifiers::NONE, &mut out)?;
                self.push_signature(unit, f, &mut out)?;
            }
            DeclKind::Method(m) => {
                let operands = m.func.params.len() + usize::from(!m.is_static);
                let leaf = self.function_leaf(unit, decl, &m.func, operands)?;
                let quals = if m.is_static { Qualifiers::NONE } else { m.quals };
                self.push_name(unit, id, &leaf, quals, &mut out)?;
                self.push_signature(unit, &m.func, &mut out)?;
            }
            DeclKind::Constructor(c) => {
                self.push_name(unit, id, "C1", Qualifiers::NONE, &mut out)?;
                self.push_params(unit, &c.params, c.variadic, &mut out)?;
            }
            DeclKind::Destructor(_) => {
                self.push_name(unit, id, "D0", Qualifiers::NONE, &mut out)?;
                out.push('v');
            }
            DeclKind::Variable(_) => {
                let leaf = source_name(decl.name.as_deref()?);
                self.push_name(unit, id, &leaf, Qualifiers::NONE, &mut out)?;
            }
            _ => return None,
        }
        Some(out)
    }

    fn mangle_type(&self, unit: &TranslationUnit, ty: TypeId) -> Option<String> {
        let mut out = String::with_capacity(16);
        self.push_type(unit, ty, &mut out)?;
        Some(out)
    }
}

impl ItaniumMangler {
    /// `<nested-name>` or `<local-name>` of `id` ending in `leaf`.
    fn push_name(
        &self,
        unit: &TranslationUnit,
        id: DeclId,
        leaf: &str,
        quals: Qualifiers,
        out: &mut String,
    ) -> Option<()> {
        let mut prefix: SmallVec<[String; 4]> = SmallVec::new();
        let mut local = None;
        let mut scope = unit.semantic_parent(id);
        while let Some(s) = scope {
            let sd = unit.decl(s);
            if sd.is_function_like() {
                local = Some(self.mangle_decl(unit, s)?);
                break;
            }
            match sd.kind {
                DeclKind::Namespace(_) | DeclKind::Record(_) | DeclKind::Enum(_) => {
                    prefix.push(self.scope_component(unit, s)?);
                }
                _ => return None,
            }
            scope = unit.semantic_parent(s);
        }

        if let Some(function) = local {
            out.push('Z');
            out.push_str(function.strip_prefix(PREFIX)?);
            out.push('E');
        }
        if prefix.is_empty() && quals.is_empty() {
            out.push_str(leaf);
        } else {
            out.push('N');
            push_cv(quals, out);
            for component in prefix.iter().rev() {
                out.push_str(component);
            }
            out.push_str(leaf);
            out.push('E');
        }
        Some(())
    }

    /// `<unqualified-name>` of a namespace, record or enum used as a scope
    /// or as a type.
    fn scope_component(&self, unit: &TranslationUnit, id: DeclId) -> Option<String> {
        let decl = unit.decl(id);
        let mut out = match (&decl.kind, decl.name.as_deref()) {
            (_, Some(name)) if !name.is_empty() => source_name(name),
            (DeclKind::Namespace(_), _) => "12_GLOBAL__N_1".to_string(),
            (DeclKind::Record(r), _) if r.typedef_name.is_some() => {
                source_name(r.typedef_name.as_deref()?)
            }
            (DeclKind::Record(_) | DeclKind::Enum(_), _) => {
                let ordinal = unnamed_type_ordinal(unit, id)?;
                if ordinal == 0 {
                    "Ut_".to_string()
                } else {
                    format!("Ut{}_", ordinal - 1)
                }
            }
            _ => return None,
        };
        if let DeclKind::Record(r) = &decl.kind {
            if let Some(spec) = &r.specialization {
                out.push_str(&encode_template_args(self, unit, &spec.args)?);
            }
        }
        Some(out)
    }

    fn function_leaf(
        &self,
        unit: &TranslationUnit,
        decl: &Decl,
        f: &FunctionDecl,
        operands: usize,
    ) -> Option<String> {
        let mut leaf = match f.operator {
            Some(op) => operator_code(op, operands == 1).to_string(),
            None => source_name(decl.name.as_deref()?),
        };
        if let Some(spec) = &f.specialization {
            leaf.push_str(&encode_template_args(self, unit, &spec.args)?);
        }
        Some(leaf)
    }

    /// Parameter types, preceded by the return type for template
    /// specializations.
    fn push_signature(
        &self,
        unit: &TranslationUnit,
        f: &FunctionDecl,
        out: &mut String,
    ) -> Option<()> {
        if f.specialization.is_some() {
            self.push_type(unit, f.ret, out)?;
        }
        self.push_params(unit, &f.params, f.variadic, out)
    }

    fn push_params(
        &self,
        unit: &TranslationUnit,
        params: &[DeclId],
        variadic: bool,
        out: &mut String,
    ) -> Option<()> {
        if params.is_empty() && !variadic {
            out.push('v');
            return Some(());
        }
        for &param in params {
            let DeclKind::Param(p) = &unit.decl(param).kind else {
                return None;
            };
            // Top-level cv-qualifiers are not part of the signature.
            self.push_type(unit, unit.unqualified(p.ty), out)?;
        }
        if variadic {
            out.push('z');
        }
        Some(())
    }

    fn push_type(&self, unit: &TranslationUnit, ty: TypeId, out: &mut String) -> Option<()> {
        match unit.ty(ty) {
            TypeKind::Builtin(b) => out.push_str(builtin_code(*b)),
            TypeKind::Pointer(t) => {
                out.push('P');
                self.push_type(unit, *t, out)?;
            }
            TypeKind::LValueRef(t) => {
                out.push('R');
                self.push_type(unit, *t, out)?;
            }
            TypeKind::RValueRef(t) => {
                out.push('O');
                self.push_type(unit, *t, out)?;
            }
            TypeKind::Qualified { base, quals } => {
                push_cv(*quals, out);
                self.push_type(unit, *base, out)?;
            }
            TypeKind::Array { elem, len } => {
                let _ = write!(out, "A{len}_");
                self.push_type(unit, *elem, out)?;
            }
            TypeKind::IncompleteArray(elem) => {
                out.push_str("A_");
                self.push_type(unit, *elem, out)?;
            }
            TypeKind::Function(f) => {
                out.push('F');
                self.push_type(unit, f.ret, out)?;
                if f.params.is_empty() && !f.variadic {
                    out.push('v');
                }
                for &p in &f.params {
                    self.push_type(unit, p, out)?;
                }
                if f.variadic {
                    out.push('z');
                }
                out.push('E');
            }
            TypeKind::Record(d) | TypeKind::Enum(d) => self.push_type_decl(unit, *d, out)?,
            TypeKind::MemberPointer { class, pointee } => {
                out.push('M');
                self.push_type_decl(unit, *class, out)?;
                self.push_type(unit, *pointee, out)?;
            }
            TypeKind::Typedef { underlying, .. } => self.push_type(unit, *underlying, out)?,
            TypeKind::TemplateParam { .. } | TypeKind::Dependent(_) | TypeKind::Unsupported(_) => {
                return None
            }
        }
        Some(())
    }

    fn push_type_decl(&self, unit: &TranslationUnit, id: DeclId, out: &mut String) -> Option<()> {
        let leaf = self.scope_component(unit, id)?;
        self.push_name(unit, id, &leaf, Qualifiers::NONE, out)
    }
}

/// `I <template-arg>+ E`, with types encoded by `host`.
pub(crate) fn encode_template_args(
    host: &dyn HostMangler,
    unit: &TranslationUnit,
    args: &[TemplateArg],
) -> Option<String> {
    fn push_arg(
        host: &dyn HostMangler,
        unit: &TranslationUnit,
        arg: &TemplateArg,
        out: &mut String,
    ) -> Option<()> {
        match arg {
            TemplateArg::Type(t) => out.push_str(&host.mangle_type(unit, *t)?),
            TemplateArg::Integral { value, ty } => {
                out.push('L');
                out.push_str(&host.mangle_type(unit, *ty)?);
                if *value < 0 {
                    out.push('n');
                }
                let _ = write!(out, "{}E", value.unsigned_abs());
            }
            TemplateArg::NullPtr(_) => out.push_str("LDnE"),
            TemplateArg::Pack(items) => {
                out.push('J');
                for item in items {
                    push_arg(host, unit, item, out)?;
                }
                out.push('E');
            }
            TemplateArg::Expr(_) | TemplateArg::Decl(_) | TemplateArg::Template(_) => {
                return None
            }
        }
        Some(())
    }

    let mut out = String::from("I");
    for arg in args {
        push_arg(host, unit, arg, &mut out)?;
    }
    out.push('E');
    Some(out)
}

/// `<source-name>`: length-prefixed identifier.
pub(crate) fn source_name(name: &str) -> String {
    format!("{}{name}", name.len())
}

fn push_cv(quals: Qualifiers, out: &mut String) {
    if quals.is_volatile {
        out.push('V');
    }
    if quals.is_const {
        out.push('K');
    }
}

/// Position among the unnamed records and enums of the same scope.
fn unnamed_type_ordinal(unit: &TranslationUnit, id: DeclId) -> Option<usize> {
    unit.semantic_children(unit.semantic_parent(id))
        .into_iter()
        .filter(|&sibling| {
            let s = unit.decl(sibling);
            matches!(s.kind, DeclKind::Record(_) | DeclKind::Enum(_)) && anon_kind(s).is_some()
        })
        .position(|sibling| sibling == id)
}

fn builtin_code(b: BuiltinType) -> &'static str {
    match b {
        BuiltinType::Void => "v",
        BuiltinType::Bool => "b",
        BuiltinType::Char => "c",
        BuiltinType::SChar => "a",
        BuiltinType::UChar => "h",
        BuiltinType::WChar => "w",
        BuiltinType::Char8 => "Du",
        BuiltinType::Char16 => "Ds",
        BuiltinType::Char32 => "Di",
        BuiltinType::Short => "s",
        BuiltinType::UShort => "t",
        BuiltinType::Int => "i",
        BuiltinType::UInt => "j",
        BuiltinType::Long => "l",
        BuiltinType::ULong => "m",
        BuiltinType::LongLong => "x",
        BuiltinType::ULongLong => "y",
        BuiltinType::Int128 => "n",
        BuiltinType::UInt128 => "o",
        BuiltinType::Float => "f",
        BuiltinType::Double => "d",
        BuiltinType::LongDouble => "e",
        BuiltinType::NullPtr => "Dn",
    }
}

/// `<operator-name>`. `unary` selects the prefix forms of `+ - * &`.
fn operator_code(op: OverloadedOperator, unary: bool) -> &'static str {
    match op {
        OverloadedOperator::New => "nw",
        OverloadedOperator::Delete => "dl",
        OverloadedOperator::ArrayNew => "na",
        OverloadedOperator::ArrayDelete => "da",
        OverloadedOperator::Plus if unary => "ps",
        OverloadedOperator::Plus => "pl",
        OverloadedOperator::Minus if unary => "ng",
        OverloadedOperator::Minus => "mi",
        OverloadedOperator::Star if unary => "de",
        OverloadedOperator::Star => "ml",
        OverloadedOperator::Amp if unary => "ad",
        OverloadedOperator::Amp => "an",
        OverloadedOperator::Slash => "dv",
        OverloadedOperator::Percent => "rm",
        OverloadedOperator::Caret => "eo",
        OverloadedOperator::Pipe => "or",
        OverloadedOperator::Tilde => "co",
        OverloadedOperator::Exclaim => "nt",
        OverloadedOperator::Equal => "aS",
        OverloadedOperator::Less => "lt",
        OverloadedOperator::Greater => "gt",
        OverloadedOperator::PlusEqual => "pL",
        OverloadedOperator::MinusEqual => "mI",
        OverloadedOperator::StarEqual => "mL",
        OverloadedOperator::SlashEqual => "dV",
        OverloadedOperator::PercentEqual => "rM",
        OverloadedOperator::CaretEqual => "eO",
        OverloadedOperator::AmpEqual => "aN",
        OverloadedOperator::PipeEqual => "oR",
        OverloadedOperator::LessLess => "ls",
        OverloadedOperator::GreaterGreater => "rs",
        OverloadedOperator::LessLessEqual => "lS",
        OverloadedOperator::GreaterGreaterEqual => "rS",
        OverloadedOperator::EqualEqual => "eq",
        OverloadedOperator::ExclaimEqual => "ne",
        OverloadedOperator::LessEqual => "le",
        OverloadedOperator::GreaterEqual => "ge",
        OverloadedOperator::Spaceship => "ss",
        OverloadedOperator::AmpAmp => "aa",
        OverloadedOperator::PipePipe => "oo",
        OverloadedOperator::PlusPlus => "pp",
        OverloadedOperator::MinusMinus => "mm",
        OverloadedOperator::Comma => "cm",
        OverloadedOperator::ArrowStar => "pm",
        OverloadedOperator::Arrow => "pt",
        OverloadedOperator::Call => "cl",
        OverloadedOperator::Subscript => "ix",
        OverloadedOperator::Coawait => "aw",
    }
}
