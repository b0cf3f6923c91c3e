//! Type lowering.
//!
//! Typedef sugar is always stripped; the downstream semantics works on
//! canonical types only.

use keel_diagnostic::ErrorCode;
use keel_ir::{
    BuiltinType, CallConv, DeclId, DeclKind, FunctionDecl, Qualifiers, Span, Target, TypeId,
    TypeKind, ValueCategory,
};
use keel_term::Term;

use super::Lowerer;
use crate::LowerError;

impl Lowerer<'_> {
    pub(crate) fn lower_type(&mut self, id: TypeId) -> Result<Term, LowerError> {
        let unit = self.unit;
        let term = match unit.ty(id) {
            TypeKind::Builtin(b) => builtin_term(*b, &unit.target),
            TypeKind::Pointer(t) => Term::ctor("Tptr", vec![self.lower_type(*t)?]),
            TypeKind::LValueRef(t) => Term::ctor("Tref", vec![self.lower_type(*t)?]),
            TypeKind::RValueRef(t) => Term::ctor("Trv_ref", vec![self.lower_type(*t)?]),
            TypeKind::Qualified { base, quals } => match qualifier_atom(*quals) {
                Some(q) => Term::ctor("Tqualified", vec![Term::atom(q), self.lower_type(*base)?]),
                None => self.lower_type(*base)?,
            },
            TypeKind::Array { elem, len } => Term::ctor(
                "Tarray",
                vec![self.lower_type(*elem)?, Term::nat(*len)],
            ),
            TypeKind::IncompleteArray(elem) => {
                Term::ctor("Tincomplete_array", vec![self.lower_type(*elem)?])
            }
            TypeKind::Function(f) => {
                let ret = self.lower_type(f.ret)?;
                let mut params = Vec::with_capacity(f.params.len());
                for &p in &f.params {
                    params.push(self.lower_type(p)?);
                }
                function_term(f.cc, f.variadic, ret, params)
            }
            TypeKind::Record(d) => Term::ctor("Tnamed", vec![self.type_name(*d)?]),
            TypeKind::Enum(d) => Term::ctor("Tenum", vec![self.type_name(*d)?]),
            TypeKind::MemberPointer { class, pointee } => Term::ctor(
                "Tmember_pointer",
                vec![self.type_name(*class)?, self.lower_type(*pointee)?],
            ),
            TypeKind::Typedef { underlying, .. } => self.lower_type(*underlying)?,
            TypeKind::TemplateParam { name, .. } => Term::ctor("Tparam", vec![Term::str(name)]),
            TypeKind::Dependent(spelling) => Term::ctor("Tunresolved", vec![Term::str(spelling)]),
            TypeKind::Unsupported(what) => {
                self.report(ErrorCode::W4006, format!("unsupported type: {what}"), Span::DUMMY);
                Term::ctor("Tunsupported", vec![Term::str(what)])
            }
        };
        Ok(term)
    }

    /// `Tfunction` of a function declaration, which has no interned type.
    pub(crate) fn function_decl_type(&mut self, f: &FunctionDecl) -> Result<Term, LowerError> {
        let ret = self.lower_type(f.ret)?;
        let params = self.param_types(&f.params)?;
        Ok(function_term(f.cc, f.variadic, ret, params))
    }

    /// Declared types of parameter declarations.
    pub(crate) fn param_types(&mut self, params: &[DeclId]) -> Result<Vec<Term>, LowerError> {
        let unit = self.unit;
        let mut out = Vec::with_capacity(params.len());
        for &param in params {
            let decl = unit.decl(param);
            let DeclKind::Param(p) = &decl.kind else {
                return Err(LowerError::Malformed {
                    what: "parameter list",
                    detail: format!("{} in parameter position", decl.kind.describe()),
                    span: decl.span,
                });
            };
            out.push(self.lower_type(p.ty)?);
        }
        Ok(out)
    }
}

pub(crate) fn function_term(cc: CallConv, variadic: bool, ret: Term, params: Vec<Term>) -> Term {
    Term::ctor(
        "Tfunction",
        vec![cc_term(cc), arity_term(variadic), ret, Term::List(params)],
    )
}

pub(crate) fn cc_term(cc: CallConv) -> Term {
    Term::atom(match cc {
        CallConv::C => "CC_C",
        CallConv::MsAbi => "CC_MsAbi",
        CallConv::RegCall => "CC_RegCall",
    })
}

pub(crate) fn arity_term(variadic: bool) -> Term {
    Term::atom(if variadic { "Ar_Variadic" } else { "Ar_Definite" })
}

pub(crate) fn category_term(category: ValueCategory) -> Term {
    Term::atom(match category {
        ValueCategory::Lvalue => "Lvalue",
        ValueCategory::Prvalue => "Prvalue",
        ValueCategory::Xvalue => "Xvalue",
    })
}

/// Method qualifiers; `QM` when unqualified.
pub(crate) fn method_quals_term(quals: Qualifiers) -> Term {
    Term::atom(qualifier_atom(quals).unwrap_or("QM"))
}

fn qualifier_atom(quals: Qualifiers) -> Option<&'static str> {
    match (quals.is_const, quals.is_volatile) {
        (true, true) => Some("QCV"),
        (true, false) => Some("QC"),
        (false, true) => Some("QV"),
        (false, false) => None,
    }
}

fn builtin_term(b: BuiltinType, target: &Target) -> Term {
    let num = |signed: bool| {
        Term::ctor(
            "Tnum",
            vec![
                width_term(b.bit_width(target)),
                Term::atom(if signed { "Signed" } else { "Unsigned" }),
            ],
        )
    };
    let char_ = |kind: &'static str| Term::ctor("Tchar_", vec![Term::atom(kind)]);
    let float = |kind: &'static str| Term::ctor("Tfloat_", vec![Term::atom(kind)]);
    match b {
        BuiltinType::Void => Term::atom("Tvoid"),
        BuiltinType::Bool => Term::atom("Tbool"),
        BuiltinType::NullPtr => Term::atom("Tnullptr"),
        BuiltinType::Char => char_("Cchar"),
        BuiltinType::WChar => char_("Cwchar"),
        BuiltinType::Char8 => char_("C8"),
        BuiltinType::Char16 => char_("C16"),
        BuiltinType::Char32 => char_("C32"),
        BuiltinType::SChar
        | BuiltinType::Short
        | BuiltinType::Int
        | BuiltinType::Long
        | BuiltinType::LongLong
        | BuiltinType::Int128 => num(true),
        BuiltinType::UChar
        | BuiltinType::UShort
        | BuiltinType::UInt
        | BuiltinType::ULong
        | BuiltinType::ULongLong
        | BuiltinType::UInt128 => num(false),
        BuiltinType::Float => float("Ffloat"),
        BuiltinType::Double => float("Fdouble"),
        BuiltinType::LongDouble => float("Flongdouble"),
    }
}

fn width_term(bits: u32) -> Term {
    Term::atom(match bits {
        8 => "W8",
        16 => "W16",
        32 => "W32",
        64 => "W64",
        _ => "W128",
    })
}
