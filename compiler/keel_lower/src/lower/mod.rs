//! Declaration, statement, expression and type lowering.
//!
//! All lowering runs through one [`Lowerer`], created per top-level
//! declaration. It holds the unit being read, the run configuration, the
//! name mangler, the diagnostic sink and the binder table; nothing is
//! global.

mod annot;
mod decl;
mod expr;
mod stmt;
mod types;

use keel_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use keel_ir::{DeclId, Expr, Span, TranslationUnit};
use keel_term::Term;

use crate::mangle::{
    AnonKind, HostMangler, NameMangler, ObjectName, QualifiedName, TemplateArgName, TypeName,
};
use crate::{LowerConfig, LowerError, OpaqueNameTable};

pub(crate) use annot::Annot;

/// State for lowering one top-level declaration.
pub(crate) struct Lowerer<'a> {
    /// The unit being lowered (read-only).
    pub(crate) unit: &'a TranslationUnit,
    pub(crate) config: &'a LowerConfig,
    pub(crate) names: NameMangler<'a>,
    /// Receives unsupported-construct warnings.
    pub(crate) sink: &'a mut dyn DiagnosticSink,
    /// Binders of shared subexpressions; scoped to this declaration.
    pub(crate) opaque: OpaqueNameTable,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn new(
        unit: &'a TranslationUnit,
        config: &'a LowerConfig,
        host: &'a dyn HostMangler,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Lowerer {
            unit,
            config,
            names: NameMangler::new(unit, host, config.naming),
            sink,
            opaque: OpaqueNameTable::new(),
        }
    }

    // Diagnostics

    /// Report an unsupported construct that was replaced by a placeholder.
    pub(crate) fn report(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let message = message.into();
        tracing::warn!(code = code.as_str(), "{message}");
        self.sink
            .report(Diagnostic::unsupported(code).with_message(message).at(span));
    }

    /// `Eunsupported "tag" V T` plus a warning.
    pub(crate) fn unsupported_expr(
        &mut self,
        tag: impl Into<String>,
        expr: &Expr,
        code: ErrorCode,
    ) -> Result<Term, LowerError> {
        let tag = tag.into();
        self.report(code, format!("unsupported expression: {tag}"), expr.span);
        self.finish("Eunsupported", vec![Term::str(tag)], expr, Annot::VALCAT | Annot::TYPE)
    }

    /// Append the annotations `annot` asks for to a constructor term.
    pub(crate) fn finish(
        &mut self,
        name: &'static str,
        mut args: Vec<Term>,
        expr: &Expr,
        annot: Annot,
    ) -> Result<Term, LowerError> {
        if annot.contains(Annot::VALCAT) {
            args.push(types::category_term(expr.category));
        }
        if annot.contains(Annot::TYPE) {
            args.push(self.lower_type(expr.ty)?);
        } else if annot.contains(Annot::TYPE_OPT) {
            let ty = if self.unit.is_dependent(expr.ty) {
                None
            } else {
                Some(self.lower_type(expr.ty)?)
            };
            args.push(Term::option(ty));
        }
        Ok(Term::ctor(name, args))
    }

    // Names

    pub(crate) fn object_name(&mut self, id: DeclId) -> Result<Term, LowerError> {
        let name = self.names.object_name(id, &mut *self.sink)?;
        self.object_name_term(name)
    }

    pub(crate) fn type_name(&mut self, id: DeclId) -> Result<Term, LowerError> {
        let name = self.names.type_name(id, &mut *self.sink)?;
        self.type_name_term(name)
    }

    fn object_name_term(&mut self, name: ObjectName) -> Result<Term, LowerError> {
        match name {
            ObjectName::Mangled(s) | ObjectName::Plain(s) => Ok(Term::str(s)),
            ObjectName::Dtor(owner) => Ok(Term::ctor("Ndtor", vec![self.type_name_term(owner)?])),
            ObjectName::EnumConst { owner, name } => Ok(Term::ctor(
                "Nenum_const",
                vec![self.type_name_term(owner)?, Term::str(name)],
            )),
        }
    }

    fn type_name_term(&mut self, name: TypeName) -> Result<Term, LowerError> {
        match name {
            TypeName::Symbol(s) => Ok(Term::str(s)),
            TypeName::Structured(q) => self.qualified_term(q),
        }
    }

    fn qualified_term(&mut self, name: QualifiedName) -> Result<Term, LowerError> {
        match name {
            QualifiedName::Global(s) => Ok(Term::ctor("Qglobal", vec![Term::str(s)])),
            QualifiedName::Nested { parent, component } => Ok(Term::ctor(
                "Qnested",
                vec![self.qualified_term(*parent)?, Term::str(component)],
            )),
            QualifiedName::Specialized { template, args } => {
                let template = self.qualified_term(*template)?;
                let mut lowered = Vec::with_capacity(args.len());
                for arg in args {
                    lowered.push(self.template_arg_term(arg)?);
                }
                Ok(Term::ctor("Qspecialize", vec![template, Term::List(lowered)]))
            }
            QualifiedName::Anonymous {
                parent,
                kind,
                ordinal,
            } => {
                let parent = match parent {
                    Some(p) => Some(self.qualified_term(*p)?),
                    None => None,
                };
                let kind = match kind {
                    AnonKind::Namespace => "Kns",
                    AnonKind::Record => "Krecord",
                    AnonKind::Enum => "Kenum",
                };
                Ok(Term::ctor(
                    "Qanon",
                    vec![Term::option(parent), Term::atom(kind), Term::nat(ordinal)],
                ))
            }
        }
    }

    fn template_arg_term(&mut self, arg: TemplateArgName) -> Result<Term, LowerError> {
        match arg {
            TemplateArgName::Type(t) => Ok(Term::ctor("TAtype", vec![self.lower_type(t)?])),
            TemplateArgName::Integral(v) => Ok(Term::ctor("TAint", vec![Term::int(v)])),
            TemplateArgName::NullPtr => Ok(Term::atom("TAnull")),
            TemplateArgName::Expr(e) => Ok(Term::ctor("TAexpr", vec![self.lower_full_expr(e)?])),
            TemplateArgName::Other(kind) => {
                Ok(Term::ctor("TAunsupported", vec![Term::str(kind)]))
            }
        }
    }
}
