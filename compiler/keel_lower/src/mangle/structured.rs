//! Structured qualified names.

use smallvec::SmallVec;

use keel_diagnostic::DiagnosticSink;
use keel_ir::{DeclId, DeclKind, TemplateArg};

use super::{anon_kind, NameMangler, QualifiedName, TemplateArgName};
use crate::LowerError;

impl NameMangler<'_> {
    pub(super) fn qualified_name(
        &self,
        id: DeclId,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<QualifiedName, LowerError> {
        let decl = self.unit.decl(id);
        let parent = self.scope_name(self.unit.semantic_parent(id), sink)?;

        if let Some(kind) = anon_kind(decl) {
            return Ok(QualifiedName::Anonymous {
                parent: parent.map(Box::new),
                kind,
                ordinal: self.anonymous_ordinal(id)?,
            });
        }

        let name = QualifiedName::nested(parent, decl.name_str());
        match &decl.kind {
            DeclKind::Record(record) => match &record.specialization {
                Some(spec) => {
                    let mut args = SmallVec::new();
                    collect_args(&spec.args, &mut args);
                    Ok(QualifiedName::Specialized {
                        template: Box::new(name),
                        args,
                    })
                }
                None => Ok(name),
            },
            _ => Ok(name),
        }
    }

    /// Name of an enclosing scope; `None` at the unit root.
    fn scope_name(
        &self,
        scope: Option<DeclId>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Option<QualifiedName>, LowerError> {
        let Some(id) = scope else {
            return Ok(None);
        };
        let decl = self.unit.decl(id);
        if decl.is_function_like() {
            let function = self.object_name(id, sink)?;
            return Ok(Some(QualifiedName::Global(function.symbol())));
        }
        match decl.kind {
            DeclKind::Namespace(_) | DeclKind::Record(_) | DeclKind::Enum(_) => {
                self.qualified_name(id, sink).map(Some)
            }
            _ => Err(LowerError::Malformed {
                what: "scope",
                detail: format!("{} cannot enclose a type", decl.kind.describe()),
                span: decl.span,
            }),
        }
    }
}

/// Flatten packs; keep declaration and template arguments by kind only.
fn collect_args(args: &[TemplateArg], out: &mut SmallVec<[TemplateArgName; 2]>) {
    for arg in args {
        match arg {
            TemplateArg::Type(t) => out.push(TemplateArgName::Type(*t)),
            TemplateArg::Integral { value, .. } => out.push(TemplateArgName::Integral(*value)),
            TemplateArg::NullPtr(_) => out.push(TemplateArgName::NullPtr),
            TemplateArg::Expr(e) => out.push(TemplateArgName::Expr(*e)),
            TemplateArg::Pack(items) => collect_args(items, out),
            TemplateArg::Decl(_) | TemplateArg::Template(_) => {
                out.push(TemplateArgName::Other(arg.describe()));
            }
        }
    }
}
