//! Opaque type symbols.
//!
//! A type symbol has the shape of an Itanium `<nested-name>` or
//! `<local-name>`: `_Z1S`, `_ZN2ns1SE`, `_ZZ1fvE1S`. Whether the chain is
//! wrapped in `N ... E` depends on how many components are printed in
//! total, which is only known once the walk reaches the root; the walk
//! therefore carries a `remaining` counter down and the number of
//! components written back up.

use keel_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use keel_ir::{DeclId, DeclKind};

use super::itanium::{encode_template_args, source_name};
use super::{anon_kind, AnonKind, NameMangler, ObjectName};
use crate::LowerError;

const ROOT: &str = "_Z";
const EMPTY_SCOPE: &str = "~<empty>";
const EMPTY_ENUM: &str = "~<empty-enum>";

impl NameMangler<'_> {
    pub(super) fn type_symbol(
        &self,
        id: DeclId,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<String, LowerError> {
        let mut out = String::with_capacity(32);
        self.push_scope(Some(id), 0, &mut out, sink)?;
        Ok(out)
    }

    /// Write `scope` and everything above it. `remaining` counts the
    /// components still to be written below this one. Returns the number
    /// of nested components written so far.
    fn push_scope(
        &self,
        scope: Option<DeclId>,
        remaining: u32,
        out: &mut String,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<u32, LowerError> {
        let Some(id) = scope else {
            out.push_str(ROOT);
            if remaining > 1 {
                out.push('N');
            }
            return Ok(0);
        };

        let decl = self.unit.decl(id);
        if decl.is_function_like() {
            let function = match self.object_name(id, sink)? {
                ObjectName::Mangled(symbol) => symbol
                    .strip_prefix(ROOT)
                    .map_or_else(|| source_name(&symbol), str::to_owned),
                other => source_name(&other.symbol()),
            };
            out.push_str(ROOT);
            out.push('Z');
            out.push_str(&function);
            out.push('E');
            if remaining > 1 {
                out.push('N');
            }
            return Ok(0);
        }

        match decl.kind {
            DeclKind::Namespace(_)
            | DeclKind::Record(_)
            | DeclKind::Enum(_)
            | DeclKind::Typedef { .. } => {}
            _ => {
                return Err(LowerError::Malformed {
                    what: "scope",
                    detail: format!("{} cannot enclose a type", decl.kind.describe()),
                    span: decl.span,
                })
            }
        }

        let compound = self.push_scope(self.unit.semantic_parent(id), remaining + 1, out, sink)?;
        let component = self.component(id, sink);
        out.push_str(&component);
        if remaining == 0 && compound > 0 {
            out.push('E');
        }
        Ok(compound + 1)
    }

    /// `<source-name>` of one scope, with template arguments.
    fn component(&self, id: DeclId, sink: &mut dyn DiagnosticSink) -> String {
        let decl = self.unit.decl(id);
        let mut out = match anon_kind(decl) {
            None => source_name(decl.name_str()),
            Some(kind) => source_name(&self.positional_token(id, kind, sink)),
        };
        if let DeclKind::Record(record) = &decl.kind {
            if let Some(spec) = &record.specialization {
                match encode_template_args(self.host, self.unit, &spec.args) {
                    Some(args) => out.push_str(&args),
                    None => {
                        tracing::warn!(name = decl.name_str(), "template arguments not mangleable");
                        sink.report(
                            Diagnostic::unsupported(ErrorCode::W4008)
                                .with_message(format!(
                                    "cannot mangle the template arguments of `{}`",
                                    decl.name_str()
                                ))
                                .at(decl.span),
                        );
                        out.push_str("I~E");
                    }
                }
            }
        }
        out
    }

    /// Stand-in name of an anonymous scope, borrowed from something
    /// distinguishing inside it.
    fn positional_token(&self, id: DeclId, kind: AnonKind, sink: &mut dyn DiagnosticSink) -> String {
        let unit = self.unit;
        let decl = unit.decl(id);
        let named = |want: fn(&DeclKind) -> bool| {
            decl.children.iter().find_map(|&child| {
                let c = unit.decl(child);
                (want(&c.kind) && !c.is_anonymous()).then(|| c.name_str().to_owned())
            })
        };

        let (token, placeholder) = match (kind, &decl.kind) {
            (AnonKind::Record, DeclKind::Record(record)) => {
                if let Some(alias) = &record.typedef_name {
                    (Some(alias.clone()), EMPTY_SCOPE)
                } else {
                    let field = named(|k| matches!(k, DeclKind::Field(_)));
                    (field.map(|f| format!(".{f}")), EMPTY_SCOPE)
                }
            }
            (AnonKind::Enum, _) => {
                let constant = named(|k| matches!(k, DeclKind::EnumConstant(_)));
                (constant.map(|c| format!("~{c}")), EMPTY_ENUM)
            }
            _ => (named(|_| true).map(|m| format!("~{m}")), EMPTY_SCOPE),
        };

        token.unwrap_or_else(|| {
            tracing::warn!(kind = kind.describe(), "anonymous scope has nothing to be named after");
            sink.report(
                Diagnostic::unsupported(ErrorCode::W4005)
                    .with_message(format!(
                        "anonymous {} named `{placeholder}`; the name is not unique",
                        kind.describe()
                    ))
                    .at(decl.span),
            );
            placeholder.to_owned()
        })
    }
}
