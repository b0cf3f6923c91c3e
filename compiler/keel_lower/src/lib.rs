//! Lowering of checked C++ translation units to canonical semantic terms.
//!
//! The engine has three parts:
//! - [`mangle`]: canonical identities for types and objects, including the
//!   ones the host compiler cannot mangle (anonymous scopes, destructors,
//!   enum constants).
//! - Declaration lowering: one term per declaration, covering class
//!   layout, virtual tables, constructor initializers and template
//!   instantiation records.
//! - Expression and statement lowering: the recursive translation of
//!   executable code, with operator desugaring and literal encoding.
//!
//! # Usage
//!
//! ```ignore
//! let terms = keel_lower::lower_unit(&unit, &LowerConfig::default(), &ItaniumMangler, &mut diags)?;
//! ```
//!
//! Each top-level declaration is lowered by its own context, so the binder
//! indices of shared subexpressions restart at 0 for every declaration.

mod config;
mod error;
mod lower;
pub mod mangle;
mod opaque;
mod stack;

#[cfg(test)]
mod test_helpers;

use keel_diagnostic::DiagnosticSink;
use keel_ir::{DeclId, DeclKind, ExprId, TranslationUnit};
use keel_term::Term;

use crate::lower::Lowerer;

pub use config::{LowerConfig, Mode, NamingStrategy};
pub use error::LowerError;
pub use mangle::{
    AnonKind, HostMangler, ItaniumMangler, NameMangler, ObjectName, QualifiedName,
    TemplateArgName, TypeName,
};
pub use opaque::{BinderIndex, OpaqueNameTable};

/// Lower every top-level declaration of `unit`, in source order.
///
/// Linkage specifications are transparent: their members are lowered as
/// if declared in the enclosing scope.
pub fn lower_unit<'a>(
    unit: &'a TranslationUnit,
    config: &'a LowerConfig,
    host: &'a dyn HostMangler,
    sink: &'a mut dyn DiagnosticSink,
) -> Result<Vec<Term>, LowerError> {
    let _span = tracing::debug_span!("lower_unit", unit = %unit.name).entered();
    let mut roots = Vec::with_capacity(unit.top_level().len());
    flatten_linkage(unit, unit.top_level(), &mut roots);

    let mut terms = Vec::with_capacity(roots.len());
    for id in roots {
        let mut lowerer = Lowerer::new(unit, config, host, &mut *sink);
        terms.extend(lowerer.lower_decl(id)?);
    }
    tracing::debug!(count = terms.len(), "lowered translation unit");
    Ok(terms)
}

/// Lower a single declaration with a fresh context.
///
/// An empty result means the declaration is skipped in this mode.
pub fn lower_decl<'a>(
    unit: &'a TranslationUnit,
    decl: DeclId,
    config: &'a LowerConfig,
    host: &'a dyn HostMangler,
    sink: &'a mut dyn DiagnosticSink,
) -> Result<Vec<Term>, LowerError> {
    Lowerer::new(unit, config, host, sink).lower_decl(decl)
}

/// Lower a single full expression with a fresh context.
pub fn lower_expression<'a>(
    unit: &'a TranslationUnit,
    expr: ExprId,
    config: &'a LowerConfig,
    host: &'a dyn HostMangler,
    sink: &'a mut dyn DiagnosticSink,
) -> Result<Term, LowerError> {
    Lowerer::new(unit, config, host, sink).lower_full_expr(expr)
}

fn flatten_linkage(unit: &TranslationUnit, scope: &[DeclId], out: &mut Vec<DeclId>) {
    for &id in scope {
        match unit.decl(id).kind {
            DeclKind::LinkageSpec(_) => flatten_linkage(unit, &unit.decl(id).children, out),
            _ => out.push(id),
        }
    }
}
