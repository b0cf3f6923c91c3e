//! Binder indices for shared subexpressions.
//!
//! `a ?: b` and array-initialization loops evaluate one subexpression once
//! and refer to it several times. The defining node gets a small integer
//! index while its dependents are lowered; references print that index.

use rustc_hash::FxHashMap;

use keel_ir::{ExprId, Span};

use crate::LowerError;

/// Index printed for a bound shared subexpression.
pub type BinderIndex = u32;

/// Scoped allocator of binder indices plus the loop nesting counter.
///
/// Indices are allocated as the number of live bindings, so with LIFO
/// release (which callers must follow) live indices stay dense and an inner
/// binder always gets a larger index than the one enclosing it.
#[derive(Debug, Default)]
pub struct OpaqueNameTable {
    bindings: FxHashMap<ExprId, BinderIndex>,
    depth: u32,
}

impl OpaqueNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `node` to a fresh index. Binding a node twice is fatal.
    pub fn fresh(&mut self, node: ExprId, span: Span) -> Result<BinderIndex, LowerError> {
        if self.bindings.contains_key(&node) {
            return Err(LowerError::OpaqueRebound { expr: node, span });
        }
        let index = BinderIndex::try_from(self.bindings.len()).unwrap_or(BinderIndex::MAX);
        self.bindings.insert(node, index);
        tracing::trace!(?node, index, "bind shared subexpression");
        Ok(index)
    }

    /// Index of a live binding; `None` if `node` is not bound.
    pub fn find(&self, node: ExprId) -> Option<BinderIndex> {
        self.bindings.get(&node).copied()
    }

    pub fn release(&mut self, node: ExprId) {
        if self.bindings.remove(&node).is_some() {
            tracing::trace!(?node, "release shared subexpression");
        }
    }

    pub fn live(&self) -> usize {
        self.bindings.len()
    }

    /// Current nesting counter; 0 outside any binder.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn enter_nesting(&mut self) {
        self.depth += 1;
    }

    pub fn exit_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests;
