//! Stack growth for deeply nested expressions.
//!
//! Expression and statement lowering recurse once per AST level; machine
//! generated code (long `a + b + c + ...` chains, nested initializer lists)
//! can exceed the default thread stack.

/// Grow when less than this remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, first switching to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
pub(crate) fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}
