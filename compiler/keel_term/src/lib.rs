//! Canonical output terms.
//!
//! Lowering produces [`Term`] trees: constructor applications, lists,
//! tuples and literal payloads. A term is serialized by streaming it into a
//! [`TermEmitter`], which owns all concrete syntax; lowering code never
//! writes a parenthesis or separator itself.
//!
//! [`CoqEmitter`] renders the Gallina surface syntax consumed by the
//! verification tool.

mod emitter;
mod term;

pub use emitter::{render, CoqEmitter, TermEmitter};
pub use term::{Num, Term};
