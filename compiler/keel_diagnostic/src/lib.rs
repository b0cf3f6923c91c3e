//! Diagnostic reporting for the lowering engine.
//!
//! Lowering distinguishes three severities:
//! - **Debug**: tracing output only, never collected here.
//! - **Unsupported**: a construct was replaced by a placeholder term; the
//!   output is still usable but no longer faithful at that point.
//! - **Fatal**: lowering of the translation unit is aborted.
//!
//! Unsupported diagnostics are pushed into a [`DiagnosticSink`] as they
//! happen. Fatal ones travel as `Err` values and are converted to a
//! [`Diagnostic`] by the driver.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticQueue, DiagnosticSink};
