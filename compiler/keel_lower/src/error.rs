//! Fatal lowering errors.

use keel_diagnostic::{Diagnostic, ErrorCode};
use keel_ir::{ExprId, Span};

/// An error that aborts lowering of the current translation unit.
///
/// Everything recoverable is reported as an unsupported diagnostic and a
/// placeholder term instead; reaching one of these means the input uses a
/// construct whose semantics cannot be approximated, or the input model
/// itself is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LowerError {
    #[error("anonymous {kind} is not a member of its own scope")]
    AnonymousNotInScope { kind: &'static str, span: Span },

    #[error("bit-field `{field}` is not supported")]
    BitField { field: String, span: Span },

    #[error("base of `{record}` is not a record type")]
    NonRecordBase { record: String, span: Span },

    #[error("instantiation of `{name}` has a {kind} argument; only types are supported")]
    NonTypeInstantiationArg {
        name: String,
        kind: &'static str,
        span: Span,
    },

    #[error("linkage specification reached declaration lowering")]
    UnflattenedLinkageSpec { span: Span },

    #[error("{what} is missing its {part}")]
    MissingPart {
        what: &'static str,
        part: &'static str,
        span: Span,
    },

    #[error("new expression has no allocation function")]
    MissingOperatorNew { span: Span },

    #[error("delete expression has no deallocation function")]
    MissingOperatorDelete { span: Span },

    #[error("destroying operator delete is not supported")]
    DestroyingDelete { span: Span },

    #[error("temporary with lifetime extended to a declaration is not supported")]
    ExtendedTemporary { span: Span },

    #[error("type trait `{name}` is not supported")]
    UnsupportedTrait { name: &'static str, span: Span },

    #[error("offsetof supports only a single field designator")]
    UnsupportedOffsetOf { span: Span },

    #[error("shared subexpression {expr:?} is already bound")]
    OpaqueRebound { expr: ExprId, span: Span },

    #[error("malformed {what}: {detail}")]
    Malformed {
        what: &'static str,
        detail: String,
        span: Span,
    },

    #[error("binder nesting depth changed from {before} to {after} while lowering an expression")]
    NestingImbalance { before: u32, after: u32, span: Span },
}

impl LowerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LowerError::AnonymousNotInScope { .. } => ErrorCode::E1001,
            LowerError::BitField { .. } => ErrorCode::E2001,
            LowerError::NonRecordBase { .. } => ErrorCode::E2002,
            LowerError::NonTypeInstantiationArg { .. } => ErrorCode::E2003,
            LowerError::UnflattenedLinkageSpec { .. } => ErrorCode::E2004,
            LowerError::MissingPart { .. } => ErrorCode::E2005,
            LowerError::MissingOperatorNew { .. } => ErrorCode::E3001,
            LowerError::MissingOperatorDelete { .. } => ErrorCode::E3002,
            LowerError::DestroyingDelete { .. } => ErrorCode::E3003,
            LowerError::ExtendedTemporary { .. } => ErrorCode::E3004,
            LowerError::UnsupportedTrait { .. } => ErrorCode::E3005,
            LowerError::UnsupportedOffsetOf { .. } => ErrorCode::E3006,
            LowerError::OpaqueRebound { .. } => ErrorCode::E3007,
            LowerError::Malformed { .. } => ErrorCode::E3008,
            LowerError::NestingImbalance { .. } => ErrorCode::E9001,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LowerError::AnonymousNotInScope { span, .. }
            | LowerError::BitField { span, .. }
            | LowerError::NonRecordBase { span, .. }
            | LowerError::NonTypeInstantiationArg { span, .. }
            | LowerError::UnflattenedLinkageSpec { span }
            | LowerError::MissingPart { span, .. }
            | LowerError::MissingOperatorNew { span }
            | LowerError::MissingOperatorDelete { span }
            | LowerError::DestroyingDelete { span }
            | LowerError::ExtendedTemporary { span }
            | LowerError::UnsupportedTrait { span, .. }
            | LowerError::UnsupportedOffsetOf { span }
            | LowerError::OpaqueRebound { span, .. }
            | LowerError::Malformed { span, .. }
            | LowerError::NestingImbalance { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::fatal(self.code())
            .with_message(self.to_string())
            .at(self.span())
    }
}
