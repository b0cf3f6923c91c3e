//! Statement nodes of the input model.

use crate::{DeclId, ExprId, Span, StmtId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Stmt {
            kind,
            span: Span::DUMMY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StmtKind {
    Compound(Vec<StmtId>),
    Decl(Vec<DeclId>),
    Expr(ExprId),
    If {
        cond_var: Option<DeclId>,
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        cond_var: Option<DeclId>,
        cond: ExprId,
        body: StmtId,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        inc: Option<ExprId>,
        body: StmtId,
    },
    Do {
        body: StmtId,
        cond: ExprId,
    },
    Return(Option<ExprId>),
    Break,
    Continue,
    Switch {
        cond_var: Option<DeclId>,
        cond: ExprId,
        body: StmtId,
    },
    /// Case label marker; the labelled statements follow it in the
    /// enclosing compound. `hi` is set for GNU case ranges.
    Case {
        lo: i128,
        hi: Option<i128>,
    },
    Default,
    Label {
        name: String,
        body: StmtId,
    },
    Goto(String),
    Attributed {
        attrs: Vec<String>,
        body: StmtId,
    },
    Null,
    Unsupported(String),
}
