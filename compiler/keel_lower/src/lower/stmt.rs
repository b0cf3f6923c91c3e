//! Statement lowering.

use keel_diagnostic::ErrorCode;
use keel_ir::{DeclId, DeclKind, StmtId, StmtKind};
use keel_term::Term;

use super::Lowerer;
use crate::stack::with_stack;
use crate::LowerError;

impl Lowerer<'_> {
    pub(crate) fn lower_stmt(&mut self, id: StmtId) -> Result<Term, LowerError> {
        with_stack(|| self.lower_stmt_kind(id))
    }

    fn lower_stmt_kind(&mut self, id: StmtId) -> Result<Term, LowerError> {
        let unit = self.unit;
        let stmt = unit.stmt(id);
        let term = match &stmt.kind {
            StmtKind::Compound(stmts) => Term::ctor("Sseq", vec![self.lower_stmts(stmts)?]),
            StmtKind::Decl(decls) => {
                let mut vars = Vec::with_capacity(decls.len());
                for &decl in decls {
                    if let Some(var) = self.local_var(decl)? {
                        vars.push(var);
                    }
                }
                Term::ctor("Sdecl", vec![Term::List(vars)])
            }
            StmtKind::Expr(e) => Term::ctor("Sexpr", vec![self.lower_full_expr(*e)?]),
            StmtKind::If {
                cond_var,
                cond,
                then_branch,
                else_branch,
            } => {
                let var = self.cond_var(*cond_var)?;
                let c = self.lower_full_expr(*cond)?;
                let t = self.lower_stmt(*then_branch)?;
                let e = match else_branch {
                    Some(s) => self.lower_stmt(*s)?,
                    None => skip(),
                };
                Term::ctor("Sif", vec![var, c, t, e])
            }
            StmtKind::While {
                cond_var,
                cond,
                body,
            } => {
                let var = self.cond_var(*cond_var)?;
                let c = self.lower_full_expr(*cond)?;
                let s = self.lower_stmt(*body)?;
                Term::ctor("Swhile", vec![var, c, s])
            }
            StmtKind::For {
                init,
                cond,
                inc,
                body,
            } => {
                let init = init.map(|s| self.lower_stmt(s)).transpose()?;
                let c = self.lower_opt_full_expr(*cond)?;
                let inc = self.lower_opt_full_expr(*inc)?;
                let s = self.lower_stmt(*body)?;
                Term::ctor(
                    "Sfor",
                    vec![Term::option(init), Term::option(c), Term::option(inc), s],
                )
            }
            StmtKind::Do { body, cond } => {
                let s = self.lower_stmt(*body)?;
                let c = self.lower_full_expr(*cond)?;
                Term::ctor("Sdo", vec![s, c])
            }
            StmtKind::Return(e) => {
                Term::ctor("Sreturn", vec![Term::option(self.lower_opt_full_expr(*e)?)])
            }
            StmtKind::Break => Term::atom("Sbreak"),
            StmtKind::Continue => Term::atom("Scontinue"),
            StmtKind::Switch {
                cond_var,
                cond,
                body,
            } => {
                let var = self.cond_var(*cond_var)?;
                let c = self.lower_full_expr(*cond)?;
                let s = self.lower_stmt(*body)?;
                Term::ctor("Sswitch", vec![var, c, s])
            }
            StmtKind::Case { lo, hi } => {
                let label = match hi {
                    Some(hi) => Term::ctor("Range", vec![Term::int(*lo), Term::int(*hi)]),
                    None => Term::ctor("Exact", vec![Term::int(*lo)]),
                };
                Term::ctor("Scase", vec![label])
            }
            StmtKind::Default => Term::atom("Sdefault"),
            StmtKind::Label { name, body } => {
                Term::ctor("Slabeled", vec![Term::str(name), self.lower_stmt(*body)?])
            }
            StmtKind::Goto(label) => Term::ctor("Sgoto", vec![Term::str(label)]),
            StmtKind::Attributed { attrs, body } => {
                let attrs = attrs.iter().map(Term::str).collect::<Vec<_>>();
                Term::ctor("Sattr", vec![Term::List(attrs), self.lower_stmt(*body)?])
            }
            StmtKind::Null => skip(),
            StmtKind::Unsupported(tag) => {
                self.report(
                    ErrorCode::W4001,
                    format!("unsupported statement: {tag}"),
                    stmt.span,
                );
                Term::ctor("Sunsupported", vec![Term::str(tag)])
            }
        };
        Ok(term)
    }

    fn lower_stmts(&mut self, ids: &[StmtId]) -> Result<Term, LowerError> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            out.push(self.lower_stmt(id)?);
        }
        Ok(Term::List(out))
    }

    /// `Dvar "x" ty init?`; `None` for local declarations that are not
    /// variables (types, using-declarations, ...).
    fn local_var(&mut self, id: DeclId) -> Result<Option<Term>, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(id);
        let DeclKind::Variable(v) = &decl.kind else {
            tracing::trace!(kind = decl.kind.describe(), "skip local declaration");
            return Ok(None);
        };
        let ty = self.lower_type(v.ty)?;
        let init = self.lower_opt_full_expr(v.init)?;
        Ok(Some(Term::ctor(
            "Dvar",
            vec![Term::str(decl.name_str()), ty, Term::option(init)],
        )))
    }

    /// The variable declared in an `if`/`while`/`switch` condition.
    fn cond_var(&mut self, id: Option<DeclId>) -> Result<Term, LowerError> {
        let var = match id {
            Some(id) => self.local_var(id)?,
            None => None,
        };
        Ok(Term::option(var))
    }
}

/// The empty statement.
fn skip() -> Term {
    Term::ctor("Sseq", vec![Term::List(Vec::new())])
}
