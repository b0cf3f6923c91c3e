//! `new` and `delete` expressions.

use keel_ir::{DeclId, DeclKind, Expr, ExprId, TypeId};
use keel_term::Term;

use crate::lower::Lowerer;
use crate::LowerError;

impl Lowerer<'_> {
    /// `Enew (f, fnty) [placement] ty size? init?`
    pub(super) fn lower_new(
        &mut self,
        operator_new: Option<DeclId>,
        placement: &[ExprId],
        allocated: TypeId,
        array_size: Option<ExprId>,
        init: Option<ExprId>,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let function = operator_new.ok_or(LowerError::MissingOperatorNew { span: expr.span })?;
        let function = self.allocation_function(function, expr)?;
        let placement = self.lower_exprs(placement)?;
        let ty = self.lower_type(allocated)?;
        let size = match array_size {
            Some(e) => Some(self.lower_expr(e)?),
            None => None,
        };
        let init = match init {
            Some(e) => Some(self.lower_expr(e)?),
            None => None,
        };
        Ok(Term::ctor(
            "Enew",
            vec![
                function,
                Term::List(placement),
                ty,
                Term::option(size),
                Term::option(init),
            ],
        ))
    }

    /// `Edelete arr (f, fnty) e ty`
    pub(super) fn lower_delete(
        &mut self,
        array: bool,
        operator_delete: Option<DeclId>,
        destroying: bool,
        arg: ExprId,
        destroyed: TypeId,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        if destroying {
            return Err(LowerError::DestroyingDelete { span: expr.span });
        }
        let function =
            operator_delete.ok_or(LowerError::MissingOperatorDelete { span: expr.span })?;
        let function = self.allocation_function(function, expr)?;
        let e = self.lower_expr(arg)?;
        let ty = self.lower_type(destroyed)?;
        Ok(Term::ctor(
            "Edelete",
            vec![Term::bool(array), function, e, ty],
        ))
    }

    /// `(name, fnty)` of an allocation or deallocation function. Class
    /// scope operators are implicitly static.
    fn allocation_function(&mut self, id: DeclId, expr: &Expr) -> Result<Term, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(id);
        let function = match &decl.kind {
            DeclKind::Function(f) => f,
            DeclKind::Method(m) => &m.func,
            _ => {
                return Err(LowerError::Malformed {
                    what: "allocation function",
                    detail: format!("{} is not a function", decl.kind.describe()),
                    span: expr.span,
                })
            }
        };
        let name = self.object_name(id)?;
        let fnty = self.function_decl_type(function)?;
        Ok(Term::pair(name, fnty))
    }
}
