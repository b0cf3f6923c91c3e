//! Shared subexpressions: `a ?: b`, array-initialization loops and the
//! opaque references inside them.

use keel_diagnostic::ErrorCode;
use keel_ir::{Expr, ExprId, ExprKind};
use keel_term::Term;

use crate::lower::{Annot, Lowerer};
use crate::LowerError;

impl Lowerer<'_> {
    /// `Eif2 idx common c t e V T`. `common` is evaluated once; `cond` and
    /// `then_expr` see it through `opaque`.
    pub(super) fn lower_binary_conditional(
        &mut self,
        common: ExprId,
        opaque: ExprId,
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let common = self.lower_expr(common)?;
        let index = self.opaque.fresh(opaque, expr.span)?;
        let arms = self.within_binder(opaque, |this| {
            let c = this.lower_expr(cond)?;
            let t = this.lower_expr(then_expr)?;
            let e = this.lower_expr(else_expr)?;
            Ok((c, t, e))
        });
        let (c, t, e) = arms?;
        self.finish(
            "Eif2",
            vec![Term::nat(index), common, c, t, e],
            expr,
            Annot::VALCAT | Annot::TYPE,
        )
    }

    /// `Earrayloop_init idx src depth size body T`. The source array is
    /// bound to `common`; `depth` is the loop's own nesting level, which
    /// `Earrayloop_index` in the body refers to.
    pub(super) fn lower_array_loop(
        &mut self,
        common: ExprId,
        size: u64,
        body: ExprId,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let unit = self.unit;
        let ExprKind::OpaqueValue {
            source: Some(source),
        } = unit.expr(common).kind
        else {
            return Err(LowerError::MissingPart {
                what: "array initialization loop",
                part: "source array",
                span: expr.span,
            });
        };
        let src = self.lower_expr(source)?;
        let index = self.opaque.fresh(common, expr.span)?;
        let lowered = self.within_binder(common, |this| {
            let depth = this.opaque.depth();
            let body = this.lower_expr(body)?;
            Ok((depth, body))
        });
        let (depth, body) = lowered?;
        self.finish(
            "Earrayloop_init",
            vec![
                Term::nat(index),
                src,
                Term::nat(depth),
                Term::nat(size),
                body,
            ],
            expr,
            Annot::TYPE,
        )
    }

    /// `Eopaque_ref idx V T` for a bound node.
    pub(super) fn lower_opaque_ref(&mut self, id: ExprId, expr: &Expr) -> Result<Term, LowerError> {
        match self.opaque.find(id) {
            Some(index) => self.finish(
                "Eopaque_ref",
                vec![Term::nat(index)],
                expr,
                Annot::VALCAT | Annot::TYPE,
            ),
            None => self.unsupported_expr("free opaque value", expr, ErrorCode::W4001),
        }
    }

    /// Run `f` one nesting level down with `node` bound, then unbind it,
    /// whether or not `f` succeeded.
    fn within_binder<T>(
        &mut self,
        node: ExprId,
        f: impl FnOnce(&mut Self) -> Result<T, LowerError>,
    ) -> Result<T, LowerError> {
        self.opaque.enter_nesting();
        let result = f(self);
        self.opaque.exit_nesting();
        self.opaque.release(node);
        result
    }
}
