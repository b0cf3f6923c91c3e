//! Calls: plain, method, pointer-to-member and overloaded-operator calls.
//!
//! Operator calls take the same shape as the call they stand for, with the
//! operator kind as an extra tag, so the semantics needs one call rule.

use keel_diagnostic::ErrorCode;
use keel_ir::{
    BinaryOp, DeclId, DeclKind, Expr, ExprId, ExprKind, MethodDecl, OverloadedOperator,
    TranslationUnit, ValueCategory,
};
use keel_term::Term;

use crate::lower::types::category_term;
use crate::lower::{Annot, Lowerer};
use crate::LowerError;

impl Lowerer<'_> {
    pub(super) fn lower_call(
        &mut self,
        callee: ExprId,
        args: &[ExprId],
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let unresolved = self.config.is_generic()
            && (expr.dependent || self.unit.expr(callee).dependent);
        let f = self.lower_expr(callee)?;
        let args = self.lower_exprs(args)?;
        if unresolved {
            return Ok(Term::ctor("Eunresolved_call", vec![f, Term::List(args)]));
        }
        let annot = Annot::call(self.config.mode);
        self.finish("Ecall", vec![f, Term::List(args)], expr, annot)
    }

    pub(super) fn lower_member_call(
        &mut self,
        callee: ExprId,
        args: &[ExprId],
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let unit = self.unit;
        let callee_id = skip_parens(unit, callee);
        let callee_expr = unit.expr(callee_id);
        let annot = Annot::call(self.config.mode);

        let (target, obj) = match &callee_expr.kind {
            ExprKind::Member {
                base,
                member,
                arrow,
                qualified,
            } => {
                let DeclKind::Method(method) = &unit.decl(*member).kind else {
                    return Err(LowerError::Malformed {
                        what: "member call",
                        detail: format!("callee is a {}", unit.decl(*member).kind.describe()),
                        span: expr.span,
                    });
                };
                if method.is_static {
                    // Static methods called through an object: the member
                    // expression already sequences the object.
                    let f = self.lower_expr(callee_id)?;
                    let args = self.lower_exprs(args)?;
                    return self.finish("Ecall", vec![f, Term::List(args)], expr, annot);
                }
                let dispatch = dispatch_atom(method.is_virtual && !*qualified);
                let name = self.object_name(*member)?;
                let fnty = self.function_decl_type(&method.func)?;
                let obj = self.object_operand(*base, *arrow)?;
                let target = Term::inl(Term::Tuple(vec![name, Term::atom(dispatch), fnty]));
                (target, obj)
            }
            ExprKind::Binary {
                op: op @ (BinaryOp::PtrMemD | BinaryOp::PtrMemI),
                lhs,
                rhs,
            } => {
                self.report(
                    ErrorCode::W4004,
                    "call through a pointer to member",
                    expr.span,
                );
                let obj = self.object_operand(*lhs, *op == BinaryOp::PtrMemI)?;
                let member = self.lower_expr(*rhs)?;
                (Term::inr(member), obj)
            }
            _ => {
                return Err(LowerError::Malformed {
                    what: "member call",
                    detail: "callee is neither a member access nor a pointer to member".to_owned(),
                    span: expr.span,
                })
            }
        };
        let args = self.lower_exprs(args)?;
        self.finish(
            "Emember_call",
            vec![target, obj, Term::List(args)],
            expr,
            annot,
        )
    }

    pub(super) fn lower_operator_call(
        &mut self,
        op: OverloadedOperator,
        callee: DeclId,
        args: &[ExprId],
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(callee);
        let oo = Term::atom(operator_atom(op));
        match &decl.kind {
            DeclKind::Method(method) if !method.is_static => {
                let [object, rest @ ..] = args else {
                    return Err(LowerError::MissingPart {
                        what: "member operator call",
                        part: "object argument",
                        span: expr.span,
                    });
                };
                let name = self.object_name(callee)?;
                let fnty = self.function_decl_type(&method.func)?;
                let dispatch = Term::atom(dispatch_atom(method.is_virtual));
                let obj = self.lower_expr(*object)?;
                let rest = self.lower_exprs(rest)?;
                let target = Term::inl(Term::Tuple(vec![name, dispatch, fnty]));
                self.finish(
                    "Eoperator_member_call",
                    vec![oo, target, obj, Term::List(rest)],
                    expr,
                    Annot::TYPE,
                )
            }
            DeclKind::Function(function)
            | DeclKind::Method(MethodDecl { func: function, .. }) => {
                // Same callee shape as `Ecall`: the decayed function.
                let fnty = self.function_decl_type(function)?;
                let var = Term::ctor(
                    "Evar",
                    vec![Term::ctor("Gname", vec![self.object_name(callee)?]), fnty.clone()],
                );
                let f = Term::ctor(
                    "Ecast",
                    vec![
                        Term::atom("Cfun2ptr"),
                        var,
                        category_term(ValueCategory::Prvalue),
                        Term::ctor("Tptr", vec![fnty]),
                    ],
                );
                let args = self.lower_exprs(args)?;
                self.finish(
                    "Eoperator_call",
                    vec![oo, f, Term::List(args)],
                    expr,
                    Annot::TYPE,
                )
            }
            _ => Err(LowerError::Malformed {
                what: "operator call",
                detail: format!("callee is a {}", decl.kind.describe()),
                span: expr.span,
            }),
        }
    }

    /// Arguments of an inherited constructor are the forwarded parameters
    /// of the inheriting one, `#0`, `#1`, ...
    pub(super) fn lower_inherited_ctor(
        &mut self,
        ctor: DeclId,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let unit = self.unit;
        let DeclKind::Constructor(c) = &unit.decl(ctor).kind else {
            return Err(LowerError::Malformed {
                what: "inherited constructor",
                detail: format!("target is a {}", unit.decl(ctor).kind.describe()),
                span: expr.span,
            });
        };
        let name = self.object_name(ctor)?;
        let types = self.param_types(&c.params)?;
        let args = types
            .into_iter()
            .enumerate()
            .map(|(i, ty)| {
                Term::ctor(
                    "Evar",
                    vec![Term::ctor("Lname", vec![Term::str(format!("#{i}"))]), ty],
                )
            })
            .collect::<Vec<_>>();
        self.finish("Econstructor", vec![name, Term::List(args)], expr, Annot::TYPE)
    }

    /// The object of a member access: `obj`, or `*obj` for `->`.
    pub(super) fn object_operand(&mut self, base: ExprId, arrow: bool) -> Result<Term, LowerError> {
        let obj = self.lower_expr(base)?;
        if !arrow {
            return Ok(obj);
        }
        let unit = self.unit;
        let base_expr = unit.expr(base);
        let pointee = unit.pointee(base_expr.ty).ok_or_else(|| LowerError::Malformed {
            what: "arrow member access",
            detail: "base is not a pointer".to_owned(),
            span: base_expr.span,
        })?;
        let pointee = self.lower_type(pointee)?;
        Ok(Term::ctor("Ederef", vec![obj, pointee]))
    }
}

pub(super) fn skip_parens(unit: &TranslationUnit, mut id: ExprId) -> ExprId {
    while let ExprKind::Paren(inner) = unit.expr(id).kind {
        id = inner;
    }
    id
}

fn dispatch_atom(is_virtual: bool) -> &'static str {
    if is_virtual {
        "Virtual"
    } else {
        "Direct"
    }
}

fn operator_atom(op: OverloadedOperator) -> &'static str {
    match op {
        OverloadedOperator::New => "OONew",
        OverloadedOperator::Delete => "OODelete",
        OverloadedOperator::ArrayNew => "OONew_Array",
        OverloadedOperator::ArrayDelete => "OODelete_Array",
        OverloadedOperator::Plus => "OOPlus",
        OverloadedOperator::Minus => "OOMinus",
        OverloadedOperator::Star => "OOStar",
        OverloadedOperator::Slash => "OOSlash",
        OverloadedOperator::Percent => "OOPercent",
        OverloadedOperator::Caret => "OOCaret",
        OverloadedOperator::Amp => "OOAmp",
        OverloadedOperator::Pipe => "OOPipe",
        OverloadedOperator::Tilde => "OOTilde",
        OverloadedOperator::Exclaim => "OOExclaim",
        OverloadedOperator::Equal => "OOEqual",
        OverloadedOperator::Less => "OOLess",
        OverloadedOperator::Greater => "OOGreater",
        OverloadedOperator::PlusEqual => "OOPlusEqual",
        OverloadedOperator::MinusEqual => "OOMinusEqual",
        OverloadedOperator::StarEqual => "OOStarEqual",
        OverloadedOperator::SlashEqual => "OOSlashEqual",
        OverloadedOperator::PercentEqual => "OOPercentEqual",
        OverloadedOperator::CaretEqual => "OOCaretEqual",
        OverloadedOperator::AmpEqual => "OOAmpEqual",
        OverloadedOperator::PipeEqual => "OOPipeEqual",
        OverloadedOperator::LessLess => "OOLessLess",
        OverloadedOperator::GreaterGreater => "OOGreaterGreater",
        OverloadedOperator::LessLessEqual => "OOLessLessEqual",
        OverloadedOperator::GreaterGreaterEqual => "OOGreaterGreaterEqual",
        OverloadedOperator::EqualEqual => "OOEqualEqual",
        OverloadedOperator::ExclaimEqual => "OOExclaimEqual",
        OverloadedOperator::LessEqual => "OOLessEqual",
        OverloadedOperator::GreaterEqual => "OOGreaterEqual",
        OverloadedOperator::Spaceship => "OOSpaceship",
        OverloadedOperator::AmpAmp => "OOAmpAmp",
        OverloadedOperator::PipePipe => "OOPipePipe",
        OverloadedOperator::PlusPlus => "OOPlusPlus",
        OverloadedOperator::MinusMinus => "OOMinusMinus",
        OverloadedOperator::Comma => "OOComma",
        OverloadedOperator::ArrowStar => "OOArrowStar",
        OverloadedOperator::Arrow => "OOArrow",
        OverloadedOperator::Call => "OOCall",
        OverloadedOperator::Subscript => "OOSubscript",
        OverloadedOperator::Coawait => "OOCoawait",
    }
}
