//! Builtin unary, binary and compound-assignment operators.

use keel_diagnostic::ErrorCode;
use keel_ir::{BinaryOp, Expr, ExprId, UnaryOp};
use keel_term::Term;

use crate::lower::{Annot, Lowerer};
use crate::LowerError;

impl Lowerer<'_> {
    pub(super) fn lower_unary(
        &mut self,
        op: UnaryOp,
        operand: ExprId,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let annot = Annot::operator(self.config.mode);
        let (head, uop) = match op {
            UnaryOp::Extension => return self.lower_expr(operand),
            UnaryOp::Real | UnaryOp::Imag | UnaryOp::Coawait => {
                self.report(
                    ErrorCode::W4007,
                    format!("unsupported operator `{}`", op.spelling()),
                    expr.span,
                );
                return self.finish(
                    "Eunsupported",
                    vec![Term::str(format!("unary operator {}", op.spelling()))],
                    expr,
                    Annot::VALCAT | Annot::TYPE,
                );
            }
            UnaryOp::AddrOf => {
                let e = self.lower_expr(operand)?;
                return Ok(Term::ctor("Eaddrof", vec![e]));
            }
            UnaryOp::Deref => {
                let e = self.lower_expr(operand)?;
                return self.finish("Ederef", vec![e], expr, annot);
            }
            UnaryOp::PreInc => ("Epreinc", None),
            UnaryOp::PreDec => ("Epredec", None),
            UnaryOp::PostInc => ("Epostinc", None),
            UnaryOp::PostDec => ("Epostdec", None),
            UnaryOp::Plus => ("Eunop", Some("Uplus")),
            UnaryOp::Minus => ("Eunop", Some("Uminus")),
            UnaryOp::Not => ("Eunop", Some("Ubnot")),
            UnaryOp::LNot => ("Eunop", Some("Unot")),
        };
        let e = self.lower_expr(operand)?;
        let args = match uop {
            Some(u) => vec![Term::atom(u), e],
            None => vec![e],
        };
        self.finish(head, args, expr, annot)
    }

    /// Operands are lowered left to right before the operator is chosen.
    pub(super) fn lower_binary(
        &mut self,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let l = self.lower_expr(lhs)?;
        let r = self.lower_expr(rhs)?;
        let annot = Annot::operator(self.config.mode);
        match op {
            // Short-circuit and sequencing operators carry no type: it is
            // always `bool` or the type of the right operand.
            BinaryOp::LAnd => Ok(Term::ctor("Eseqand", vec![l, r])),
            BinaryOp::LOr => Ok(Term::ctor("Eseqor", vec![l, r])),
            BinaryOp::Comma => Ok(Term::ctor("Ecomma", vec![l, r])),
            BinaryOp::Assign => self.finish("Eassign", vec![l, r], expr, annot),
            BinaryOp::PtrMemD
            | BinaryOp::PtrMemI
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::Cmp
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::And
            | BinaryOp::Xor
            | BinaryOp::Or => {
                let bop = binop_atom(op, expr)?;
                self.finish("Ebinop", vec![Term::atom(bop), l, r], expr, annot)
            }
        }
    }

    /// `a op= b` stays a single term so `a` is evaluated once.
    pub(super) fn lower_compound_assign(
        &mut self,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let bop = binop_atom(op, expr)?;
        let l = self.lower_expr(lhs)?;
        let r = self.lower_expr(rhs)?;
        let annot = Annot::operator(self.config.mode);
        self.finish("Eassign_op", vec![Term::atom(bop), l, r], expr, annot)
    }
}

/// Arithmetic, bitwise and comparison operators.
fn binop_atom(op: BinaryOp, expr: &Expr) -> Result<&'static str, LowerError> {
    Ok(match op {
        BinaryOp::PtrMemD => "Bdotp",
        BinaryOp::PtrMemI => "Bdotip",
        BinaryOp::Mul => "Bmul",
        BinaryOp::Div => "Bdiv",
        BinaryOp::Rem => "Bmod",
        BinaryOp::Add => "Badd",
        BinaryOp::Sub => "Bsub",
        BinaryOp::Shl => "Bshl",
        BinaryOp::Shr => "Bshr",
        BinaryOp::Cmp => "Bcmp",
        BinaryOp::Lt => "Blt",
        BinaryOp::Gt => "Bgt",
        BinaryOp::Le => "Ble",
        BinaryOp::Ge => "Bge",
        BinaryOp::Eq => "Beq",
        BinaryOp::Ne => "Bneq",
        BinaryOp::And => "Band",
        BinaryOp::Xor => "Bxor",
        BinaryOp::Or => "Bor",
        BinaryOp::LAnd | BinaryOp::LOr | BinaryOp::Assign | BinaryOp::Comma => {
            return Err(LowerError::Malformed {
                what: "arithmetic operator",
                detail: format!("`{}` has no arithmetic form", op.spelling()),
                span: expr.span,
            })
        }
    })
}
