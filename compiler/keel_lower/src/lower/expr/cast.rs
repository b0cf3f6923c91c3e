//! Casts.
//!
//! Every implicit conversion the front end inserted is a cast node, so this
//! is one of the hottest paths. Named casts (`static_cast`, `const_cast`,
//! `reinterpret_cast`) keep their spelling in the term; C-style and
//! functional casts lower to the cast kind they perform.

use keel_diagnostic::ErrorCode;
use keel_ir::{
    CastKind, CastStyle, DeclId, DeclKind, Expr, ExprId, ExprKind, TranslationUnit, TypeId,
};
use keel_term::Term;

use crate::lower::decl::builtin_term;
use crate::lower::{Annot, Lowerer};
use crate::LowerError;

impl Lowerer<'_> {
    pub(super) fn lower_cast(
        &mut self,
        kind: CastKind,
        style: CastStyle,
        operand: ExprId,
        conversion: Option<DeclId>,
        path: &[TypeId],
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        if kind == CastKind::BuiltinFnToFnPtr {
            if let Some(builtin) = builtin_callee(self.unit, operand) {
                let fnty = self.lower_type(self.unit.expr(operand).ty)?;
                return Ok(Term::ctor("Ebuiltin", vec![builtin_term(builtin), fnty]));
            }
        }

        let cast = match style {
            CastStyle::Reinterpret => {
                Some(Term::ctor("Creinterpret", vec![self.lower_type(expr.ty)?]))
            }
            CastStyle::Const => Some(Term::ctor("Cconst", vec![self.lower_type(expr.ty)?])),
            CastStyle::Static => self
                .cast_term(kind, conversion, path, operand, expr)?
                .map(|c| Term::ctor("Cstatic", vec![c])),
            CastStyle::Dynamic => Some(self.dynamic_cast(operand, expr)?),
            CastStyle::Implicit | CastStyle::CStyle | CastStyle::Functional => {
                self.cast_term(kind, conversion, path, operand, expr)?
            }
        };

        let Some(cast) = cast else {
            self.report(
                ErrorCode::W4002,
                format!("unsupported cast kind {}", kind.name()),
                expr.span,
            );
            return self.finish(
                "Eunsupported",
                vec![Term::str(format!("{} cast", kind.name()))],
                expr,
                Annot::VALCAT | Annot::TYPE,
            );
        };
        let e = self.lower_expr(operand)?;
        self.finish("Ecast", vec![cast, e], expr, Annot::VALCAT | Annot::TYPE)
    }

    /// The cast term for `kind`; `None` if the kind has no counterpart.
    fn cast_term(
        &mut self,
        kind: CastKind,
        conversion: Option<DeclId>,
        path: &[TypeId],
        operand: ExprId,
        expr: &Expr,
    ) -> Result<Option<Term>, LowerError> {
        let atom = |name: &'static str| Ok(Some(Term::atom(name)));
        match kind {
            CastKind::LValueToRValue => atom("Cl2r"),
            CastKind::Dependent => atom("Cdependent"),
            CastKind::FunctionToPointerDecay => atom("Cfun2ptr"),
            CastKind::NoOp => atom("Cnoop"),
            CastKind::BitCast => atom("Cbitcast"),
            CastKind::IntegralCast => atom("Cintegral"),
            CastKind::IntegralToBoolean => atom("Cint2bool"),
            CastKind::PointerToBoolean => atom("Cptr2bool"),
            CastKind::PointerToIntegral => atom("Cptr2int"),
            CastKind::IntegralToPointer => atom("Cint2ptr"),
            CastKind::ArrayToPointerDecay => atom("Carray2ptr"),
            CastKind::BuiltinFnToFnPtr => atom("Cbuiltin2fun"),
            CastKind::NullToPointer => atom("Cnull2ptr"),
            CastKind::ToVoid => atom("C2void"),
            CastKind::FloatingToIntegral => atom("Cfloat2int"),
            CastKind::ConstructorConversion | CastKind::UserDefinedConversion => {
                let function = conversion.ok_or(LowerError::MissingPart {
                    what: "user-defined conversion",
                    part: "conversion function",
                    span: expr.span,
                })?;
                Ok(Some(Term::ctor("Cuser", vec![self.object_name(function)?])))
            }
            CastKind::DerivedToBase | CastKind::UncheckedDerivedToBase => {
                let path = self.base_path(path, expr)?;
                Ok(Some(Term::ctor("Cderived2base", vec![path])))
            }
            CastKind::BaseToDerived => {
                let path = self.base_path(path, expr)?;
                Ok(Some(Term::ctor("Cbase2derived", vec![path])))
            }
            CastKind::Dynamic => self.dynamic_cast(operand, expr).map(Some),
            CastKind::IntegralToFloating
            | CastKind::FloatingCast
            | CastKind::FloatingToBoolean
            | CastKind::BaseToDerivedMemberPointer
            | CastKind::DerivedToBaseMemberPointer
            | CastKind::NullToMemberPointer
            | CastKind::ReinterpretMemberPointer
            | CastKind::LValueBitCast
            | CastKind::AtomicToNonAtomic
            | CastKind::NonAtomicToAtomic
            | CastKind::VectorSplat => Ok(None),
        }
    }

    /// `Cdynamic from to`, whatever conversion the front end recorded.
    fn dynamic_cast(&mut self, operand: ExprId, expr: &Expr) -> Result<Term, LowerError> {
        let from = self.lower_type(self.unit.expr(operand).ty)?;
        let to = self.lower_type(expr.ty)?;
        Ok(Term::ctor("Cdynamic", vec![from, to]))
    }

    /// Names of the records along a derived/base conversion.
    fn base_path(&mut self, path: &[TypeId], expr: &Expr) -> Result<Term, LowerError> {
        let mut names = Vec::with_capacity(path.len());
        for &step in path {
            let record = self.unit.record_of(step).ok_or_else(|| LowerError::Malformed {
                what: "base path",
                detail: "step is not a record type".to_owned(),
                span: expr.span,
            })?;
            names.push(self.type_name(record)?);
        }
        Ok(Term::List(names))
    }
}

/// Builtin name of a function reference, seen through parentheses.
fn builtin_callee(unit: &TranslationUnit, mut id: ExprId) -> Option<&str> {
    loop {
        match &unit.expr(id).kind {
            ExprKind::Paren(inner) => id = *inner,
            ExprKind::DeclRef { decl } => {
                return match &unit.decl(*decl).kind {
                    DeclKind::Function(f) => f.builtin.as_deref(),
                    _ => None,
                }
            }
            _ => return None,
        }
    }
}
