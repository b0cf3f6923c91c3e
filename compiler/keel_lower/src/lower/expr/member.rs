//! Member access and field names.

use keel_ir::{DeclId, DeclKind, Expr, ExprId};
use keel_term::Term;

use crate::lower::{Annot, Lowerer};
use crate::LowerError;

impl Lowerer<'_> {
    pub(super) fn lower_member(
        &mut self,
        base: ExprId,
        member: DeclId,
        arrow: bool,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(member);
        match &decl.kind {
            DeclKind::Field(f) => {
                let obj = self.object_operand(base, arrow)?;
                let field = self.field_name(member)?;
                let access = self.finish("Emember", vec![obj, field], expr, Annot::TYPE)?;
                Ok(self.read_through(access, f.ty))
            }
            DeclKind::IndirectField { chain } => {
                let Some((&last, path)) = chain.split_last() else {
                    return Err(LowerError::MissingPart {
                        what: "indirect field",
                        part: "field chain",
                        span: expr.span,
                    });
                };
                let mut obj = self.object_operand(base, arrow)?;
                for &step in path {
                    let DeclKind::Field(f) = &unit.decl(step).kind else {
                        return Err(LowerError::Malformed {
                            what: "indirect field",
                            detail: format!("{} in field chain", unit.decl(step).kind.describe()),
                            span: expr.span,
                        });
                    };
                    let field = self.field_name(step)?;
                    let ty = self.lower_type(f.ty)?;
                    obj = Term::ctor("Emember", vec![obj, field, ty]);
                }
                let last_decl = unit.decl(last);
                let DeclKind::Field(f) = &last_decl.kind else {
                    return Err(LowerError::Malformed {
                        what: "indirect field",
                        detail: format!("{} ends the field chain", last_decl.kind.describe()),
                        span: expr.span,
                    });
                };
                let field = self.field_name(last)?;
                let access = self.finish("Emember", vec![obj, field], expr, Annot::TYPE)?;
                Ok(self.read_through(access, f.ty))
            }
            // Static members: the object is evaluated for its effects only.
            DeclKind::Variable(_) | DeclKind::EnumConstant(_) => {
                let obj = self.lower_expr(base)?;
                let var = self.lower_decl_ref(member, expr)?;
                Ok(Term::ctor("Ecomma", vec![obj, var]))
            }
            DeclKind::Method(m) if m.is_static => {
                let obj = self.lower_expr(base)?;
                let var = self.lower_decl_ref(member, expr)?;
                Ok(Term::ctor("Ecomma", vec![obj, var]))
            }
            DeclKind::Method(_)
            | DeclKind::Function(_)
            | DeclKind::Constructor(_)
            | DeclKind::Destructor(_)
            | DeclKind::Record(_)
            | DeclKind::Enum(_)
            | DeclKind::Param(_)
            | DeclKind::Namespace(_)
            | DeclKind::LinkageSpec(_)
            | DeclKind::StaticAssert { .. }
            | DeclKind::Typedef { .. }
            | DeclKind::TypeAliasTemplate
            | DeclKind::TemplateParam(_)
            | DeclKind::FunctionTemplate { .. }
            | DeclKind::ClassTemplate { .. }
            | DeclKind::Using
            | DeclKind::UsingDirective
            | DeclKind::UsingShadow
            | DeclKind::Friend
            | DeclKind::Empty => Err(LowerError::Malformed {
                what: "member access",
                detail: format!("{} outside a call", decl.kind.describe()),
                span: expr.span,
            }),
        }
    }

    /// `Nfield class name`.
    pub(crate) fn field_name(&mut self, field: DeclId) -> Result<Term, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(field);
        let class = unit.semantic_parent(field).ok_or(LowerError::MissingPart {
            what: "field",
            part: "enclosing record",
            span: decl.span,
        })?;
        let class = self.type_name(class)?;
        let name = self.member_name(field)?;
        Ok(Term::ctor("Nfield", vec![class, name]))
    }

    /// Source name of a field; an anonymous struct or union member is
    /// `Nanon` of its record.
    pub(crate) fn member_name(&mut self, field: DeclId) -> Result<Term, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(field);
        let DeclKind::Field(f) = &decl.kind else {
            return Err(LowerError::Malformed {
                what: "field name",
                detail: format!("{} is not a field", decl.kind.describe()),
                span: decl.span,
            });
        };
        if !decl.is_anonymous() {
            return Ok(Term::str(decl.name_str()));
        }
        let ty = match unit.record_of(f.ty) {
            Some(record) => self.type_name(record)?,
            None => self.lower_type(f.ty)?,
        };
        Ok(Term::ctor("Nanon", vec![ty]))
    }
}
