use keel_ir::{DeclId, DeclKind, EnumConstantDecl, EnumDecl};
use keel_term::Term;

use crate::lower::Lowerer;
use crate::LowerError;

impl Lowerer<'_> {
    /// `Denum name ty ["A"; ...]` followed by one `Denum_constant` per
    /// enumerator. An enum without an underlying type is only a `Dtype`.
    pub(super) fn lower_enum(&mut self, id: DeclId, e: &EnumDecl) -> Result<Vec<Term>, LowerError> {
        let unit = self.unit;
        let name = self.type_name(id)?;
        let Some(underlying) = e.underlying else {
            return Ok(vec![Term::ctor("Dtype", vec![name])]);
        };
        let constants = unit
            .decl(id)
            .children
            .iter()
            .copied()
            .filter(|c| matches!(unit.decl(*c).kind, DeclKind::EnumConstant(_)))
            .collect::<Vec<_>>();
        let names = constants
            .iter()
            .map(|c| Term::str(unit.decl(*c).name_str()))
            .collect::<Vec<_>>();

        let mut out = Vec::with_capacity(constants.len() + 1);
        let ty = self.lower_type(underlying)?;
        out.push(Term::ctor("Denum", vec![name, ty, Term::List(names)]));
        for constant in constants {
            out.extend(self.lower_decl(constant)?);
        }
        Ok(out)
    }

    /// `Denum_constant name ty underlying (inl n%N | inr z%Z) init?`.
    /// Constants of character-like enums are masked to the character width
    /// and printed as naturals.
    pub(super) fn lower_enum_constant(
        &mut self,
        id: DeclId,
        c: &EnumConstantDecl,
    ) -> Result<Term, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(id);
        let underlying = unit
            .semantic_parent(id)
            .and_then(|p| match &unit.decl(p).kind {
                DeclKind::Enum(e) => e.underlying,
                _ => None,
            })
            .ok_or(LowerError::MissingPart {
                what: "enum constant",
                part: "underlying type",
                span: decl.span,
            })?;

        let name = self.object_name(id)?;
        let ty = self.lower_type(c.ty)?;
        let underlying_term = self.lower_type(underlying)?;
        let value = match unit.builtin_of(underlying) {
            Some(b) if b.is_char_like() => {
                Term::inl(Term::nat(mask(c.value, b.bit_width(&unit.target))))
            }
            _ => Term::inr(Term::int(c.value)),
        };
        let init = self.lower_opt_full_expr(c.init)?;
        Ok(Term::ctor(
            "Denum_constant",
            vec![name, ty, underlying_term, value, Term::option(init)],
        ))
    }
}

#[expect(
    clippy::cast_sign_loss,
    reason = "two's-complement reinterpretation before masking"
)]
fn mask(value: i128, width: u32) -> u128 {
    let bits = value as u128;
    if width >= 128 {
        bits
    } else {
        bits & ((1u128 << width) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::mask;

    #[test]
    fn negative_char_values_wrap_to_width() {
        assert_eq!(mask(-1, 8), 0xff);
        assert_eq!(mask(65, 8), 65);
        assert_eq!(mask(-2, 16), 0xfffe);
    }
}
