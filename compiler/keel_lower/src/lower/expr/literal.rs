//! Integer, character and string literal encoding.

use keel_ir::{Expr, TypeId, TypeKind};
use keel_term::{Num, Term};

use crate::lower::Lowerer;
use crate::LowerError;

impl Lowerer<'_> {
    /// `Eint z ty`, with the raw bits read as signed or unsigned per the
    /// literal's type.
    pub(super) fn lower_integer(&mut self, bits: u128, expr: &Expr) -> Result<Term, LowerError> {
        let unit = self.unit;
        let width = match unit.integer_width(expr.ty) {
            0 => 128,
            w => w,
        };
        let value = if unit.is_signed_integer(expr.ty) {
            Num::int(sign_extend(bits, width))
        } else {
            Num::int_unsigned(truncate(bits, width))
        };
        let ty = self.lower_type(expr.ty)?;
        Ok(Term::ctor("Eint", vec![Term::Num(value), ty]))
    }

    /// `Estring [units] elem_ty`. Code units are reassembled from bytes in
    /// target byte order.
    pub(super) fn lower_string(
        &mut self,
        bytes: &[u8],
        char_width: u8,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let width = usize::from(char_width);
        if width == 0 || width > 4 || bytes.len() % width != 0 {
            return Err(LowerError::Malformed {
                what: "string literal",
                detail: format!("{} bytes of {width}-byte code units", bytes.len()),
                span: expr.span,
            });
        }
        let big_endian = self.unit.target.big_endian;
        let units = bytes
            .chunks_exact(width)
            .map(|chunk| Term::nat(code_unit(chunk, big_endian)))
            .collect::<Vec<_>>();
        let elem = self.string_elem(expr.ty, char_width);
        let elem = self.lower_type(elem)?;
        Ok(Term::ctor("Estring", vec![Term::List(units), elem]))
    }

    /// Element type of a string literal's array type.
    fn string_elem(&self, ty: TypeId, char_width: u8) -> TypeId {
        let unit = self.unit;
        match unit.ty(unit.unqualified(ty)) {
            TypeKind::Array { elem, .. } | TypeKind::IncompleteArray(elem) => unit.unqualified(*elem),
            _ => match char_width {
                2 => TypeId::CHAR16,
                4 => TypeId::CHAR32,
                _ => TypeId::CHAR,
            },
        }
    }
}

fn code_unit(chunk: &[u8], big_endian: bool) -> u32 {
    let fold = |acc: u32, b: &u8| (acc << 8) | u32::from(*b);
    if big_endian {
        chunk.iter().fold(0, fold)
    } else {
        chunk.iter().rev().fold(0, fold)
    }
}

fn truncate(bits: u128, width: u32) -> u128 {
    if width >= 128 {
        bits
    } else {
        bits & ((1u128 << width) - 1)
    }
}

#[expect(
    clippy::cast_possible_wrap,
    reason = "two's-complement reinterpretation of literal bits"
)]
fn sign_extend(bits: u128, width: u32) -> i128 {
    if width >= 128 {
        return bits as i128;
    }
    let shift = 128 - width;
    ((bits << shift) as i128) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_extension_respects_width() {
        assert_eq!(sign_extend(0xff, 8), -1);
        assert_eq!(sign_extend(0x7f, 8), 127);
        assert_eq!(sign_extend(0xffff_ffff, 32), -1);
        assert_eq!(sign_extend(u128::MAX, 128), -1);
    }

    #[test]
    fn code_units_follow_byte_order() {
        assert_eq!(code_unit(&[0x34, 0x12], false), 0x1234);
        assert_eq!(code_unit(&[0x12, 0x34], true), 0x1234);
        assert_eq!(code_unit(&[0x41], false), 0x41);
    }
}
