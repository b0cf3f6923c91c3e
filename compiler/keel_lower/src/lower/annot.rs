//! Which annotations accompany an expression term.

use bitflags::bitflags;

use crate::Mode;

bitflags! {
    /// Trailing annotations of an expression term.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub(crate) struct Annot: u8 {
        /// Value category.
        const VALCAT = 1 << 0;
        /// Static type.
        const TYPE = 1 << 1;
        /// `Some ty` when the type is known, `None` when it is dependent.
        const TYPE_OPT = 1 << 2;
    }
}

impl Annot {
    /// Calls and subscripts: the result type is unresolved until
    /// instantiation.
    pub(crate) fn call(mode: Mode) -> Self {
        match mode {
            Mode::Generic => Annot::empty(),
            Mode::Concrete => Annot::TYPE,
        }
    }

    /// Builtin unary and binary operators.
    pub(crate) fn operator(mode: Mode) -> Self {
        match mode {
            Mode::Generic => Annot::TYPE_OPT,
            Mode::Concrete => Annot::TYPE,
        }
    }
}
