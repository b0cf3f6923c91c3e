//! Index newtypes for the unit arenas.
//!
//! Each arena has its own index space, so a `DeclId` can never be used to
//! look up an expression by accident.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw arena index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Index into the owning arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// Index of a declaration in [`TranslationUnit`](crate::TranslationUnit).
    DeclId
);
define_id!(
    /// Index of an expression node.
    ExprId
);
define_id!(
    /// Index of a statement node.
    StmtId
);
define_id!(
    /// Index of an interned type.
    ///
    /// The builtin types are pre-interned at fixed indices, see the
    /// associated constants.
    TypeId
);

impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const CHAR: TypeId = TypeId(2);
    pub const SCHAR: TypeId = TypeId(3);
    pub const UCHAR: TypeId = TypeId(4);
    pub const WCHAR: TypeId = TypeId(5);
    pub const CHAR8: TypeId = TypeId(6);
    pub const CHAR16: TypeId = TypeId(7);
    pub const CHAR32: TypeId = TypeId(8);
    pub const SHORT: TypeId = TypeId(9);
    pub const USHORT: TypeId = TypeId(10);
    pub const INT: TypeId = TypeId(11);
    pub const UINT: TypeId = TypeId(12);
    pub const LONG: TypeId = TypeId(13);
    pub const ULONG: TypeId = TypeId(14);
    pub const LONGLONG: TypeId = TypeId(15);
    pub const ULONGLONG: TypeId = TypeId(16);
    pub const INT128: TypeId = TypeId(17);
    pub const UINT128: TypeId = TypeId(18);
    pub const FLOAT: TypeId = TypeId(19);
    pub const DOUBLE: TypeId = TypeId(20);
    pub const LONGDOUBLE: TypeId = TypeId(21);
    pub const NULLPTR: TypeId = TypeId(22);

    /// Number of pre-interned builtin types.
    pub const PRELUDE_LEN: usize = 23;
}
