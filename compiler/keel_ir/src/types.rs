//! Interned types of the input model.
//!
//! Types are hash-consed into a [`TypeArena`]; equal structure means equal
//! [`TypeId`]. The builtin types occupy the first [`TypeId::PRELUDE_LEN`]
//! slots so lowering code and tests can name them by constant.

use rustc_hash::FxHashMap;

use crate::{DeclId, TypeId};

/// Builtin scalar types. Declaration order matches the pre-interned
/// [`TypeId`] constants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuiltinType {
    Void,
    Bool,
    Char,
    SChar,
    UChar,
    WChar,
    Char8,
    Char16,
    Char32,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Int128,
    UInt128,
    Float,
    Double,
    LongDouble,
    NullPtr,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; TypeId::PRELUDE_LEN] = [
        BuiltinType::Void,
        BuiltinType::Bool,
        BuiltinType::Char,
        BuiltinType::SChar,
        BuiltinType::UChar,
        BuiltinType::WChar,
        BuiltinType::Char8,
        BuiltinType::Char16,
        BuiltinType::Char32,
        BuiltinType::Short,
        BuiltinType::UShort,
        BuiltinType::Int,
        BuiltinType::UInt,
        BuiltinType::Long,
        BuiltinType::ULong,
        BuiltinType::LongLong,
        BuiltinType::ULongLong,
        BuiltinType::Int128,
        BuiltinType::UInt128,
        BuiltinType::Float,
        BuiltinType::Double,
        BuiltinType::LongDouble,
        BuiltinType::NullPtr,
    ];

    /// Character types, whose enum constants are stored as naturals.
    pub fn is_char_like(self) -> bool {
        matches!(
            self,
            BuiltinType::Char
                | BuiltinType::SChar
                | BuiltinType::UChar
                | BuiltinType::WChar
                | BuiltinType::Char8
                | BuiltinType::Char16
                | BuiltinType::Char32
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(
            self,
            BuiltinType::Float | BuiltinType::Double | BuiltinType::LongDouble
        )
    }

    pub fn is_integral(self) -> bool {
        !self.is_floating() && !matches!(self, BuiltinType::Void | BuiltinType::NullPtr)
    }

    /// Signedness on `target`. Plain `char` and `wchar_t` are target-defined.
    pub fn is_signed(self, target: &Target) -> bool {
        match self {
            BuiltinType::Char => target.char_signed,
            BuiltinType::WChar => target.wchar_signed,
            BuiltinType::SChar
            | BuiltinType::Short
            | BuiltinType::Int
            | BuiltinType::Long
            | BuiltinType::LongLong
            | BuiltinType::Int128
            | BuiltinType::Float
            | BuiltinType::Double
            | BuiltinType::LongDouble => true,
            BuiltinType::Void
            | BuiltinType::Bool
            | BuiltinType::UChar
            | BuiltinType::Char8
            | BuiltinType::Char16
            | BuiltinType::Char32
            | BuiltinType::UShort
            | BuiltinType::UInt
            | BuiltinType::ULong
            | BuiltinType::ULongLong
            | BuiltinType::UInt128
            | BuiltinType::NullPtr => false,
        }
    }

    /// Width in bits on `target`. `void` has width 0.
    pub fn bit_width(self, target: &Target) -> u32 {
        match self {
            BuiltinType::Void => 0,
            BuiltinType::Bool
            | BuiltinType::Char
            | BuiltinType::SChar
            | BuiltinType::UChar
            | BuiltinType::Char8 => 8,
            BuiltinType::Short | BuiltinType::UShort | BuiltinType::Char16 => 16,
            BuiltinType::WChar => target.wchar_width,
            BuiltinType::Int | BuiltinType::UInt | BuiltinType::Char32 | BuiltinType::Float => 32,
            BuiltinType::Long | BuiltinType::ULong => target.long_width,
            BuiltinType::LongLong | BuiltinType::ULongLong | BuiltinType::Double => 64,
            BuiltinType::Int128 | BuiltinType::UInt128 | BuiltinType::LongDouble => 128,
            BuiltinType::NullPtr => target.pointer_width,
        }
    }
}

/// Properties of the compilation target that affect literal encoding and
/// integer widths.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    pub pointer_width: u32,
    pub long_width: u32,
    pub wchar_width: u32,
    pub wchar_signed: bool,
    pub char_signed: bool,
    pub big_endian: bool,
}

impl Default for Target {
    /// x86-64 System V.
    fn default() -> Self {
        Target {
            pointer_width: 64,
            long_width: 64,
            wchar_width: 32,
            wchar_signed: true,
            char_signed: true,
            big_endian: false,
        }
    }
}

/// Calling convention of a function type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallConv {
    #[default]
    C,
    MsAbi,
    RegCall,
}

/// `const` / `volatile` qualifiers.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
}

impl Qualifiers {
    pub const NONE: Qualifiers = Qualifiers {
        is_const: false,
        is_volatile: false,
    };
    pub const CONST: Qualifiers = Qualifiers {
        is_const: true,
        is_volatile: false,
    };

    pub fn is_empty(self) -> bool {
        !self.is_const && !self.is_volatile
    }
}

/// Signature of a function type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionType {
    pub ret: TypeId,
    pub params: Vec<TypeId>,
    pub variadic: bool,
    pub cc: CallConv,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
    Builtin(BuiltinType),
    Pointer(TypeId),
    LValueRef(TypeId),
    RValueRef(TypeId),
    Qualified {
        base: TypeId,
        quals: Qualifiers,
    },
    Array {
        elem: TypeId,
        len: u64,
    },
    IncompleteArray(TypeId),
    Function(FunctionType),
    Record(DeclId),
    Enum(DeclId),
    MemberPointer {
        class: DeclId,
        pointee: TypeId,
    },
    /// Typedef sugar; lowering always looks through it.
    Typedef {
        decl: DeclId,
        underlying: TypeId,
    },
    /// A template type parameter, only present inside templated code.
    TemplateParam {
        name: String,
        depth: u32,
        index: u32,
    },
    /// Any other dependent type, kept as its source spelling.
    Dependent(String),
    /// A type the front end could not classify (vector types, `_Atomic`, ...).
    Unsupported(String),
}

/// Hash-consing store for [`TypeKind`]s.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<TypeKind>", into = "Vec<TypeKind>")
)]
pub struct TypeArena {
    kinds: Vec<TypeKind>,
    lookup: FxHashMap<TypeKind, TypeId>,
}

impl TypeArena {
    /// Create an arena holding only the builtin prelude.
    pub fn new() -> Self {
        let mut arena = TypeArena {
            kinds: Vec::with_capacity(64),
            lookup: FxHashMap::default(),
        };
        for builtin in BuiltinType::ALL {
            arena.intern(TypeKind::Builtin(builtin));
        }
        arena
    }

    /// Intern `kind`, returning the existing id for structurally equal types.
    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.lookup.get(&kind) {
            return id;
        }
        let id = TypeId::new(u32::try_from(self.kinds.len()).unwrap_or(u32::MAX));
        self.lookup.insert(kind.clone(), id);
        self.kinds.push(kind);
        id
    }

    /// Look up a type. Out-of-range ids resolve to `void`.
    pub fn get(&self, id: TypeId) -> &TypeKind {
        self.kinds
            .get(id.index())
            .unwrap_or(&self.kinds[TypeId::VOID.index()])
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Every interned type with its id, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeKind)> {
        self.kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| (TypeId::new(u32::try_from(i).unwrap_or(u32::MAX)), kind))
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<TypeKind>> for TypeArena {
    fn from(kinds: Vec<TypeKind>) -> Self {
        if kinds.len() < TypeId::PRELUDE_LEN {
            return TypeArena::new();
        }
        let mut arena = TypeArena {
            kinds: Vec::with_capacity(kinds.len()),
            lookup: FxHashMap::default(),
        };
        // Duplicates in serialized input keep their own slot so every
        // serialized `TypeId` stays valid.
        for kind in kinds {
            let id = TypeId::new(u32::try_from(arena.kinds.len()).unwrap_or(u32::MAX));
            arena.lookup.entry(kind.clone()).or_insert(id);
            arena.kinds.push(kind);
        }
        arena
    }
}

impl From<TypeArena> for Vec<TypeKind> {
    fn from(arena: TypeArena) -> Self {
        arena.kinds
    }
}
