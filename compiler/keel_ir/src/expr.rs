//! Expression nodes of the input model.
//!
//! Expressions are fully type-checked: every node carries its static type
//! and value category. Implicit conversions appear as explicit
//! [`ExprKind::Cast`] nodes with [`CastStyle::Implicit`].

use crate::{DeclId, ExprId, OverloadedOperator, Span, TypeId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeId,
    pub category: ValueCategory,
    /// Type or value depends on a template parameter.
    pub dependent: bool,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: TypeId, category: ValueCategory) -> Self {
        Expr {
            kind,
            ty,
            category,
            dependent: false,
            span: Span::DUMMY,
        }
    }

    pub fn prvalue(kind: ExprKind, ty: TypeId) -> Self {
        Self::new(kind, ty, ValueCategory::Prvalue)
    }

    pub fn lvalue(kind: ExprKind, ty: TypeId) -> Self {
        Self::new(kind, ty, ValueCategory::Lvalue)
    }

    #[must_use]
    pub fn dependent(mut self) -> Self {
        self.dependent = true;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueCategory {
    Prvalue,
    Lvalue,
    Xvalue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    /// Integer literal as raw two's-complement bits; signedness and width
    /// come from the expression type.
    IntegerLit(u128),
    CharLit(u32),
    /// String literal bytes in target byte order, without the trailing NUL.
    StringLit {
        bytes: Vec<u8>,
        char_width: u8,
    },
    /// Floating literal, kept as its decimal spelling.
    FloatLit(String),
    BoolLit(bool),
    NullPtrLit,
    /// `__func__` and friends, already expanded.
    Predefined {
        value: String,
    },
    DeclRef {
        decl: DeclId,
    },
    /// Name lookup deferred until instantiation.
    UnresolvedLookup {
        name: String,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// `lhs op= rhs`; `op` is the underlying arithmetic operator.
    CompoundAssign {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Cast {
        kind: CastKind,
        style: CastStyle,
        operand: ExprId,
        /// Constructor or conversion function for user-defined conversions.
        conversion: Option<DeclId>,
        /// Base path for derived/base conversions, outermost first.
        path: Vec<TypeId>,
    },
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
    },
    /// `callee` is a [`ExprKind::Member`] or a pointer-to-member
    /// [`ExprKind::Binary`] (possibly parenthesized).
    MemberCall {
        callee: ExprId,
        args: Vec<ExprId>,
    },
    /// Overloaded operator call. For member operators the first argument
    /// is the object.
    OperatorCall {
        op: OverloadedOperator,
        callee: DeclId,
        args: Vec<ExprId>,
    },
    Construct {
        ctor: DeclId,
        args: Vec<ExprId>,
    },
    /// Forwarding call of an inherited constructor.
    InheritedCtorInit {
        ctor: DeclId,
    },
    Member {
        base: ExprId,
        member: DeclId,
        arrow: bool,
        /// Written with a nested-name qualifier (`obj.Base::f`).
        qualified: bool,
    },
    Subscript {
        base: ExprId,
        index: ExprId,
    },
    Conditional {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    /// GNU `a ?: b`. `opaque` is the [`ExprKind::OpaqueValue`] that
    /// `cond` and `then_expr` refer to.
    BinaryConditional {
        common: ExprId,
        opaque: ExprId,
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    Paren(ExprId),
    ConstantExpr(ExprId),
    SubstNonTypeParam(ExprId),
    BindTemporary(ExprId),
    InitList {
        inits: Vec<ExprId>,
        filler: Option<ExprId>,
        /// Semantically a no-op wrapper around its single element.
        transparent: bool,
    },
    /// Parenthesized initializer list in a dependent context.
    ParenList {
        exprs: Vec<ExprId>,
    },
    This,
    TypeTrait {
        kind: TraitKind,
        arg: TraitArg,
    },
    OffsetOf {
        components: Vec<OffsetOfComponent>,
    },
    New {
        operator_new: Option<DeclId>,
        placement: Vec<ExprId>,
        allocated: TypeId,
        array_size: Option<ExprId>,
        init: Option<ExprId>,
    },
    Delete {
        array: bool,
        operator_delete: Option<DeclId>,
        destroying: bool,
        arg: ExprId,
        destroyed: TypeId,
    },
    ExprWithCleanups(ExprId),
    MaterializeTemporary {
        sub: ExprId,
        /// Declaration whose lifetime the temporary is extended to.
        extending_decl: Option<DeclId>,
    },
    /// Reference to a value bound by an enclosing node.
    OpaqueValue {
        source: Option<ExprId>,
    },
    Atomic {
        op: AtomicOp,
        args: Vec<ExprId>,
    },
    DefaultInit(ExprId),
    DefaultArg(ExprId),
    VaArg(ExprId),
    Lambda,
    ImplicitValueInit,
    ScalarValueInit,
    PseudoDestructor {
        base: ExprId,
        destroyed: TypeId,
    },
    Noexcept(bool),
    BoolTrait(bool),
    /// `common` is an [`ExprKind::OpaqueValue`] whose source is the array
    /// being copied.
    ArrayInitLoop {
        common: ExprId,
        size: u64,
        body: ExprId,
    },
    ArrayInitIndex,
    Recovery,
    /// A node kind the front end passes through without classifying.
    Unsupported(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    PostInc,
    PostDec,
    PreInc,
    PreDec,
    AddrOf,
    Deref,
    Plus,
    Minus,
    /// `~`
    Not,
    /// `!`
    LNot,
    Real,
    Imag,
    Extension,
    Coawait,
}

impl UnaryOp {
    pub fn spelling(self) -> &'static str {
        match self {
            UnaryOp::PostInc | UnaryOp::PreInc => "++",
            UnaryOp::PostDec | UnaryOp::PreDec => "--",
            UnaryOp::AddrOf => "&",
            UnaryOp::Deref => "*",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "~",
            UnaryOp::LNot => "!",
            UnaryOp::Real => "__real",
            UnaryOp::Imag => "__imag",
            UnaryOp::Extension => "__extension__",
            UnaryOp::Coawait => "co_await",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    /// `.*`
    PtrMemD,
    /// `->*`
    PtrMemI,
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    /// `<=>`
    Cmp,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Xor,
    Or,
    LAnd,
    LOr,
    Assign,
    Comma,
}

impl BinaryOp {
    pub fn spelling(self) -> &'static str {
        match self {
            BinaryOp::PtrMemD => ".*",
            BinaryOp::PtrMemI => "->*",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Cmp => "<=>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&",
            BinaryOp::Xor => "^",
            BinaryOp::Or => "|",
            BinaryOp::LAnd => "&&",
            BinaryOp::LOr => "||",
            BinaryOp::Assign => "=",
            BinaryOp::Comma => ",",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastKind {
    LValueToRValue,
    Dependent,
    FunctionToPointerDecay,
    NoOp,
    BitCast,
    IntegralCast,
    IntegralToBoolean,
    PointerToBoolean,
    PointerToIntegral,
    IntegralToPointer,
    ArrayToPointerDecay,
    ConstructorConversion,
    UserDefinedConversion,
    BuiltinFnToFnPtr,
    NullToPointer,
    ToVoid,
    FloatingToIntegral,
    DerivedToBase,
    UncheckedDerivedToBase,
    BaseToDerived,
    IntegralToFloating,
    FloatingCast,
    FloatingToBoolean,
    Dynamic,
    BaseToDerivedMemberPointer,
    DerivedToBaseMemberPointer,
    NullToMemberPointer,
    ReinterpretMemberPointer,
    LValueBitCast,
    AtomicToNonAtomic,
    NonAtomicToAtomic,
    VectorSplat,
}

impl CastKind {
    pub fn name(self) -> &'static str {
        match self {
            CastKind::LValueToRValue => "LValueToRValue",
            CastKind::Dependent => "Dependent",
            CastKind::FunctionToPointerDecay => "FunctionToPointerDecay",
            CastKind::NoOp => "NoOp",
            CastKind::BitCast => "BitCast",
            CastKind::IntegralCast => "IntegralCast",
            CastKind::IntegralToBoolean => "IntegralToBoolean",
            CastKind::PointerToBoolean => "PointerToBoolean",
            CastKind::PointerToIntegral => "PointerToIntegral",
            CastKind::IntegralToPointer => "IntegralToPointer",
            CastKind::ArrayToPointerDecay => "ArrayToPointerDecay",
            CastKind::ConstructorConversion => "ConstructorConversion",
            CastKind::UserDefinedConversion => "UserDefinedConversion",
            CastKind::BuiltinFnToFnPtr => "BuiltinFnToFnPtr",
            CastKind::NullToPointer => "NullToPointer",
            CastKind::ToVoid => "ToVoid",
            CastKind::FloatingToIntegral => "FloatingToIntegral",
            CastKind::DerivedToBase => "DerivedToBase",
            CastKind::UncheckedDerivedToBase => "UncheckedDerivedToBase",
            CastKind::BaseToDerived => "BaseToDerived",
            CastKind::IntegralToFloating => "IntegralToFloating",
            CastKind::FloatingCast => "FloatingCast",
            CastKind::FloatingToBoolean => "FloatingToBoolean",
            CastKind::Dynamic => "Dynamic",
            CastKind::BaseToDerivedMemberPointer => "BaseToDerivedMemberPointer",
            CastKind::DerivedToBaseMemberPointer => "DerivedToBaseMemberPointer",
            CastKind::NullToMemberPointer => "NullToMemberPointer",
            CastKind::ReinterpretMemberPointer => "ReinterpretMemberPointer",
            CastKind::LValueBitCast => "LValueBitCast",
            CastKind::AtomicToNonAtomic => "AtomicToNonAtomic",
            CastKind::NonAtomicToAtomic => "NonAtomicToAtomic",
            CastKind::VectorSplat => "VectorSplat",
        }
    }
}

/// How a cast was written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastStyle {
    Implicit,
    CStyle,
    Functional,
    Static,
    Reinterpret,
    Const,
    Dynamic,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraitKind {
    SizeOf,
    AlignOf,
    PreferredAlignOf,
    VecStep,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraitArg {
    Type(TypeId),
    Expr(ExprId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OffsetOfComponent {
    Field(DeclId),
    Array(ExprId),
    Base(TypeId),
    Identifier(String),
}

/// GNU and C11 atomic builtins.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AtomicOp {
    Load,
    LoadN,
    Store,
    StoreN,
    Exchange,
    ExchangeN,
    CompareExchange,
    CompareExchangeN,
    FetchAdd,
    FetchSub,
    FetchAnd,
    FetchOr,
    FetchXor,
    FetchNand,
    AddFetch,
    SubFetch,
    AndFetch,
    OrFetch,
    XorFetch,
    NandFetch,
}
