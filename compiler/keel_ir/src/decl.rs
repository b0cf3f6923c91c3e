//! Declarations of the input model.
//!
//! Every declaration lives in the unit's declaration arena. Scopes
//! (namespaces, records, enums, functions, linkage specifications) list
//! their members in `Decl::children`, in source order; that order is what
//! anonymous-entity ordinals are computed from.

use crate::{CallConv, DeclId, ExprId, Qualifiers, Span, StmtId, TypeId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decl {
    /// Source name; `None` for anonymous entities and unnamed parameters.
    pub name: Option<String>,
    pub kind: DeclKind,
    /// Semantic parent scope; `None` at translation-unit scope.
    pub parent: Option<DeclId>,
    /// Members in declaration order (scopes only).
    pub children: Vec<DeclId>,
    /// True when the declaration is, or lives inside, an uninstantiated
    /// template pattern.
    pub templated: bool,
    /// Template parameters introduced by this declaration itself.
    pub template_params: Vec<DeclId>,
    pub span: Span,
}

impl Decl {
    pub fn new(name: Option<String>, kind: DeclKind, parent: Option<DeclId>) -> Self {
        Decl {
            name,
            kind,
            parent,
            children: Vec::new(),
            templated: false,
            template_params: Vec::new(),
            span: Span::DUMMY,
        }
    }

    /// Source name, or the empty string for anonymous entities.
    pub fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.as_deref().map_or(true, str::is_empty)
    }

    /// Functions, methods, constructors and destructors: scopes whose
    /// automatic variables are locals.
    pub fn is_function_like(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Function(_)
                | DeclKind::Method(_)
                | DeclKind::Constructor(_)
                | DeclKind::Destructor(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeclKind {
    Function(FunctionDecl),
    Method(MethodDecl),
    Constructor(CtorDecl),
    Destructor(DtorDecl),
    /// struct, class or union. A record without a definition is an opaque
    /// (forward-declared) type.
    Record(RecordDecl),
    Enum(EnumDecl),
    EnumConstant(EnumConstantDecl),
    Variable(VarDecl),
    Param(ParamDecl),
    Field(FieldDecl),
    Namespace(NamespaceDecl),
    LinkageSpec(Language),
    StaticAssert {
        cond: ExprId,
        message: Option<String>,
    },
    Typedef {
        underlying: TypeId,
    },
    TypeAliasTemplate,
    TemplateParam(TemplateParamDecl),
    /// `template<...> f`; `pattern` is the templated function.
    FunctionTemplate {
        pattern: DeclId,
    },
    /// `template<...> struct S`; `pattern` is the templated record.
    ClassTemplate {
        pattern: DeclId,
    },
    Using,
    UsingDirective,
    UsingShadow,
    Friend,
    Empty,
    /// Member of an anonymous struct/union injected into the enclosing record.
    IndirectField {
        chain: Vec<DeclId>,
    },
}

impl DeclKind {
    /// Short kind name for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::Function(_) => "function",
            DeclKind::Method(_) => "method",
            DeclKind::Constructor(_) => "constructor",
            DeclKind::Destructor(_) => "destructor",
            DeclKind::Record(r) => match r.tag {
                TagKind::Struct => "struct",
                TagKind::Class => "class",
                TagKind::Union => "union",
            },
            DeclKind::Enum(_) => "enum",
            DeclKind::EnumConstant(_) => "enum constant",
            DeclKind::Variable(_) => "variable",
            DeclKind::Param(_) => "parameter",
            DeclKind::Field(_) => "field",
            DeclKind::Namespace(_) => "namespace",
            DeclKind::LinkageSpec(_) => "linkage specification",
            DeclKind::StaticAssert { .. } => "static assertion",
            DeclKind::Typedef { .. } => "typedef",
            DeclKind::TypeAliasTemplate => "alias template",
            DeclKind::TemplateParam(_) => "template parameter",
            DeclKind::FunctionTemplate { .. } => "function template",
            DeclKind::ClassTemplate { .. } => "class template",
            DeclKind::Using => "using declaration",
            DeclKind::UsingDirective => "using directive",
            DeclKind::UsingShadow => "using shadow",
            DeclKind::Friend => "friend declaration",
            DeclKind::Empty => "empty declaration",
            DeclKind::IndirectField { .. } => "indirect field",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionDecl {
    pub ret: TypeId,
    pub params: Vec<DeclId>,
    pub cc: CallConv,
    pub variadic: bool,
    pub body: Option<StmtId>,
    /// Compiler builtin name (`__builtin_expect`, `memset`, ...).
    pub builtin: Option<String>,
    pub defaulted: bool,
    pub operator: Option<OverloadedOperator>,
    /// Set for instantiations of a function template.
    pub specialization: Option<Specialization>,
}

impl FunctionDecl {
    pub fn new(ret: TypeId, params: Vec<DeclId>) -> Self {
        FunctionDecl {
            ret,
            params,
            cc: CallConv::C,
            variadic: false,
            body: None,
            builtin: None,
            defaulted: false,
            operator: None,
            specialization: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodDecl {
    pub func: FunctionDecl,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_pure: bool,
    /// cv-qualifiers of the implicit object parameter.
    pub quals: Qualifiers,
    /// Methods this one overrides, in base order.
    pub overrides: Vec<DeclId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CtorDecl {
    pub params: Vec<DeclId>,
    pub cc: CallConv,
    pub variadic: bool,
    /// Member initializers as the front end resolved them, in written order.
    pub inits: Vec<CtorInit>,
    pub body: Option<StmtId>,
    pub defaulted: bool,
    /// Constructor of the class template pattern this one was instantiated
    /// from.
    pub instantiated_from: Option<DeclId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CtorInit {
    pub target: InitTarget,
    pub init: ExprId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitTarget {
    Field(DeclId),
    Base(TypeId),
    /// Path through anonymous struct/union members; the last field is the
    /// one initialized.
    Indirect(Vec<DeclId>),
    /// Delegation to another constructor of the same class.
    Delegating(TypeId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DtorDecl {
    pub cc: CallConv,
    pub body: Option<StmtId>,
    pub defaulted: bool,
    pub is_virtual: bool,
    pub is_pure: bool,
    pub instantiated_from: Option<DeclId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagKind {
    Struct,
    Class,
    Union,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordDecl {
    pub tag: TagKind,
    /// Name given by `typedef struct { ... } Name;`.
    pub typedef_name: Option<String>,
    pub definition: Option<RecordDefinition>,
    /// Set for class template specializations.
    pub specialization: Option<Specialization>,
}

impl RecordDecl {
    pub fn is_union(&self) -> bool {
        self.tag == TagKind::Union
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordDefinition {
    pub bases: Vec<BaseSpec>,
    /// `None` for dependent records, which have no layout.
    pub layout: Option<RecordLayout>,
    pub is_pod: bool,
    pub is_standard_layout: bool,
    pub trivial_dtor: bool,
    pub destructor: Option<DeclId>,
    /// Class-specific `operator delete`, if any.
    pub operator_delete: Option<DeclId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseSpec {
    pub ty: TypeId,
    pub is_virtual: bool,
}

/// Byte layout computed by the front end.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordLayout {
    pub size: u64,
    pub align: u64,
    /// Offsets of non-virtual bases, keyed by base record.
    pub base_offsets: Vec<(DeclId, u64)>,
    pub field_offsets: Vec<(DeclId, u64)>,
}

impl RecordLayout {
    pub fn field_offset(&self, field: DeclId) -> Option<u64> {
        self.field_offsets
            .iter()
            .find(|(id, _)| *id == field)
            .map(|&(_, off)| off)
    }

    pub fn base_offset(&self, base: DeclId) -> Option<u64> {
        self.base_offsets
            .iter()
            .find(|(id, _)| *id == base)
            .map(|&(_, off)| off)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumDecl {
    /// Fixed or deduced underlying type; `None` for an opaque declaration.
    pub underlying: Option<TypeId>,
    pub scoped: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumConstantDecl {
    /// The enumeration type.
    pub ty: TypeId,
    pub value: i128,
    pub init: Option<ExprId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageClass {
    #[default]
    Auto,
    Static,
    Extern,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarDecl {
    pub ty: TypeId,
    pub init: Option<ExprId>,
    pub storage: StorageClass,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamDecl {
    pub ty: TypeId,
    pub index: u32,
    pub default: Option<ExprId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDecl {
    pub ty: TypeId,
    pub mutable: bool,
    pub bit_width: Option<u32>,
    /// Default member initializer.
    pub init: Option<ExprId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamespaceDecl {
    pub inline: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Language {
    C,
    Cxx,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateParamDecl {
    pub kind: TemplateParamKind,
    pub depth: u32,
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemplateParamKind {
    Type,
    Value(TypeId),
    Template,
}

/// Where an instantiated declaration came from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Specialization {
    /// The templated pattern declaration.
    pub pattern: DeclId,
    pub args: Vec<TemplateArg>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemplateArg {
    Type(TypeId),
    Integral { value: i128, ty: TypeId },
    NullPtr(TypeId),
    Expr(ExprId),
    Decl(DeclId),
    Template(DeclId),
    Pack(Vec<TemplateArg>),
}

impl TemplateArg {
    pub fn describe(&self) -> &'static str {
        match self {
            TemplateArg::Type(_) => "type",
            TemplateArg::Integral { .. } => "integral",
            TemplateArg::NullPtr(_) => "nullptr",
            TemplateArg::Expr(_) => "expression",
            TemplateArg::Decl(_) => "declaration",
            TemplateArg::Template(_) => "template",
            TemplateArg::Pack(_) => "pack",
        }
    }
}

/// Overloadable operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverloadedOperator {
    New,
    Delete,
    ArrayNew,
    ArrayDelete,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Amp,
    Pipe,
    Tilde,
    Exclaim,
    Equal,
    Less,
    Greater,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    CaretEqual,
    AmpEqual,
    PipeEqual,
    LessLess,
    GreaterGreater,
    LessLessEqual,
    GreaterGreaterEqual,
    EqualEqual,
    ExclaimEqual,
    LessEqual,
    GreaterEqual,
    Spaceship,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    Comma,
    ArrowStar,
    Arrow,
    Call,
    Subscript,
    Coawait,
}
