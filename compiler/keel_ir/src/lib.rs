//! Input model for the Keel lowering engine.
//!
//! A [`TranslationUnit`] is what a C++ front end hands over after parsing,
//! name resolution and type checking: flat arenas of [`Decl`], [`Expr`] and
//! [`Stmt`] nodes, interned types, record layouts and target properties.
//! Nothing here is computed lazily; lowering only reads.
//!
//! With the `serde` feature every type derives `Serialize`/`Deserialize`,
//! which is how the `keelc` driver receives units.

mod decl;
mod expr;
mod ids;
mod span;
mod stmt;
mod types;
mod unit;

pub use decl::{
    BaseSpec, CtorDecl, CtorInit, Decl, DeclKind, DtorDecl, EnumConstantDecl, EnumDecl,
    FieldDecl, FunctionDecl, InitTarget, Language, MethodDecl, NamespaceDecl,
    OverloadedOperator, ParamDecl, RecordDecl, RecordDefinition, RecordLayout, Specialization,
    StorageClass, TagKind, TemplateArg, TemplateParamDecl, TemplateParamKind, VarDecl,
};
pub use expr::{
    AtomicOp, BinaryOp, CastKind, CastStyle, Expr, ExprKind, OffsetOfComponent, TraitArg,
    TraitKind, UnaryOp, ValueCategory,
};
pub use ids::{DeclId, ExprId, StmtId, TypeId};
pub use span::Span;
pub use stmt::{Stmt, StmtKind};
pub use types::{BuiltinType, CallConv, FunctionType, Qualifiers, Target, TypeArena, TypeKind};
pub use unit::{DanglingId, Referrer, TranslationUnit};
