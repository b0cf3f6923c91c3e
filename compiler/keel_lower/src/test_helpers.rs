//! Shared test utilities: a small builder over [`TranslationUnit`] and
//! helpers that lower and render in one step. Only compiled in test builds.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use keel_diagnostic::{Diagnostic, ErrorCode};
use keel_ir::{
    BaseSpec, DeclId, DeclKind, Expr, ExprId, ExprKind, FieldDecl, FunctionDecl, NamespaceDecl,
    ParamDecl, RecordDecl, RecordDefinition, RecordLayout, Stmt, StmtId, StmtKind, StorageClass,
    TagKind, TranslationUnit, TypeId, VarDecl,
};
use keel_term::{render, Term};

use crate::{ItaniumMangler, LowerConfig, LowerError, NamingStrategy};

/// A unit under construction plus the configuration it is lowered with.
pub(crate) struct Fixture {
    pub(crate) unit: TranslationUnit,
    pub(crate) config: LowerConfig,
}

impl Fixture {
    /// `Concrete` mode with opaque type names.
    pub(crate) fn new() -> Self {
        Fixture {
            unit: TranslationUnit::new("test.cpp"),
            config: LowerConfig::default().with_naming(NamingStrategy::Opaque),
        }
    }

    pub(crate) fn generic() -> Self {
        let mut fx = Self::new();
        fx.config = LowerConfig::generic().with_naming(NamingStrategy::Opaque);
        fx
    }

    pub(crate) fn structured() -> Self {
        let mut fx = Self::new();
        fx.config = fx.config.clone().with_naming(NamingStrategy::Structured);
        fx
    }

    // Declarations

    pub(crate) fn decl(&mut self, parent: Option<DeclId>, name: &str, kind: DeclKind) -> DeclId {
        let name = (!name.is_empty()).then_some(name);
        self.unit.add_decl(parent, name, kind)
    }

    pub(crate) fn namespace(&mut self, parent: Option<DeclId>, name: &str) -> DeclId {
        self.decl(parent, name, DeclKind::Namespace(NamespaceDecl::default()))
    }

    /// A struct with an empty definition and no layout.
    pub(crate) fn record(&mut self, parent: Option<DeclId>, name: &str) -> DeclId {
        self.record_with(parent, name, TagKind::Struct, Some(definition()))
    }

    pub(crate) fn record_with(
        &mut self,
        parent: Option<DeclId>,
        name: &str,
        tag: TagKind,
        definition: Option<RecordDefinition>,
    ) -> DeclId {
        self.decl(
            parent,
            name,
            DeclKind::Record(RecordDecl {
                tag,
                typedef_name: None,
                definition,
                specialization: None,
            }),
        )
    }

    pub(crate) fn field(&mut self, record: DeclId, name: &str, ty: TypeId) -> DeclId {
        self.decl(
            Some(record),
            name,
            DeclKind::Field(FieldDecl {
                ty,
                mutable: false,
                bit_width: None,
                init: None,
            }),
        )
    }

    /// A function without parameters; add them with [`Fixture::param`].
    pub(crate) fn function(&mut self, parent: Option<DeclId>, name: &str, ret: TypeId) -> DeclId {
        self.decl(parent, name, DeclKind::Function(FunctionDecl::new(ret, Vec::new())))
    }

    /// Append a parameter to a function, method or constructor.
    pub(crate) fn param(&mut self, owner: DeclId, name: &str, ty: TypeId) -> DeclId {
        let index = u32::try_from(self.params_of(owner).len()).unwrap();
        let id = self.decl(
            Some(owner),
            name,
            DeclKind::Param(ParamDecl {
                ty,
                index,
                default: None,
            }),
        );
        self.params_of(owner).push(id);
        id
    }

    pub(crate) fn set_body(&mut self, owner: DeclId, body: StmtId) {
        match &mut self.unit.decl_mut(owner).kind {
            DeclKind::Function(f) => f.body = Some(body),
            DeclKind::Method(m) => m.func.body = Some(body),
            DeclKind::Constructor(c) => c.body = Some(body),
            DeclKind::Destructor(d) => d.body = Some(body),
            other => panic!("{} has no body", other.describe()),
        }
    }

    fn params_of(&mut self, owner: DeclId) -> &mut Vec<DeclId> {
        match &mut self.unit.decl_mut(owner).kind {
            DeclKind::Function(f) => &mut f.params,
            DeclKind::Method(m) => &mut m.func.params,
            DeclKind::Constructor(c) => &mut c.params,
            other => panic!("{} has no parameters", other.describe()),
        }
    }

    pub(crate) fn var(&mut self, parent: Option<DeclId>, name: &str, ty: TypeId) -> DeclId {
        self.decl(
            parent,
            name,
            DeclKind::Variable(VarDecl {
                ty,
                init: None,
                storage: StorageClass::Auto,
            }),
        )
    }

    pub(crate) fn definition_mut(&mut self, record: DeclId) -> &mut RecordDefinition {
        match &mut self.unit.decl_mut(record).kind {
            DeclKind::Record(RecordDecl {
                definition: Some(def),
                ..
            }) => def,
            other => panic!("{} has no definition", other.describe()),
        }
    }

    // Expressions and statements

    pub(crate) fn expr(&mut self, expr: Expr) -> ExprId {
        self.unit.alloc_expr(expr)
    }

    pub(crate) fn int(&mut self, value: u128) -> ExprId {
        self.expr(Expr::prvalue(ExprKind::IntegerLit(value), TypeId::INT))
    }

    /// An lvalue naming `decl`, at the declared type.
    pub(crate) fn decl_ref(&mut self, decl: DeclId, ty: TypeId) -> ExprId {
        self.expr(Expr::lvalue(ExprKind::DeclRef { decl }, ty))
    }

    pub(crate) fn stmt(&mut self, kind: StmtKind) -> StmtId {
        self.unit.alloc_stmt(Stmt::new(kind))
    }

    // Lowering

    pub(crate) fn try_lower_decl(&self, id: DeclId) -> Result<Vec<Term>, LowerError> {
        let mut diags = Vec::new();
        crate::lower_decl(&self.unit, id, &self.config, &ItaniumMangler, &mut diags)
    }

    /// Rendered terms of one declaration, plus the diagnostics reported.
    pub(crate) fn lower_decl(&self, id: DeclId) -> (Vec<String>, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let terms = crate::lower_decl(&self.unit, id, &self.config, &ItaniumMangler, &mut diags)
            .expect("declaration lowers");
        (terms.iter().map(render).collect(), diags)
    }

    pub(crate) fn try_lower_expr(&self, id: ExprId) -> Result<Term, LowerError> {
        let mut diags = Vec::new();
        crate::lower_expression(&self.unit, id, &self.config, &ItaniumMangler, &mut diags)
    }

    pub(crate) fn lower_expr(&self, id: ExprId) -> (String, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let term =
            crate::lower_expression(&self.unit, id, &self.config, &ItaniumMangler, &mut diags)
                .expect("expression lowers");
        (render(&term), diags)
    }

    pub(crate) fn lower_unit(&self) -> (Vec<String>, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let terms = crate::lower_unit(&self.unit, &self.config, &ItaniumMangler, &mut diags)
            .expect("unit lowers");
        (terms.iter().map(render).collect(), diags)
    }
}

/// An empty, POD, standard-layout definition without a layout.
pub(crate) fn definition() -> RecordDefinition {
    RecordDefinition {
        bases: Vec::new(),
        layout: None,
        is_pod: true,
        is_standard_layout: true,
        trivial_dtor: true,
        destructor: None,
        operator_delete: None,
    }
}

pub(crate) fn layout(size: u64, align: u64) -> RecordLayout {
    RecordLayout {
        size,
        align,
        ..RecordLayout::default()
    }
}

pub(crate) fn base(ty: TypeId) -> BaseSpec {
    BaseSpec {
        ty,
        is_virtual: false,
    }
}

/// Diagnostic codes in report order.
pub(crate) fn codes(diags: &[Diagnostic]) -> Vec<ErrorCode> {
    diags.iter().map(|d| d.code).collect()
}

/// `(Tnum W32 Signed)`
pub(crate) const INT: &str = "(Tnum W32 Signed)";
