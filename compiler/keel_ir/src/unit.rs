//! The translation unit: arenas plus the query surface lowering relies on.

use crate::{
    BuiltinType, Decl, DeclId, DeclKind, Expr, ExprId, FunctionType, Language, Qualifiers,
    Stmt, StmtId, Target, TypeArena, TypeId, TypeKind,
};

/// A fully checked translation unit.
///
/// Declarations, expressions and statements are stored in flat arenas and
/// addressed by index. Top-level declarations are listed in source order in
/// [`TranslationUnit::top_level`].
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TranslationUnit {
    pub name: String,
    pub target: Target,
    decls: Vec<Decl>,
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    types: TypeArena,
    top_level: Vec<DeclId>,
}

fn next_id(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl TranslationUnit {
    pub fn new(name: impl Into<String>) -> Self {
        TranslationUnit {
            name: name.into(),
            ..Self::default()
        }
    }

    // Construction

    /// Add a declaration and register it with its parent scope.
    pub fn add_decl(
        &mut self,
        parent: Option<DeclId>,
        name: Option<&str>,
        kind: DeclKind,
    ) -> DeclId {
        let id = DeclId::new(next_id(self.decls.len()));
        let templated = parent.is_some_and(|p| self.decls[p.index()].templated);
        let mut decl = Decl::new(name.map(str::to_owned), kind, parent);
        decl.templated = templated;
        self.decls.push(decl);
        match parent {
            Some(p) => self.decls[p.index()].children.push(id),
            None => self.top_level.push(id),
        }
        id
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(next_id(self.exprs.len()));
        self.exprs.push(expr);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(next_id(self.stmts.len()));
        self.stmts.push(stmt);
        id
    }

    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.index()]
    }

    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        self.types.intern(kind)
    }

    pub fn pointer_to(&mut self, pointee: TypeId) -> TypeId {
        self.intern(TypeKind::Pointer(pointee))
    }

    pub fn lvalue_ref_to(&mut self, referent: TypeId) -> TypeId {
        self.intern(TypeKind::LValueRef(referent))
    }

    pub fn const_of(&mut self, base: TypeId) -> TypeId {
        self.intern(TypeKind::Qualified {
            base,
            quals: Qualifiers::CONST,
        })
    }

    pub fn record_type(&mut self, record: DeclId) -> TypeId {
        self.intern(TypeKind::Record(record))
    }

    pub fn enum_type(&mut self, decl: DeclId) -> TypeId {
        self.intern(TypeKind::Enum(decl))
    }

    pub fn function_type(&mut self, ret: TypeId, params: Vec<TypeId>) -> TypeId {
        self.intern(TypeKind::Function(FunctionType {
            ret,
            params,
            variadic: false,
            cc: crate::CallConv::C,
        }))
    }

    // Arena access

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn ty(&self, id: TypeId) -> &TypeKind {
        self.types.get(id)
    }

    pub fn top_level(&self) -> &[DeclId] {
        &self.top_level
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Members of `scope` in declaration order; `None` is the unit root.
    pub fn children(&self, scope: Option<DeclId>) -> &[DeclId] {
        match scope {
            Some(id) => &self.decl(id).children,
            None => &self.top_level,
        }
    }

    /// Members of `scope` with linkage specifications flattened in place,
    /// the same scope [`TranslationUnit::semantic_parent`] reports.
    pub fn semantic_children(&self, scope: Option<DeclId>) -> Vec<DeclId> {
        let mut out = Vec::new();
        self.flatten_linkage(self.children(scope), &mut out);
        out
    }

    fn flatten_linkage(&self, ids: &[DeclId], out: &mut Vec<DeclId>) {
        for &id in ids {
            let decl = self.decl(id);
            if let DeclKind::LinkageSpec(_) = decl.kind {
                self.flatten_linkage(&decl.children, out);
            } else {
                out.push(id);
            }
        }
    }

    // Scope queries

    /// Nearest enclosing scope that is not a linkage specification.
    pub fn semantic_parent(&self, id: DeclId) -> Option<DeclId> {
        let mut parent = self.decl(id).parent;
        while let Some(p) = parent {
            if !matches!(self.decl(p).kind, DeclKind::LinkageSpec(_)) {
                return Some(p);
            }
            parent = self.decl(p).parent;
        }
        None
    }

    /// Declared inside an `extern "C"` block.
    pub fn has_c_linkage(&self, id: DeclId) -> bool {
        let mut parent = self.decl(id).parent;
        while let Some(p) = parent {
            if let DeclKind::LinkageSpec(lang) = self.decl(p).kind {
                return lang == Language::C;
            }
            parent = self.decl(p).parent;
        }
        false
    }

    /// Whether the semantic parent of `id` is a function body.
    pub fn in_function_scope(&self, id: DeclId) -> bool {
        self.semantic_parent(id)
            .is_some_and(|p| self.decl(p).is_function_like())
    }

    /// Template parameters visible at `id`, outermost scope first.
    pub fn template_params_in_scope(&self, id: DeclId) -> Vec<DeclId> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(d) = cursor {
            chain.push(d);
            cursor = self.decl(d).parent;
        }
        chain
            .iter()
            .rev()
            .flat_map(|d| self.decl(*d).template_params.iter().copied())
            .collect()
    }

    // Type queries

    /// Strip typedef sugar from the outermost layer.
    pub fn desugar(&self, mut id: TypeId) -> TypeId {
        while let TypeKind::Typedef { underlying, .. } = self.ty(id) {
            id = *underlying;
        }
        id
    }

    /// Strip typedefs and top-level cv-qualifiers.
    pub fn unqualified(&self, mut id: TypeId) -> TypeId {
        loop {
            match self.ty(id) {
                TypeKind::Typedef { underlying, .. } => id = *underlying,
                TypeKind::Qualified { base, .. } => id = *base,
                _ => return id,
            }
        }
    }

    pub fn builtin_of(&self, id: TypeId) -> Option<BuiltinType> {
        match self.ty(self.unqualified(id)) {
            TypeKind::Builtin(b) => Some(*b),
            _ => None,
        }
    }

    pub fn record_of(&self, id: TypeId) -> Option<DeclId> {
        match self.ty(self.unqualified(id)) {
            TypeKind::Record(d) => Some(*d),
            _ => None,
        }
    }

    pub fn enum_of(&self, id: TypeId) -> Option<DeclId> {
        match self.ty(self.unqualified(id)) {
            TypeKind::Enum(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_reference(&self, id: TypeId) -> bool {
        matches!(
            self.ty(self.unqualified(id)),
            TypeKind::LValueRef(_) | TypeKind::RValueRef(_)
        )
    }

    /// Pointee of a pointer type.
    pub fn pointee(&self, id: TypeId) -> Option<TypeId> {
        match self.ty(self.unqualified(id)) {
            TypeKind::Pointer(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_signed_integer(&self, id: TypeId) -> bool {
        let id = self.unqualified(id);
        match self.ty(id) {
            TypeKind::Builtin(b) => b.is_signed(&self.target),
            TypeKind::Enum(e) => match &self.decl(*e).kind {
                DeclKind::Enum(en) => en.underlying.is_some_and(|u| self.is_signed_integer(u)),
                _ => false,
            },
            _ => false,
        }
    }

    /// Bit width of an integral or enumeration type; 0 for anything else.
    pub fn integer_width(&self, id: TypeId) -> u32 {
        let id = self.unqualified(id);
        match self.ty(id) {
            TypeKind::Builtin(b) => b.bit_width(&self.target),
            TypeKind::Enum(e) => match &self.decl(*e).kind {
                DeclKind::Enum(en) => en.underlying.map_or(0, |u| self.integer_width(u)),
                _ => 0,
            },
            _ => 0,
        }
    }

    /// Whether the type mentions a template parameter anywhere.
    pub fn is_dependent(&self, id: TypeId) -> bool {
        match self.ty(id) {
            TypeKind::TemplateParam { .. } | TypeKind::Dependent(_) => true,
            TypeKind::Builtin(_)
            | TypeKind::Enum(_)
            | TypeKind::Unsupported(_) => false,
            TypeKind::Record(d) => self.decl(*d).templated,
            TypeKind::Pointer(t)
            | TypeKind::LValueRef(t)
            | TypeKind::RValueRef(t)
            | TypeKind::IncompleteArray(t)
            | TypeKind::Qualified { base: t, .. }
            | TypeKind::Array { elem: t, .. }
            | TypeKind::Typedef { underlying: t, .. } => self.is_dependent(*t),
            TypeKind::MemberPointer { class, pointee } => {
                self.decl(*class).templated || self.is_dependent(*pointee)
            }
            TypeKind::Function(f) => {
                self.is_dependent(f.ret) || f.params.iter().any(|p| self.is_dependent(*p))
            }
        }
    }
}

mod validate;

pub use validate::{DanglingId, Referrer};
