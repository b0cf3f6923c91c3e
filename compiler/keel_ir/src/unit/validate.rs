//! Reference checking for units that arrive from outside the process.
//!
//! Lowering indexes the arenas directly, so a unit built by a front end in
//! another process is checked once before anything reads it.

use crate::{
    DeclId, DeclKind, ExprId, ExprKind, FunctionDecl, InitTarget, OffsetOfComponent, StmtId,
    StmtKind, TemplateArg, TemplateParamKind, TraitArg, TranslationUnit, TypeId, TypeKind,
};

/// The node holding a dangling reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Referrer {
    Unit,
    Decl(DeclId),
    Expr(ExprId),
    Stmt(StmtId),
    Type(TypeId),
}

/// A reference to an arena slot that does not exist.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{referrer:?} refers to {arena} #{index}, which does not exist")]
pub struct DanglingId {
    pub referrer: Referrer,
    pub arena: &'static str,
    pub index: u32,
}

struct Checker {
    decls: usize,
    exprs: usize,
    stmts: usize,
    types: usize,
    from: Referrer,
}

impl Checker {
    fn check(&self, arena: &'static str, index: usize, len: usize) -> Result<(), DanglingId> {
        if index < len {
            return Ok(());
        }
        Err(DanglingId {
            referrer: self.from,
            arena,
            index: u32::try_from(index).unwrap_or(u32::MAX),
        })
    }

    fn decl(&self, id: DeclId) -> Result<(), DanglingId> {
        self.check("declaration", id.index(), self.decls)
    }

    fn expr(&self, id: ExprId) -> Result<(), DanglingId> {
        self.check("expression", id.index(), self.exprs)
    }

    fn stmt(&self, id: StmtId) -> Result<(), DanglingId> {
        self.check("statement", id.index(), self.stmts)
    }

    fn ty(&self, id: TypeId) -> Result<(), DanglingId> {
        self.check("type", id.index(), self.types)
    }

    fn decls(&self, ids: &[DeclId]) -> Result<(), DanglingId> {
        ids.iter().try_for_each(|&id| self.decl(id))
    }

    fn exprs(&self, ids: &[ExprId]) -> Result<(), DanglingId> {
        ids.iter().try_for_each(|&id| self.expr(id))
    }

    fn template_args(&self, args: &[TemplateArg]) -> Result<(), DanglingId> {
        for arg in args {
            match arg {
                TemplateArg::Type(t)
                | TemplateArg::NullPtr(t)
                | TemplateArg::Integral { ty: t, .. } => self.ty(*t)?,
                TemplateArg::Expr(e) => self.expr(*e)?,
                TemplateArg::Decl(d) | TemplateArg::Template(d) => self.decl(*d)?,
                TemplateArg::Pack(inner) => self.template_args(inner)?,
            }
        }
        Ok(())
    }

    fn function(&self, f: &FunctionDecl) -> Result<(), DanglingId> {
        self.ty(f.ret)?;
        self.decls(&f.params)?;
        f.body.map_or(Ok(()), |b| self.stmt(b))?;
        if let Some(spec) = &f.specialization {
            self.decl(spec.pattern)?;
            self.template_args(&spec.args)?;
        }
        Ok(())
    }

    fn decl_kind(&self, kind: &DeclKind) -> Result<(), DanglingId> {
        match kind {
            DeclKind::Function(f) => self.function(f)?,
            DeclKind::Method(m) => {
                self.function(&m.func)?;
                self.decls(&m.overrides)?;
            }
            DeclKind::Constructor(c) => {
                self.decls(&c.params)?;
                c.body.map_or(Ok(()), |b| self.stmt(b))?;
                c.instantiated_from.map_or(Ok(()), |d| self.decl(d))?;
                for init in &c.inits {
                    self.expr(init.init)?;
                    match &init.target {
                        InitTarget::Field(d) => self.decl(*d)?,
                        InitTarget::Indirect(path) => self.decls(path)?,
                        InitTarget::Base(t) | InitTarget::Delegating(t) => self.ty(*t)?,
                    }
                }
            }
            DeclKind::Destructor(d) => {
                d.body.map_or(Ok(()), |b| self.stmt(b))?;
                d.instantiated_from.map_or(Ok(()), |p| self.decl(p))?;
            }
            DeclKind::Record(r) => {
                if let Some(def) = &r.definition {
                    def.bases.iter().try_for_each(|b| self.ty(b.ty))?;
                    def.destructor.map_or(Ok(()), |d| self.decl(d))?;
                    def.operator_delete.map_or(Ok(()), |d| self.decl(d))?;
                    if let Some(layout) = &def.layout {
                        let bases = layout.base_offsets.iter();
                        let fields = layout.field_offsets.iter();
                        bases.chain(fields).try_for_each(|&(d, _)| self.decl(d))?;
                    }
                }
                if let Some(spec) = &r.specialization {
                    self.decl(spec.pattern)?;
                    self.template_args(&spec.args)?;
                }
            }
            DeclKind::Enum(e) => e.underlying.map_or(Ok(()), |t| self.ty(t))?,
            DeclKind::EnumConstant(c) => {
                self.ty(c.ty)?;
                c.init.map_or(Ok(()), |e| self.expr(e))?;
            }
            DeclKind::Variable(v) => {
                self.ty(v.ty)?;
                v.init.map_or(Ok(()), |e| self.expr(e))?;
            }
            DeclKind::Param(p) => {
                self.ty(p.ty)?;
                p.default.map_or(Ok(()), |e| self.expr(e))?;
            }
            DeclKind::Field(f) => {
                self.ty(f.ty)?;
                f.init.map_or(Ok(()), |e| self.expr(e))?;
            }
            DeclKind::StaticAssert { cond, .. } => self.expr(*cond)?,
            DeclKind::Typedef { underlying } => self.ty(*underlying)?,
            DeclKind::TemplateParam(p) => {
                if let TemplateParamKind::Value(t) = &p.kind {
                    self.ty(*t)?;
                }
            }
            DeclKind::FunctionTemplate { pattern } | DeclKind::ClassTemplate { pattern } => {
                self.decl(*pattern)?;
            }
            DeclKind::IndirectField { chain } => self.decls(chain)?,
            DeclKind::Namespace(_)
            | DeclKind::LinkageSpec(_)
            | DeclKind::TypeAliasTemplate
            | DeclKind::Using
            | DeclKind::UsingDirective
            | DeclKind::UsingShadow
            | DeclKind::Friend
            | DeclKind::Empty => {}
        }
        Ok(())
    }

    fn expr_kind(&self, kind: &ExprKind) -> Result<(), DanglingId> {
        match kind {
            ExprKind::DeclRef { decl } | ExprKind::InheritedCtorInit { ctor: decl } => {
                self.decl(*decl)?;
            }
            ExprKind::Unary { operand: e, .. }
            | ExprKind::Paren(e)
            | ExprKind::ConstantExpr(e)
            | ExprKind::SubstNonTypeParam(e)
            | ExprKind::BindTemporary(e)
            | ExprKind::ExprWithCleanups(e)
            | ExprKind::DefaultInit(e)
            | ExprKind::DefaultArg(e)
            | ExprKind::VaArg(e) => self.expr(*e)?,
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::CompoundAssign { lhs, rhs, .. } => {
                self.expr(*lhs)?;
                self.expr(*rhs)?;
            }
            ExprKind::Cast {
                operand,
                conversion,
                path,
                ..
            } => {
                self.expr(*operand)?;
                conversion.map_or(Ok(()), |d| self.decl(d))?;
                path.iter().try_for_each(|&t| self.ty(t))?;
            }
            ExprKind::Call { callee, args } | ExprKind::MemberCall { callee, args } => {
                self.expr(*callee)?;
                self.exprs(args)?;
            }
            ExprKind::OperatorCall { callee, args, .. } => {
                self.decl(*callee)?;
                self.exprs(args)?;
            }
            ExprKind::Construct { ctor, args } => {
                self.decl(*ctor)?;
                self.exprs(args)?;
            }
            ExprKind::Member { base, member, .. } => {
                self.expr(*base)?;
                self.decl(*member)?;
            }
            ExprKind::Subscript { base, index } => {
                self.expr(*base)?;
                self.expr(*index)?;
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => self.exprs(&[*cond, *then_expr, *else_expr])?,
            ExprKind::BinaryConditional {
                common,
                opaque,
                cond,
                then_expr,
                else_expr,
            } => self.exprs(&[*common, *opaque, *cond, *then_expr, *else_expr])?,
            ExprKind::InitList { inits, filler, .. } => {
                self.exprs(inits)?;
                filler.map_or(Ok(()), |e| self.expr(e))?;
            }
            ExprKind::ParenList { exprs } => self.exprs(exprs)?,
            ExprKind::TypeTrait { arg, .. } => match arg {
                TraitArg::Type(t) => self.ty(*t)?,
                TraitArg::Expr(e) => self.expr(*e)?,
            },
            ExprKind::OffsetOf { components } => {
                for component in components {
                    match component {
                        OffsetOfComponent::Field(d) => self.decl(*d)?,
                        OffsetOfComponent::Array(e) => self.expr(*e)?,
                        OffsetOfComponent::Base(t) => self.ty(*t)?,
                        OffsetOfComponent::Identifier(_) => {}
                    }
                }
            }
            ExprKind::New {
                operator_new,
                placement,
                allocated,
                array_size,
                init,
            } => {
                operator_new.map_or(Ok(()), |d| self.decl(d))?;
                self.exprs(placement)?;
                self.ty(*allocated)?;
                array_size.map_or(Ok(()), |e| self.expr(e))?;
                init.map_or(Ok(()), |e| self.expr(e))?;
            }
            ExprKind::Delete {
                operator_delete,
                arg,
                destroyed,
                ..
            } => {
                operator_delete.map_or(Ok(()), |d| self.decl(d))?;
                self.expr(*arg)?;
                self.ty(*destroyed)?;
            }
            ExprKind::MaterializeTemporary {
                sub,
                extending_decl,
            } => {
                self.expr(*sub)?;
                extending_decl.map_or(Ok(()), |d| self.decl(d))?;
            }
            ExprKind::OpaqueValue { source } => source.map_or(Ok(()), |e| self.expr(e))?,
            ExprKind::Atomic { args, .. } => self.exprs(args)?,
            ExprKind::PseudoDestructor { base, destroyed } => {
                self.expr(*base)?;
                self.ty(*destroyed)?;
            }
            ExprKind::ArrayInitLoop { common, body, .. } => {
                self.expr(*common)?;
                self.expr(*body)?;
            }
            ExprKind::IntegerLit(_)
            | ExprKind::CharLit(_)
            | ExprKind::StringLit { .. }
            | ExprKind::FloatLit(_)
            | ExprKind::BoolLit(_)
            | ExprKind::NullPtrLit
            | ExprKind::Predefined { .. }
            | ExprKind::UnresolvedLookup { .. }
            | ExprKind::This
            | ExprKind::Lambda
            | ExprKind::ImplicitValueInit
            | ExprKind::ScalarValueInit
            | ExprKind::Noexcept(_)
            | ExprKind::BoolTrait(_)
            | ExprKind::ArrayInitIndex
            | ExprKind::Recovery
            | ExprKind::Unsupported(_) => {}
        }
        Ok(())
    }

    fn stmt_kind(&self, kind: &StmtKind) -> Result<(), DanglingId> {
        match kind {
            StmtKind::Compound(stmts) => stmts.iter().try_for_each(|&s| self.stmt(s))?,
            StmtKind::Decl(decls) => self.decls(decls)?,
            StmtKind::Expr(e) => self.expr(*e)?,
            StmtKind::Return(e) => e.map_or(Ok(()), |e| self.expr(e))?,
            StmtKind::If {
                cond_var,
                cond,
                then_branch,
                else_branch,
            } => {
                cond_var.map_or(Ok(()), |d| self.decl(d))?;
                self.expr(*cond)?;
                self.stmt(*then_branch)?;
                else_branch.map_or(Ok(()), |s| self.stmt(s))?;
            }
            StmtKind::While {
                cond_var,
                cond,
                body,
            }
            | StmtKind::Switch {
                cond_var,
                cond,
                body,
            } => {
                cond_var.map_or(Ok(()), |d| self.decl(d))?;
                self.expr(*cond)?;
                self.stmt(*body)?;
            }
            StmtKind::For {
                init,
                cond,
                inc,
                body,
            } => {
                init.map_or(Ok(()), |s| self.stmt(s))?;
                cond.map_or(Ok(()), |e| self.expr(e))?;
                inc.map_or(Ok(()), |e| self.expr(e))?;
                self.stmt(*body)?;
            }
            StmtKind::Do { body, cond } => {
                self.stmt(*body)?;
                self.expr(*cond)?;
            }
            StmtKind::Label { body, .. } | StmtKind::Attributed { body, .. } => {
                self.stmt(*body)?;
            }
            StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Case { .. }
            | StmtKind::Default
            | StmtKind::Goto(_)
            | StmtKind::Null
            | StmtKind::Unsupported(_) => {}
        }
        Ok(())
    }

    fn type_kind(&self, kind: &TypeKind) -> Result<(), DanglingId> {
        match kind {
            TypeKind::Pointer(t)
            | TypeKind::LValueRef(t)
            | TypeKind::RValueRef(t)
            | TypeKind::IncompleteArray(t)
            | TypeKind::Qualified { base: t, .. }
            | TypeKind::Array { elem: t, .. } => self.ty(*t)?,
            TypeKind::Function(f) => {
                self.ty(f.ret)?;
                f.params.iter().try_for_each(|&t| self.ty(t))?;
            }
            TypeKind::Record(d) | TypeKind::Enum(d) => self.decl(*d)?,
            TypeKind::MemberPointer { class, pointee } => {
                self.decl(*class)?;
                self.ty(*pointee)?;
            }
            TypeKind::Typedef { decl, underlying } => {
                self.decl(*decl)?;
                self.ty(*underlying)?;
            }
            TypeKind::Builtin(_)
            | TypeKind::TemplateParam { .. }
            | TypeKind::Dependent(_)
            | TypeKind::Unsupported(_) => {}
        }
        Ok(())
    }
}

impl TranslationUnit {
    /// Check that every id stored anywhere in the unit names an existing
    /// arena slot.
    ///
    /// # Errors
    ///
    /// The first dangling reference, in arena order.
    pub fn validate(&self) -> Result<(), DanglingId> {
        let mut checker = Checker {
            decls: self.decls.len(),
            exprs: self.exprs.len(),
            stmts: self.stmts.len(),
            types: self.types.len(),
            from: Referrer::Unit,
        };
        checker.decls(&self.top_level)?;

        for (i, decl) in self.decls.iter().enumerate() {
            checker.from = Referrer::Decl(DeclId::new(index_u32(i)));
            decl.parent.map_or(Ok(()), |p| checker.decl(p))?;
            checker.decls(&decl.children)?;
            checker.decls(&decl.template_params)?;
            checker.decl_kind(&decl.kind)?;
        }
        for (i, expr) in self.exprs.iter().enumerate() {
            checker.from = Referrer::Expr(ExprId::new(index_u32(i)));
            checker.ty(expr.ty)?;
            checker.expr_kind(&expr.kind)?;
        }
        for (i, stmt) in self.stmts.iter().enumerate() {
            checker.from = Referrer::Stmt(StmtId::new(index_u32(i)));
            checker.stmt_kind(&stmt.kind)?;
        }
        for (id, kind) in self.types.iter() {
            checker.from = Referrer::Type(id);
            checker.type_kind(kind)?;
        }
        Ok(())
    }
}

fn index_u32(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}
