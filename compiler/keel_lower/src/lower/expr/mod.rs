//! Expression dispatch.
//!
//! [`Lowerer::lower_expr`] matches every [`ExprKind`] exhaustively. Most
//! arms delegate to a helper in a sibling module; leaf and wrapper kinds
//! are handled inline.

mod call;
mod cast;
mod literal;
mod member;
mod memory;
mod opaque;
mod operator;

use keel_diagnostic::ErrorCode;
use keel_ir::{DeclId, DeclKind, Expr, ExprId, ExprKind, StorageClass, TraitArg, TraitKind};
use keel_term::Term;

use super::{Annot, Lowerer};
use crate::stack::with_stack;
use crate::LowerError;

impl Lowerer<'_> {
    /// Lower an expression that is not part of a larger one: a statement
    /// expression, an initializer, a condition. Binders opened inside must
    /// all be closed again by the time it returns.
    pub(crate) fn lower_full_expr(&mut self, id: ExprId) -> Result<Term, LowerError> {
        let before = self.opaque.depth();
        let term = self.lower_expr(id)?;
        let after = self.opaque.depth();
        if before != after {
            return Err(LowerError::NestingImbalance {
                before,
                after,
                span: self.unit.expr(id).span,
            });
        }
        Ok(term)
    }

    pub(crate) fn lower_opt_full_expr(
        &mut self,
        id: Option<ExprId>,
    ) -> Result<Option<Term>, LowerError> {
        id.map(|e| self.lower_full_expr(e)).transpose()
    }

    pub(crate) fn lower_exprs(&mut self, ids: &[ExprId]) -> Result<Vec<Term>, LowerError> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            out.push(self.lower_expr(id)?);
        }
        Ok(out)
    }

    pub(crate) fn lower_expr(&mut self, id: ExprId) -> Result<Term, LowerError> {
        with_stack(|| self.lower_expr_kind(id))
    }

    #[expect(
        clippy::too_many_lines,
        reason = "exhaustive ExprKind dispatch"
    )]
    fn lower_expr_kind(&mut self, id: ExprId) -> Result<Term, LowerError> {
        let unit = self.unit;
        let expr = unit.expr(id);
        let mode = self.config.mode;

        match &expr.kind {
            // Literals
            ExprKind::IntegerLit(bits) => self.lower_integer(*bits, expr),
            ExprKind::CharLit(c) => {
                let ty = self.lower_type(expr.ty)?;
                Ok(Term::ctor("Echar", vec![Term::nat(*c), ty]))
            }
            ExprKind::StringLit { bytes, char_width } => {
                self.lower_string(bytes, *char_width, expr)
            }
            ExprKind::FloatLit(text) => {
                self.unsupported_expr(format!("float: {text}"), expr, ErrorCode::W4001)
            }
            ExprKind::BoolLit(b) | ExprKind::Noexcept(b) | ExprKind::BoolTrait(b) => {
                Ok(Term::ctor("Ebool", vec![Term::bool(*b)]))
            }
            ExprKind::NullPtrLit => Ok(Term::atom("Enull")),
            ExprKind::Predefined { value } => self.lower_string(value.as_bytes(), 1, expr),

            // Names
            ExprKind::DeclRef { decl } => self.lower_decl_ref(*decl, expr),
            ExprKind::UnresolvedLookup { name } => {
                if self.config.is_generic() {
                    Ok(Term::ctor("Eunresolved_name", vec![Term::str(name)]))
                } else {
                    self.unsupported_expr(format!("unresolved name {name}"), expr, ErrorCode::W4001)
                }
            }
            ExprKind::This => self.finish("Ethis", Vec::new(), expr, Annot::TYPE),

            // Operators
            ExprKind::Unary { op, operand } => self.lower_unary(*op, *operand, expr),
            ExprKind::Binary { op, lhs, rhs } => self.lower_binary(*op, *lhs, *rhs, expr),
            ExprKind::CompoundAssign { op, lhs, rhs } => {
                self.lower_compound_assign(*op, *lhs, *rhs, expr)
            }
            ExprKind::Cast {
                kind,
                style,
                operand,
                conversion,
                path,
            } => self.lower_cast(*kind, *style, *operand, *conversion, path, expr),
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                let c = self.lower_expr(*cond)?;
                let t = self.lower_expr(*then_expr)?;
                let e = self.lower_expr(*else_expr)?;
                self.finish("Eif", vec![c, t, e], expr, Annot::VALCAT | Annot::TYPE)
            }
            ExprKind::BinaryConditional {
                common,
                opaque,
                cond,
                then_expr,
                else_expr,
            } => self.lower_binary_conditional(
                *common, *opaque, *cond, *then_expr, *else_expr, expr,
            ),

            // Calls and construction
            ExprKind::Call { callee, args } => self.lower_call(*callee, args, expr),
            ExprKind::MemberCall { callee, args } => self.lower_member_call(*callee, args, expr),
            ExprKind::OperatorCall { op, callee, args } => {
                self.lower_operator_call(*op, *callee, args, expr)
            }
            ExprKind::Construct { ctor, args } => {
                let ctor = self.object_name(*ctor)?;
                let args = self.lower_exprs(args)?;
                self.finish("Econstructor", vec![ctor, Term::List(args)], expr, Annot::TYPE)
            }
            ExprKind::InheritedCtorInit { ctor } => self.lower_inherited_ctor(*ctor, expr),

            // Access
            ExprKind::Member {
                base,
                member,
                arrow,
                qualified: _,
            } => self.lower_member(*base, *member, *arrow, expr),
            ExprKind::Subscript { base, index } => {
                let l = self.lower_expr(*base)?;
                let r = self.lower_expr(*index)?;
                self.finish("Esubscript", vec![l, r], expr, Annot::call(mode))
            }

            // Transparent wrappers
            ExprKind::Paren(inner)
            | ExprKind::ConstantExpr(inner)
            | ExprKind::SubstNonTypeParam(inner)
            | ExprKind::BindTemporary(inner) => self.lower_expr(*inner),

            // Initialization
            ExprKind::InitList {
                inits,
                filler,
                transparent,
            } => {
                if *transparent {
                    return match inits.as_slice() {
                        [only] => self.lower_expr(*only),
                        _ => Err(LowerError::Malformed {
                            what: "initializer list",
                            detail: format!(
                                "transparent list with {} elements",
                                inits.len()
                            ),
                            span: expr.span,
                        }),
                    };
                }
                let inits = self.lower_exprs(inits)?;
                let filler = filler.map(|f| self.lower_expr(f)).transpose()?;
                self.finish(
                    "Einitlist",
                    vec![Term::List(inits), Term::option(filler)],
                    expr,
                    Annot::TYPE,
                )
            }
            ExprKind::ParenList { exprs } => {
                let ty = if unit.is_dependent(expr.ty) {
                    None
                } else {
                    Some(self.lower_type(expr.ty)?)
                };
                let exprs = self.lower_exprs(exprs)?;
                Ok(Term::ctor(
                    "Eunresolved_parenlist",
                    vec![Term::option(ty), Term::List(exprs)],
                ))
            }
            ExprKind::DefaultInit(inner) => Ok(Term::ctor(
                "Edefault_init_expr",
                vec![self.lower_expr(*inner)?],
            )),
            ExprKind::DefaultArg(inner) => {
                Ok(Term::ctor("Eimplicit", vec![self.lower_expr(*inner)?]))
            }
            ExprKind::ImplicitValueInit | ExprKind::ScalarValueInit => {
                self.finish("Eimplicit_init", Vec::new(), expr, Annot::TYPE)
            }

            // Compile-time queries
            ExprKind::TypeTrait { kind, arg } => self.lower_type_trait(*kind, arg, expr),
            ExprKind::OffsetOf { components } => self.lower_offset_of(components, expr),

            // Memory
            ExprKind::New {
                operator_new,
                placement,
                allocated,
                array_size,
                init,
            } => self.lower_new(
                *operator_new,
                placement,
                *allocated,
                *array_size,
                *init,
                expr,
            ),
            ExprKind::Delete {
                array,
                operator_delete,
                destroying,
                arg,
                destroyed,
            } => self.lower_delete(
                *array,
                *operator_delete,
                *destroying,
                *arg,
                *destroyed,
                expr,
            ),
            ExprKind::PseudoDestructor { base, destroyed } => {
                let ty = self.lower_type(*destroyed)?;
                let base = self.lower_expr(*base)?;
                Ok(Term::ctor("Epseudo_destructor", vec![ty, base]))
            }

            // Temporaries and binders
            ExprKind::ExprWithCleanups(inner) => {
                Ok(Term::ctor("Eandclean", vec![self.lower_expr(*inner)?]))
            }
            ExprKind::MaterializeTemporary {
                sub,
                extending_decl,
            } => {
                if extending_decl.is_some() {
                    return Err(LowerError::ExtendedTemporary { span: expr.span });
                }
                let sub = self.lower_expr(*sub)?;
                self.finish("Ematerialize_temp", vec![sub], expr, Annot::VALCAT)
            }
            ExprKind::OpaqueValue { .. } => self.lower_opaque_ref(id, expr),
            ExprKind::ArrayInitLoop { common, size, body } => {
                self.lower_array_loop(*common, *size, *body, expr)
            }
            ExprKind::ArrayInitIndex => {
                let depth = Term::nat(self.opaque.depth());
                self.finish("Earrayloop_index", vec![depth], expr, Annot::TYPE)
            }

            // Builtins
            ExprKind::Atomic { op, args } => {
                let args = self.lower_exprs(args)?;
                self.finish(
                    "Eatomic",
                    vec![Term::atom(atomic_atom(*op)), Term::List(args)],
                    expr,
                    Annot::TYPE,
                )
            }
            ExprKind::VaArg(inner) => {
                let inner = self.lower_expr(*inner)?;
                self.finish("Eva_arg", vec![inner], expr, Annot::TYPE)
            }

            // Placeholders
            ExprKind::Lambda => self.unsupported_expr("lambda", expr, ErrorCode::W4001),
            ExprKind::Recovery => self.unsupported_expr("recovery", expr, ErrorCode::W4001),
            ExprKind::Unsupported(tag) => {
                self.unsupported_expr(tag.clone(), expr, ErrorCode::W4001)
            }
        }
    }

    /// Reference to a named declaration.
    fn lower_decl_ref(&mut self, id: DeclId, expr: &Expr) -> Result<Term, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(id);
        match &decl.kind {
            DeclKind::EnumConstant(constant) => {
                let name = self.object_name(id)?;
                let at_enum_type = unit.enum_of(expr.ty).is_some()
                    && unit.unqualified(expr.ty) == unit.unqualified(constant.ty);
                if at_enum_type {
                    let ty = self.lower_type(expr.ty)?;
                    Ok(Term::ctor("Econst_ref", vec![Term::ctor("Gname", vec![name]), ty]))
                } else {
                    // Inside the enum's own body the constant has the
                    // underlying type.
                    let enum_ty = self.lower_type(constant.ty)?;
                    let ty = self.lower_type(expr.ty)?;
                    Ok(Term::ctor("Eenum_const_at", vec![name, enum_ty, ty]))
                }
            }
            DeclKind::Param(p) => {
                let local = local_name(decl.name.as_deref(), p.index);
                let name = Term::ctor("Lname", vec![Term::str(local)]);
                self.var_ref(name, p.ty)
            }
            DeclKind::Variable(v) => {
                let local = unit.in_function_scope(id) && v.storage != StorageClass::Static;
                let name = if local {
                    Term::ctor("Lname", vec![Term::str(decl.name_str())])
                } else {
                    Term::ctor("Gname", vec![self.object_name(id)?])
                };
                self.var_ref(name, v.ty)
            }
            DeclKind::Function(_) | DeclKind::Method(_) => {
                let name = Term::ctor("Gname", vec![self.object_name(id)?]);
                let ty = self.lower_type(expr.ty)?;
                Ok(Term::ctor("Evar", vec![name, ty]))
            }
            DeclKind::Constructor(_)
            | DeclKind::Destructor(_)
            | DeclKind::Record(_)
            | DeclKind::Enum(_)
            | DeclKind::Field(_)
            | DeclKind::Namespace(_)
            | DeclKind::LinkageSpec(_)
            | DeclKind::StaticAssert { .. }
            | DeclKind::Typedef { .. }
            | DeclKind::TypeAliasTemplate
            | DeclKind::TemplateParam(_)
            | DeclKind::FunctionTemplate { .. }
            | DeclKind::ClassTemplate { .. }
            | DeclKind::Using
            | DeclKind::UsingDirective
            | DeclKind::UsingShadow
            | DeclKind::Friend
            | DeclKind::Empty
            | DeclKind::IndirectField { .. } => Err(LowerError::Malformed {
                what: "declaration reference",
                detail: format!("{} is not a value", decl.kind.describe()),
                span: expr.span,
            }),
        }
    }

    /// `Evar name ty`, read through when `ty` is a reference.
    fn var_ref(&mut self, name: Term, ty: keel_ir::TypeId) -> Result<Term, LowerError> {
        let var = Term::ctor("Evar", vec![name, self.lower_type(ty)?]);
        Ok(self.read_through(var, ty))
    }

    /// Wrap `e` in `Eread_ref` when the declared type `ty` is a reference.
    pub(super) fn read_through(&self, e: Term, ty: keel_ir::TypeId) -> Term {
        if self.unit.is_reference(ty) {
            Term::ctor("Eread_ref", vec![e])
        } else {
            e
        }
    }

    fn lower_type_trait(
        &mut self,
        kind: TraitKind,
        arg: &TraitArg,
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let head = match kind {
            TraitKind::SizeOf => "Esize_of",
            TraitKind::AlignOf | TraitKind::PreferredAlignOf => "Ealign_of",
            TraitKind::VecStep => {
                return Err(LowerError::UnsupportedTrait {
                    name: "vec_step",
                    span: expr.span,
                })
            }
        };
        let arg = match arg {
            TraitArg::Type(t) => Term::inl(self.lower_type(*t)?),
            TraitArg::Expr(e) => Term::inr(self.lower_expr(*e)?),
        };
        self.finish(head, vec![arg], expr, Annot::TYPE)
    }

    fn lower_offset_of(
        &mut self,
        components: &[keel_ir::OffsetOfComponent],
        expr: &Expr,
    ) -> Result<Term, LowerError> {
        let [keel_ir::OffsetOfComponent::Field(field)] = components else {
            return Err(LowerError::UnsupportedOffsetOf { span: expr.span });
        };
        let field = self.field_name(*field)?;
        self.finish(
            "Eoffset_of",
            vec![Term::ctor("Oo_Field", vec![field])],
            expr,
            Annot::TYPE,
        )
    }
}

/// Source name of a local, or `#<index>` for an unnamed parameter.
pub(crate) fn local_name(name: Option<&str>, index: u32) -> String {
    match name {
        Some(n) if !n.is_empty() => n.to_owned(),
        _ => format!("#{index}"),
    }
}

fn atomic_atom(op: keel_ir::AtomicOp) -> &'static str {
    use keel_ir::AtomicOp;
    match op {
        AtomicOp::Load => "AO__atomic_load",
        AtomicOp::LoadN => "AO__atomic_load_n",
        AtomicOp::Store => "AO__atomic_store",
        AtomicOp::StoreN => "AO__atomic_store_n",
        AtomicOp::Exchange => "AO__atomic_exchange",
        AtomicOp::ExchangeN => "AO__atomic_exchange_n",
        AtomicOp::CompareExchange => "AO__atomic_compare_exchange",
        AtomicOp::CompareExchangeN => "AO__atomic_compare_exchange_n",
        AtomicOp::FetchAdd => "AO__atomic_fetch_add",
        AtomicOp::FetchSub => "AO__atomic_fetch_sub",
        AtomicOp::FetchAnd => "AO__atomic_fetch_and",
        AtomicOp::FetchOr => "AO__atomic_fetch_or",
        AtomicOp::FetchXor => "AO__atomic_fetch_xor",
        AtomicOp::FetchNand => "AO__atomic_fetch_nand",
        AtomicOp::AddFetch => "AO__atomic_add_fetch",
        AtomicOp::SubFetch => "AO__atomic_sub_fetch",
        AtomicOp::AndFetch => "AO__atomic_and_fetch",
        AtomicOp::OrFetch => "AO__atomic_or_fetch",
        AtomicOp::XorFetch => "AO__atomic_xor_fetch",
        AtomicOp::NandFetch => "AO__atomic_nand_fetch",
    }
}

#[cfg(test)]
mod tests;
