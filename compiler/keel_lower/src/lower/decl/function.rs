//! Functions, methods, constructors and destructors.

use keel_ir::{
    CtorDecl, CtorInit, DeclId, DeclKind, DtorDecl, FunctionDecl, InitTarget, MethodDecl, Span,
    StmtId, TypeId,
};
use keel_term::Term;

use super::{Form, CONSTRUCTOR, DESTRUCTOR, FUNCTION, METHOD};
use crate::lower::expr::local_name;
use crate::lower::types::{arity_term, cc_term, method_quals_term};
use crate::lower::Lowerer;
use crate::LowerError;

impl Lowerer<'_> {
    /// `Dfunction name (Build_Func ret [params] cc ar body?)`
    pub(super) fn lower_function(
        &mut self,
        id: DeclId,
        f: &FunctionDecl,
        form: Form,
    ) -> Result<Term, LowerError> {
        let name = self.object_name(id)?;
        let ret = self.lower_type(f.ret)?;
        let params = self.params(&f.params)?;
        let body = match (f.body, f.builtin.as_deref()) {
            (Some(body), _) => Some(Term::ctor("Impl", vec![self.lower_stmt(body)?])),
            (None, Some(builtin)) => Some(Term::ctor("Builtin", vec![builtin_term(builtin)])),
            (None, None) if f.defaulted => Some(Term::atom("Defaulted")),
            (None, None) => None,
        };
        let func = Term::ctor(
            "Build_Func",
            vec![
                ret,
                params,
                cc_term(f.cc),
                arity_term(f.variadic),
                Term::option(body),
            ],
        );
        Ok(form.build(FUNCTION, vec![name, func]))
    }

    /// `Dmethod static name (Build_Method ret class qual [params] cc ar body?)`
    pub(super) fn lower_method(
        &mut self,
        id: DeclId,
        m: &MethodDecl,
        form: Form,
    ) -> Result<Term, LowerError> {
        let f = &m.func;
        let name = self.object_name(id)?;
        let ret = self.lower_type(f.ret)?;
        let class = self.owner_name(id)?;
        let params = self.params(&f.params)?;
        let body = self.user_body(f.body, f.defaulted)?;
        let method = Term::ctor(
            "Build_Method",
            vec![
                ret,
                class,
                method_quals_term(m.quals),
                params,
                cc_term(f.cc),
                arity_term(f.variadic),
                Term::option(body),
            ],
        );
        Ok(form.build(METHOD, vec![Term::bool(m.is_static), name, method]))
    }

    /// `Dconstructor name (Build_Ctor class [params] cc ar body?)`
    pub(super) fn lower_constructor(
        &mut self,
        id: DeclId,
        c: &CtorDecl,
        form: Form,
    ) -> Result<Term, LowerError> {
        let name = self.object_name(id)?;
        let class = self.owner_name(id)?;
        let params = self.params(&c.params)?;
        let body = match c.body {
            Some(body) => {
                let inits = self.initializers(id, c)?;
                let body = self.lower_stmt(body)?;
                Some(Term::ctor(
                    "UserDefined",
                    vec![Term::pair(Term::List(inits), body)],
                ))
            }
            None if c.defaulted => Some(Term::atom("Defaulted")),
            None => None,
        };
        let ctor = Term::ctor(
            "Build_Ctor",
            vec![
                class,
                params,
                cc_term(c.cc),
                arity_term(c.variadic),
                Term::option(body),
            ],
        );
        Ok(form.build(CONSTRUCTOR, vec![name, ctor]))
    }

    /// `Ddestructor (Ndtor T) (Build_Dtor class cc body?)`
    pub(super) fn lower_destructor(
        &mut self,
        id: DeclId,
        d: &DtorDecl,
        form: Form,
    ) -> Result<Term, LowerError> {
        let name = self.object_name(id)?;
        let class = self.owner_name(id)?;
        let body = self.user_body(d.body, d.defaulted)?;
        let dtor = Term::ctor(
            "Build_Dtor",
            vec![class, cc_term(d.cc), Term::option(body)],
        );
        Ok(form.build(DESTRUCTOR, vec![name, dtor]))
    }

    /// `[(name, ty)]`; unnamed parameters are `#index`.
    fn params(&mut self, params: &[DeclId]) -> Result<Term, LowerError> {
        let unit = self.unit;
        let types = self.param_types(params)?;
        let terms = params
            .iter()
            .zip(types)
            .map(|(&param, ty)| {
                let decl = unit.decl(param);
                let index = match &decl.kind {
                    DeclKind::Param(p) => p.index,
                    _ => 0,
                };
                Term::pair(Term::str(local_name(decl.name.as_deref(), index)), ty)
            })
            .collect::<Vec<_>>();
        Ok(Term::List(terms))
    }

    fn user_body(
        &mut self,
        body: Option<StmtId>,
        defaulted: bool,
    ) -> Result<Option<Term>, LowerError> {
        Ok(match body {
            Some(body) => Some(Term::ctor("UserDefined", vec![self.lower_stmt(body)?])),
            None if defaulted => Some(Term::atom("Defaulted")),
            None => None,
        })
    }

    /// Name of the record a member belongs to.
    fn owner_name(&mut self, id: DeclId) -> Result<Term, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(id);
        let owner = unit
            .semantic_parent(id)
            .filter(|p| matches!(unit.decl(*p).kind, DeclKind::Record(_)))
            .ok_or(LowerError::MissingPart {
                what: "member function",
                part: "enclosing record",
                span: decl.span,
            })?;
        self.type_name(owner)
    }

    // Initializer lists

    /// The constructor's member initializers in initialization order:
    /// bases in specifier order, then fields in declaration order, with the
    /// implicit ones filled in.
    fn initializers(&mut self, ctor: DeclId, c: &CtorDecl) -> Result<Vec<Term>, LowerError> {
        let unit = self.unit;
        if let Some(init) = c
            .inits
            .iter()
            .find(|i| matches!(i.target, InitTarget::Delegating(_)))
        {
            return Ok(vec![self.initializer(init)?]);
        }

        let record = unit.semantic_parent(ctor).and_then(|p| match &unit.decl(p).kind {
            DeclKind::Record(r) => Some((p, r)),
            _ => None,
        });
        let Some((record_id, record)) = record else {
            return self.written_initializers(&c.inits);
        };
        let Some(def) = record.definition.as_ref().filter(|_| !record.is_union()) else {
            return self.written_initializers(&c.inits);
        };

        let mut out = Vec::with_capacity(def.bases.len() + c.inits.len());
        for base in &def.bases {
            let base_record = unit.record_of(base.ty);
            let written = c.inits.iter().find(|i| match i.target {
                InitTarget::Base(t) => unit.record_of(t) == base_record,
                InitTarget::Field(_) | InitTarget::Indirect(_) | InitTarget::Delegating(_) => {
                    false
                }
            });
            match written {
                Some(init) => out.push(self.initializer(init)?),
                None => {
                    let path = self.base_path_term(base.ty, unit.decl(ctor).span)?;
                    let ty = self.lower_type(base.ty)?;
                    let e = Term::ctor("Edefault_init", vec![ty.clone()]);
                    out.push(Term::ctor("Build_Initializer", vec![path, ty, e]));
                }
            }
        }

        for &child in &unit.decl(record_id).children {
            let DeclKind::Field(field) = &unit.decl(child).kind else {
                continue;
            };
            let written = c.inits.iter().find(|i| match i.target {
                InitTarget::Field(f) => f == child,
                InitTarget::Base(_) | InitTarget::Indirect(_) | InitTarget::Delegating(_) => false,
            });
            if let Some(init) = written {
                out.push(self.initializer(init)?);
                continue;
            }
            let indirect = c
                .inits
                .iter()
                .filter(|i| match &i.target {
                    InitTarget::Indirect(chain) => chain.first() == Some(&child),
                    InitTarget::Field(_) | InitTarget::Base(_) | InitTarget::Delegating(_) => {
                        false
                    }
                })
                .collect::<Vec<_>>();
            if !indirect.is_empty() {
                for init in indirect {
                    out.push(self.initializer(init)?);
                }
                continue;
            }
            let path = self.field_path_term(child)?;
            let ty = self.lower_type(field.ty)?;
            let e = match field.init {
                Some(default) => {
                    Term::ctor("Edefault_init_expr", vec![self.lower_full_expr(default)?])
                }
                None => Term::ctor("Edefault_init", vec![ty.clone()]),
            };
            out.push(Term::ctor("Build_Initializer", vec![path, ty, e]));
        }
        Ok(out)
    }

    fn written_initializers(&mut self, inits: &[CtorInit]) -> Result<Vec<Term>, LowerError> {
        let mut out = Vec::with_capacity(inits.len());
        for init in inits {
            out.push(self.initializer(init)?);
        }
        Ok(out)
    }

    /// `Build_Initializer path ty e` for a written initializer.
    fn initializer(&mut self, init: &CtorInit) -> Result<Term, LowerError> {
        let unit = self.unit;
        let (path, ty) = match &init.target {
            InitTarget::Field(field) => (self.field_path_term(*field)?, self.field_type(*field)?),
            InitTarget::Base(ty) => (self.base_path_term(*ty, unit.expr(init.init).span)?, *ty),
            InitTarget::Indirect(chain) => {
                let Some((&last, anon)) = chain.split_last() else {
                    return Err(LowerError::MissingPart {
                        what: "indirect initializer",
                        part: "field chain",
                        span: unit.expr(init.init).span,
                    });
                };
                let mut steps = Vec::with_capacity(anon.len());
                for &step in anon {
                    let step_ty = self.field_type(step)?;
                    let record = unit.record_of(step_ty).ok_or_else(|| LowerError::Malformed {
                        what: "indirect initializer",
                        detail: "anonymous member is not a record".to_owned(),
                        span: unit.decl(step).span,
                    })?;
                    let name = self.member_name(step)?;
                    steps.push(Term::pair(name, self.type_name(record)?));
                }
                let name = Term::str(unit.decl(last).name_str());
                (
                    Term::ctor("InitIndirect", vec![Term::List(steps), name]),
                    self.field_type(last)?,
                )
            }
            InitTarget::Delegating(ty) => (Term::atom("InitDelegating"), *ty),
        };
        let ty = self.lower_type(ty)?;
        let e = self.lower_full_expr(init.init)?;
        Ok(Term::ctor("Build_Initializer", vec![path, ty, e]))
    }

    fn field_path_term(&mut self, field: DeclId) -> Result<Term, LowerError> {
        Ok(Term::ctor("InitField", vec![self.member_name(field)?]))
    }

    fn base_path_term(&mut self, ty: TypeId, span: Span) -> Result<Term, LowerError> {
        let record = self.unit.record_of(ty).ok_or_else(|| LowerError::Malformed {
            what: "base initializer",
            detail: "base is not a record type".to_owned(),
            span,
        })?;
        Ok(Term::ctor("InitBase", vec![self.type_name(record)?]))
    }

    fn field_type(&self, field: DeclId) -> Result<TypeId, LowerError> {
        let decl = self.unit.decl(field);
        match &decl.kind {
            DeclKind::Field(f) => Ok(f.ty),
            _ => Err(LowerError::Malformed {
                what: "member initializer",
                detail: format!("{} is not a field", decl.kind.describe()),
                span: decl.span,
            }),
        }
    }
}

/// `Bin_*` for the builtins with a modeled semantics, `Bin_unknown "name"`
/// otherwise. Accepts the name with or without the `__builtin_` prefix.
pub(crate) fn builtin_term(name: &str) -> Term {
    let short = name.strip_prefix("__builtin_").unwrap_or(name);
    let atom = match short {
        "alloca" => "Bin_alloca",
        "alloca_with_align" => "Bin_alloca_with_align",
        "launder" => "Bin_launder",
        "expect" => "Bin_expect",
        "unreachable" => "Bin_unreachable",
        "trap" => "Bin_trap",
        "bswap16" => "Bin_bswap16",
        "bswap32" => "Bin_bswap32",
        "bswap64" => "Bin_bswap64",
        "ffs" => "Bin_ffs",
        "ffsl" => "Bin_ffsl",
        "ffsll" => "Bin_ffsll",
        "clz" => "Bin_clz",
        "clzl" => "Bin_clzl",
        "clzll" => "Bin_clzll",
        "ctz" => "Bin_ctz",
        "ctzl" => "Bin_ctzl",
        "ctzll" => "Bin_ctzll",
        "popcount" => "Bin_popcount",
        "popcountl" => "Bin_popcountl",
        "memset" => "Bin_memset",
        "memcmp" => "Bin_memcmp",
        "bzero" => "Bin_bzero",
        _ => return Term::ctor("Bin_unknown", vec![Term::str(name)]),
    };
    Term::atom(atom)
}
