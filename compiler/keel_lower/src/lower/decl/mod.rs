//! Declaration lowering.
//!
//! [`Lowerer::lower_decl`] turns one declaration into zero or more
//! top-level terms. The run's [`Mode`] picks which side of a template is
//! emitted:
//!
//! - `Generic`: templated declarations, in their `D<kind>_template` form
//!   with the parameter header, plus `Dinstantiation` records for
//!   specializations.
//! - `Concrete`: everything that is not templated.
//!
//! Enums, namespaces and static assertions are emitted in both modes.

mod enums;
mod function;
mod record;

use keel_ir::{DeclId, DeclKind, RecordDecl, TemplateArg, TemplateParamKind};
use keel_term::Term;

use super::Lowerer;
use crate::{LowerError, Mode};

pub(crate) use function::builtin_term;

/// Constructor names of a declaration term, plain and templated.
#[derive(Copy, Clone, Debug)]
struct Head {
    plain: &'static str,
    template: &'static str,
}

impl Head {
    const fn new(plain: &'static str, template: &'static str) -> Self {
        Head { plain, template }
    }
}

const FUNCTION: Head = Head::new("Dfunction", "Dfunction_template");
const METHOD: Head = Head::new("Dmethod", "Dmethod_template");
const CONSTRUCTOR: Head = Head::new("Dconstructor", "Dconstructor_template");
const DESTRUCTOR: Head = Head::new("Ddestructor", "Ddestructor_template");
const STRUCT: Head = Head::new("Dstruct", "Dstruct_template");
const UNION: Head = Head::new("Dunion", "Dunion_template");
const TYPEDEF: Head = Head::new("Dtypedef", "Dtypedef_template");

/// How a declaration that survives the mode filter is printed.
enum Form {
    Plain,
    /// Parameter header, outermost scope first.
    Template(Vec<Term>),
}

impl Form {
    fn build(self, head: Head, mut args: Vec<Term>) -> Term {
        match self {
            Form::Plain => Term::ctor(head.plain, args),
            Form::Template(params) => {
                args.insert(0, Term::List(params));
                Term::ctor(head.template, args)
            }
        }
    }
}

impl Lowerer<'_> {
    /// Lower one declaration. An empty result is a silent skip.
    pub(crate) fn lower_decl(&mut self, id: DeclId) -> Result<Vec<Term>, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(id);
        tracing::trace!(decl = %decl.name_str(), kind = decl.kind.describe(), "lower declaration");

        let mut out = Vec::new();
        match &decl.kind {
            DeclKind::Function(f) => {
                if let Some(spec) = &f.specialization {
                    out.extend(self.instantiation(id, spec.pattern, &spec.args)?);
                }
                if let Some(form) = self.form(id)? {
                    out.push(self.lower_function(id, f, form)?);
                }
            }
            DeclKind::Method(m) => {
                if let Some(spec) = &m.func.specialization {
                    out.extend(self.instantiation(id, spec.pattern, &spec.args)?);
                }
                if let Some(form) = self.form(id)? {
                    out.push(self.lower_method(id, m, form)?);
                }
            }
            DeclKind::Constructor(c) => {
                if let Some(from) = c.instantiated_from {
                    out.extend(self.member_instantiation(id, from)?);
                }
                if let Some(form) = self.form(id)? {
                    out.push(self.lower_constructor(id, c, form)?);
                }
            }
            DeclKind::Destructor(d) => {
                if let Some(from) = d.instantiated_from {
                    out.extend(self.member_instantiation(id, from)?);
                }
                if let Some(form) = self.form(id)? {
                    out.push(self.lower_destructor(id, d, form)?);
                }
            }
            DeclKind::Record(r) => out.extend(self.lower_record(id, r)?),
            DeclKind::Enum(e) => out.extend(self.lower_enum(id, e)?),
            DeclKind::EnumConstant(c) => out.push(self.lower_enum_constant(id, c)?),
            DeclKind::Variable(v) => {
                // Variable templates are not modeled.
                if self.config.mode == Mode::Concrete && !decl.templated {
                    let name = self.object_name(id)?;
                    let ty = self.lower_type(v.ty)?;
                    let init = self.lower_opt_full_expr(v.init)?;
                    out.push(Term::ctor("Dvariable", vec![name, ty, Term::option(init)]));
                }
            }
            DeclKind::Namespace(_) => {
                let mut members = Vec::new();
                for &child in &decl.children {
                    members.extend(self.lower_scope_member(child)?);
                }
                out.push(Term::ctor("Dnamespace", vec![Term::List(members)]));
            }
            DeclKind::LinkageSpec(_) => {
                return Err(LowerError::UnflattenedLinkageSpec { span: decl.span })
            }
            DeclKind::StaticAssert { cond, message } => {
                let message = message.as_deref().map(Term::str);
                let cond = self.lower_full_expr(*cond)?;
                out.push(Term::ctor(
                    "Dstatic_assert",
                    vec![Term::option(message), cond],
                ));
            }
            DeclKind::Typedef { underlying } => {
                if self.config.emit_typedefs {
                    if let Some(form) = self.form(id)? {
                        let name = self.type_name(id)?;
                        let ty = self.lower_type(*underlying)?;
                        out.push(form.build(TYPEDEF, vec![name, ty]));
                    }
                }
            }
            DeclKind::FunctionTemplate { pattern } | DeclKind::ClassTemplate { pattern } => {
                out.extend(self.lower_decl(*pattern)?);
            }
            DeclKind::TypeAliasTemplate
            | DeclKind::Using
            | DeclKind::UsingDirective
            | DeclKind::UsingShadow
            | DeclKind::Friend
            | DeclKind::Empty
            | DeclKind::IndirectField { .. } => {}
            DeclKind::Param(_) | DeclKind::Field(_) | DeclKind::TemplateParam(_) => {
                return Err(LowerError::Malformed {
                    what: "declaration",
                    detail: format!("{} outside its owner", decl.kind.describe()),
                    span: decl.span,
                })
            }
        }
        Ok(out)
    }

    /// Lower a member of a namespace, seeing through linkage blocks.
    fn lower_scope_member(&mut self, id: DeclId) -> Result<Vec<Term>, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(id);
        if let DeclKind::LinkageSpec(_) = decl.kind {
            let mut out = Vec::new();
            for &child in &decl.children {
                out.extend(self.lower_scope_member(child)?);
            }
            return Ok(out);
        }
        self.lower_decl(id)
    }

    /// `None` if the run's mode skips `id`.
    fn form(&mut self, id: DeclId) -> Result<Option<Form>, LowerError> {
        let templated = self.unit.decl(id).templated;
        match (self.config.mode, templated) {
            (Mode::Generic, true) => Ok(Some(Form::Template(self.template_header(id)?))),
            (Mode::Concrete, false) => Ok(Some(Form::Plain)),
            (Mode::Generic, false) | (Mode::Concrete, true) => Ok(None),
        }
    }

    /// `[TypeParam "T"; ValueParam "N" ty; TemplateParam "X"]` for every
    /// parameter in scope at `id`.
    fn template_header(&mut self, id: DeclId) -> Result<Vec<Term>, LowerError> {
        let unit = self.unit;
        let mut params = Vec::new();
        for param in unit.template_params_in_scope(id) {
            let decl = unit.decl(param);
            let DeclKind::TemplateParam(p) = &decl.kind else {
                return Err(LowerError::Malformed {
                    what: "template header",
                    detail: format!("{} in parameter list", decl.kind.describe()),
                    span: decl.span,
                });
            };
            let name = Term::str(decl.name_str());
            params.push(match &p.kind {
                TemplateParamKind::Type => Term::ctor("TypeParam", vec![name]),
                TemplateParamKind::Value(ty) => {
                    Term::ctor("ValueParam", vec![name, self.lower_type(*ty)?])
                }
                TemplateParamKind::Template => Term::ctor("TemplateParam", vec![name]),
            });
        }
        Ok(params)
    }

    /// Instantiation record of a constructor or destructor, whose template
    /// arguments are those of the enclosing class specialization. Members
    /// of ordinary classes have none.
    fn member_instantiation(
        &mut self,
        id: DeclId,
        pattern: DeclId,
    ) -> Result<Option<Term>, LowerError> {
        let unit = self.unit;
        let owner = unit.semantic_parent(id).map(|p| &unit.decl(p).kind);
        match owner {
            Some(DeclKind::Record(RecordDecl {
                specialization: Some(spec),
                ..
            })) => self.instantiation(id, pattern, &spec.args),
            _ => Ok(None),
        }
    }

    /// `Dinstantiation inst generic [TypeArg t]`, emitted in `Generic`
    /// mode only. Only type arguments are supported.
    fn instantiation(
        &mut self,
        id: DeclId,
        pattern: DeclId,
        targs: &[TemplateArg],
    ) -> Result<Option<Term>, LowerError> {
        if self.config.mode != Mode::Generic {
            return Ok(None);
        }
        let unit = self.unit;
        let mut flat = Vec::with_capacity(targs.len());
        flatten_args(targs, &mut flat);

        let mut args = Vec::with_capacity(flat.len());
        for arg in flat {
            let TemplateArg::Type(ty) = arg else {
                return Err(LowerError::NonTypeInstantiationArg {
                    name: self.names.source_path(id),
                    kind: arg.describe(),
                    span: unit.decl(id).span,
                });
            };
            args.push(Term::ctor("TypeArg", vec![self.lower_type(*ty)?]));
        }
        let inst = self.object_name(id)?;
        let generic = self.object_name(pattern)?;
        Ok(Some(Term::ctor(
            "Dinstantiation",
            vec![inst, generic, Term::List(args)],
        )))
    }
}

fn flatten_args<'a>(args: &'a [TemplateArg], out: &mut Vec<&'a TemplateArg>) {
    for arg in args {
        match arg {
            TemplateArg::Pack(inner) => flatten_args(inner, out),
            TemplateArg::Type(_)
            | TemplateArg::Integral { .. }
            | TemplateArg::NullPtr(_)
            | TemplateArg::Expr(_)
            | TemplateArg::Decl(_)
            | TemplateArg::Template(_) => out.push(arg),
        }
    }
}

#[cfg(test)]
mod tests;
