//! Canonical identities for declarations.
//!
//! Every emitted declaration and every reference to one needs a name that
//! is unique across the translation unit and stable across runs.
//!
//! - Objects (functions, variables, methods) use the host's mangled symbol
//!   where the host would mangle them, their plain name where it would not
//!   (`extern "C"`, global variables, `main`), and a synthesized identity for
//!   destructors and enum constants.
//! - Types use one of two strategies, fixed for the run: a host-compatible
//!   symbol ([`NamingStrategy::Opaque`]) or an explicit [`QualifiedName`]
//!   tree ([`NamingStrategy::Structured`]).

mod itanium;
mod structured;
mod symbol;

use std::fmt;

use smallvec::SmallVec;

use keel_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use keel_ir::{Decl, DeclId, DeclKind, ExprId, StorageClass, TranslationUnit, TypeId};

use crate::{LowerError, NamingStrategy};

pub use itanium::ItaniumMangler;

/// Prefix of synthesized object names. `@` never appears in host symbols
/// or source identifiers.
pub const SYNTH_PREFIX: &str = "@keel.";

/// Distinguishing kind of an anonymous entity. Ordinals are counted per
/// kind.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AnonKind {
    Namespace,
    Record,
    Enum,
}

impl AnonKind {
    pub fn describe(self) -> &'static str {
        match self {
            AnonKind::Namespace => "namespace",
            AnonKind::Record => "record",
            AnonKind::Enum => "enum",
        }
    }
}

/// One argument of a specialized template name.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TemplateArgName {
    Type(TypeId),
    Integral(i128),
    NullPtr,
    Expr(ExprId),
    /// Declaration and template-template arguments are kept only by kind.
    Other(&'static str),
}

/// A type identity built bottom-up from the enclosing-scope chain.
///
/// Function scopes are rooted at `Global(<function symbol>)`, which keeps
/// the local types of overloaded functions apart.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum QualifiedName {
    Global(String),
    Nested {
        parent: Box<QualifiedName>,
        component: String,
    },
    Specialized {
        template: Box<QualifiedName>,
        args: SmallVec<[TemplateArgName; 2]>,
    },
    Anonymous {
        parent: Option<Box<QualifiedName>>,
        kind: AnonKind,
        ordinal: u32,
    },
}

impl QualifiedName {
    /// `component` inside `parent`, or at global scope.
    pub fn nested(parent: Option<QualifiedName>, component: impl Into<String>) -> Self {
        match parent {
            None => QualifiedName::Global(component.into()),
            Some(parent) => QualifiedName::Nested {
                parent: Box::new(parent),
                component: component.into(),
            },
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualifiedName::Global(name) => f.write_str(name),
            QualifiedName::Nested { parent, component } => write!(f, "{parent}::{component}"),
            QualifiedName::Specialized { template, args } => {
                write!(f, "{template}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match arg {
                        TemplateArgName::Type(t) => write!(f, "{t:?}")?,
                        TemplateArgName::Integral(v) => write!(f, "{v}")?,
                        TemplateArgName::NullPtr => f.write_str("nullptr")?,
                        TemplateArgName::Expr(e) => write!(f, "{e:?}")?,
                        TemplateArgName::Other(kind) => write!(f, "<{kind}>")?,
                    }
                }
                f.write_str(">")
            }
            QualifiedName::Anonymous {
                parent,
                kind,
                ordinal,
            } => {
                if let Some(parent) = parent {
                    write!(f, "{parent}::")?;
                }
                write!(f, "(anonymous {} #{ordinal})", kind.describe())
            }
        }
    }
}

/// Identity of a record or enum type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeName {
    Symbol(String),
    Structured(QualifiedName),
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Symbol(s) => f.write_str(s),
            TypeName::Structured(q) => write!(f, "{q}"),
        }
    }
}

/// Identity of a function, variable or other object-level entity.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ObjectName {
    /// Host-mangled symbol.
    Mangled(String),
    /// Entities the host leaves unmangled.
    Plain(String),
    /// The one destructor identity of a type.
    Dtor(TypeName),
    EnumConst { owner: TypeName, name: String },
}

impl ObjectName {
    pub fn is_synthesized(&self) -> bool {
        matches!(self, ObjectName::Dtor(_) | ObjectName::EnumConst { .. })
    }

    /// Flat spelling; synthesized names carry [`SYNTH_PREFIX`].
    pub fn symbol(&self) -> String {
        match self {
            ObjectName::Mangled(s) | ObjectName::Plain(s) => s.clone(),
            ObjectName::Dtor(owner) => format!("{SYNTH_PREFIX}dtor({owner})"),
            ObjectName::EnumConst { owner, name } => {
                format!("{SYNTH_PREFIX}enum_const({owner},{name})")
            }
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol())
    }
}

/// Oracle for the host compiler's own mangling.
pub trait HostMangler {
    /// Symbol of a function, method, constructor, destructor or variable;
    /// `None` if the host cannot name it.
    fn mangle_decl(&self, unit: &TranslationUnit, decl: DeclId) -> Option<String>;

    /// Type encoding as used inside symbols; `None` for dependent types.
    fn mangle_type(&self, unit: &TranslationUnit, ty: TypeId) -> Option<String>;
}

/// Produces [`ObjectName`]s and [`TypeName`]s for one translation unit.
pub struct NameMangler<'a> {
    unit: &'a TranslationUnit,
    host: &'a dyn HostMangler,
    strategy: NamingStrategy,
}

impl<'a> NameMangler<'a> {
    pub fn new(
        unit: &'a TranslationUnit,
        host: &'a dyn HostMangler,
        strategy: NamingStrategy,
    ) -> Self {
        NameMangler {
            unit,
            host,
            strategy,
        }
    }

    pub fn strategy(&self) -> NamingStrategy {
        self.strategy
    }

    /// Identity of an object-level declaration.
    pub fn object_name(
        &self,
        id: DeclId,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ObjectName, LowerError> {
        let decl = self.unit.decl(id);
        match &decl.kind {
            DeclKind::EnumConstant(_) => {
                let owner = self.owner(id, "enum constant")?;
                Ok(ObjectName::EnumConst {
                    owner: self.type_name(owner, sink)?,
                    name: decl.name_str().to_owned(),
                })
            }
            DeclKind::Destructor(_) => {
                let owner = self.owner(id, "destructor")?;
                Ok(ObjectName::Dtor(self.type_name(owner, sink)?))
            }
            _ if decl.templated => Ok(ObjectName::Plain(self.template_path(id))),
            _ if !self.host_names(id) => Ok(ObjectName::Plain(decl.name_str().to_owned())),
            _ => match self.host.mangle_decl(self.unit, id) {
                Some(symbol) => Ok(ObjectName::Mangled(symbol)),
                None => {
                    tracing::warn!(name = decl.name_str(), "host cannot mangle declaration");
                    sink.report(
                        Diagnostic::unsupported(ErrorCode::W4008)
                            .with_message(format!(
                                "cannot mangle {} `{}`; using its plain name",
                                decl.kind.describe(),
                                decl.name_str()
                            ))
                            .at(decl.span),
                    );
                    Ok(ObjectName::Plain(decl.name_str().to_owned()))
                }
            },
        }
    }

    /// Identity of a record or enum declaration.
    pub fn type_name(
        &self,
        id: DeclId,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<TypeName, LowerError> {
        match self.strategy {
            NamingStrategy::Opaque => self.type_symbol(id, sink).map(TypeName::Symbol),
            NamingStrategy::Structured => {
                self.qualified_name(id, sink).map(TypeName::Structured)
            }
        }
    }

    /// Position of an anonymous entity among the preceding siblings of the
    /// same [`AnonKind`]. Siblings are counted in the semantic scope, so
    /// members of linkage blocks share one sequence with their neighbours.
    pub fn anonymous_ordinal(&self, id: DeclId) -> Result<u32, LowerError> {
        let decl = self.unit.decl(id);
        let kind = anon_kind(decl).ok_or_else(|| LowerError::Malformed {
            what: "anonymous declaration",
            detail: format!("{} `{}` is named", decl.kind.describe(), decl.name_str()),
            span: decl.span,
        })?;
        let scope = self.unit.semantic_parent(id);
        let mut ordinal = 0;
        for sibling in self.unit.semantic_children(scope) {
            if sibling == id {
                return Ok(ordinal);
            }
            if anon_kind(self.unit.decl(sibling)) == Some(kind) {
                ordinal += 1;
            }
        }
        Err(LowerError::AnonymousNotInScope {
            kind: kind.describe(),
            span: decl.span,
        })
    }

    /// `ns::S::f` spelling of a declaration, used for template patterns,
    /// which the host never mangles.
    pub fn source_path(&self, id: DeclId) -> String {
        let mut parts: SmallVec<[&str; 4]> = SmallVec::new();
        let mut cursor = Some(id);
        while let Some(d) = cursor {
            let decl = self.unit.decl(d);
            parts.push(if decl.is_anonymous() {
                "(anonymous)"
            } else {
                decl.name_str()
            });
            cursor = self.unit.semantic_parent(d);
        }
        parts.reverse();
        parts.join("::")
    }

    /// [`Self::source_path`] of a template pattern. Overloaded function
    /// templates of one scope are told apart by their position among the
    /// same-named patterns: `f`, `f#1`, `f#2`.
    fn template_path(&self, id: DeclId) -> String {
        let path = self.source_path(id);
        let decl = self.unit.decl(id);
        if !decl.is_function_like() {
            return path;
        }
        let overload = self
            .unit
            .semantic_children(self.unit.semantic_parent(id))
            .into_iter()
            .filter(|&sibling| {
                let s = self.unit.decl(sibling);
                s.templated && s.is_function_like() && s.name == decl.name
            })
            .position(|sibling| sibling == id);
        match overload {
            None | Some(0) => path,
            Some(n) => format!("{path}#{n}"),
        }
    }

    fn owner(&self, id: DeclId, what: &'static str) -> Result<DeclId, LowerError> {
        self.unit
            .semantic_parent(id)
            .ok_or_else(|| LowerError::MissingPart {
                what,
                part: "owning type",
                span: self.unit.decl(id).span,
            })
    }

    /// Whether the host would emit a mangled symbol for `id`.
    fn host_names(&self, id: DeclId) -> bool {
        let unit = self.unit;
        let decl = unit.decl(id);
        match &decl.kind {
            DeclKind::Function(f) => {
                let is_main = decl.name_str() == "main" && unit.semantic_parent(id).is_none();
                f.builtin.is_none() && !is_main && !unit.has_c_linkage(id)
            }
            DeclKind::Method(_) | DeclKind::Constructor(_) | DeclKind::Destructor(_) => true,
            DeclKind::Variable(v) => {
                if unit.in_function_scope(id) {
                    v.storage == StorageClass::Static
                } else {
                    unit.semantic_parent(id).is_some() && !unit.has_c_linkage(id)
                }
            }
            _ => false,
        }
    }
}

/// The anonymous kind of `decl`, if it is an anonymous namespace, record
/// or enum.
pub(crate) fn anon_kind(decl: &Decl) -> Option<AnonKind> {
    if !decl.is_anonymous() {
        return None;
    }
    match decl.kind {
        DeclKind::Namespace(_) => Some(AnonKind::Namespace),
        DeclKind::Record(_) => Some(AnonKind::Record),
        DeclKind::Enum(_) => Some(AnonKind::Enum),
        _ => None,
    }
}
