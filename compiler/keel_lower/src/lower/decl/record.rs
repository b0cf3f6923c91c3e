//! Structs, classes and unions: layout, members and the virtual table.

use keel_diagnostic::ErrorCode;
use keel_ir::{DeclId, DeclKind, RecordDecl, RecordDefinition, RecordLayout};
use keel_term::Term;

use super::{STRUCT, UNION};
use crate::lower::Lowerer;
use crate::{LowerError, Mode};

impl Lowerer<'_> {
    /// The record's own term followed by its member declarations (methods,
    /// constructors, nested types, static data).
    pub(super) fn lower_record(
        &mut self,
        id: DeclId,
        record: &RecordDecl,
    ) -> Result<Vec<Term>, LowerError> {
        let unit = self.unit;
        let mut out = Vec::new();
        match &record.definition {
            // Forward declarations are emitted in both modes.
            None => out.push(Term::ctor("Dtype", vec![self.type_name(id)?])),
            Some(def) => {
                if let Some(form) = self.form(id)? {
                    let name = self.type_name(id)?;
                    let (head, body) = if record.is_union() {
                        (UNION, self.union_body(id, def)?)
                    } else {
                        (STRUCT, self.struct_body(id, def)?)
                    };
                    out.push(form.build(head, vec![name, Term::some(body)]));
                }
            }
        }
        for &child in &unit.decl(id).children {
            match unit.decl(child).kind {
                DeclKind::Field(_) | DeclKind::IndirectField { .. } | DeclKind::TemplateParam(_) => {}
                _ => out.extend(self.lower_decl(child)?),
            }
        }
        Ok(out)
    }

    /// `Build_Struct [bases] [members] [vtable] [overrides] (Ndtor T)
    /// trivial del? layout size align`
    fn struct_body(&mut self, id: DeclId, def: &RecordDefinition) -> Result<Term, LowerError> {
        let bases = self.bases(id, def)?;
        let members = self.members(id, def.layout.as_ref())?;
        let (vtable, overrides) = self.virtuals(id)?;
        let dtor = Term::ctor("Ndtor", vec![self.type_name(id)?]);
        let delete = self.operator_delete(def)?;
        let class = Term::atom(if def.is_pod {
            "POD"
        } else if def.is_standard_layout {
            "Standard"
        } else {
            "Unspecified"
        });
        let (size, align) = size_align(def.layout.as_ref());
        Ok(Term::ctor(
            "Build_Struct",
            vec![
                Term::List(bases),
                Term::List(members),
                Term::List(vtable),
                Term::List(overrides),
                dtor,
                Term::bool(def.trivial_dtor),
                delete,
                class,
                size,
                align,
            ],
        ))
    }

    /// `Build_Union [members] (Ndtor T) trivial del? size align`
    fn union_body(&mut self, id: DeclId, def: &RecordDefinition) -> Result<Term, LowerError> {
        let members = self.members(id, def.layout.as_ref())?;
        let dtor = Term::ctor("Ndtor", vec![self.type_name(id)?]);
        let delete = self.operator_delete(def)?;
        let (size, align) = size_align(def.layout.as_ref());
        Ok(Term::ctor(
            "Build_Union",
            vec![
                Term::List(members),
                dtor,
                Term::bool(def.trivial_dtor),
                delete,
                size,
                align,
            ],
        ))
    }

    /// `[(base, Build_LayoutInfo offset)]`. Virtual bases are kept at
    /// offset 0 with a warning. Under `Generic` the base may be dependent,
    /// so it is printed as a type.
    fn bases(&mut self, id: DeclId, def: &RecordDefinition) -> Result<Vec<Term>, LowerError> {
        let unit = self.unit;
        let decl = unit.decl(id);
        let mut out = Vec::with_capacity(def.bases.len());
        for base in &def.bases {
            if base.is_virtual {
                self.report(
                    ErrorCode::W4003,
                    format!("virtual base of `{}` placed at offset 0", decl.name_str()),
                    decl.span,
                );
            }
            let entry = if self.config.mode == Mode::Generic {
                (self.lower_type(base.ty)?, 0)
            } else {
                let record = unit.record_of(base.ty).ok_or_else(|| LowerError::NonRecordBase {
                    record: decl.name_str().to_owned(),
                    span: decl.span,
                })?;
                let offset = if base.is_virtual {
                    0
                } else {
                    def.layout
                        .as_ref()
                        .and_then(|l| l.base_offset(record))
                        .unwrap_or(0)
                };
                (self.type_name(record)?, offset)
            };
            let (name, offset) = entry;
            out.push(Term::pair(name, layout_info(offset)));
        }
        Ok(out)
    }

    /// `[mkMember name ty mutable init? (Build_LayoutInfo offset)]` in
    /// declaration order. Bit-fields are fatal.
    fn members(
        &mut self,
        id: DeclId,
        layout: Option<&RecordLayout>,
    ) -> Result<Vec<Term>, LowerError> {
        let unit = self.unit;
        let mut out = Vec::new();
        for &child in &unit.decl(id).children {
            let decl = unit.decl(child);
            let DeclKind::Field(field) = &decl.kind else {
                continue;
            };
            if field.bit_width.is_some() {
                return Err(LowerError::BitField {
                    field: decl.name_str().to_owned(),
                    span: decl.span,
                });
            }
            let name = self.member_name(child)?;
            let ty = self.lower_type(field.ty)?;
            let init = self.lower_opt_full_expr(field.init)?;
            let offset = layout.and_then(|l| l.field_offset(child)).unwrap_or(0);
            out.push(Term::ctor(
                "mkMember",
                vec![
                    name,
                    ty,
                    Term::bool(field.mutable),
                    Term::option(init),
                    layout_info(offset),
                ],
            ));
        }
        Ok(out)
    }

    /// Virtual table entries and override edges `(overridden, overrider)`.
    fn virtuals(&mut self, id: DeclId) -> Result<(Vec<Term>, Vec<Term>), LowerError> {
        let unit = self.unit;
        let mut vtable = Vec::new();
        let mut overrides = Vec::new();
        for &child in &unit.decl(id).children {
            let (is_virtual, is_pure, overridden): (bool, bool, &[DeclId]) =
                match &unit.decl(child).kind {
                    DeclKind::Method(m) => (m.is_virtual, m.is_pure, &m.overrides),
                    DeclKind::Destructor(d) => (d.is_virtual, d.is_pure, &[]),
                    _ => continue,
                };
            if !is_virtual {
                continue;
            }
            let name = self.object_name(child)?;
            if is_pure {
                vtable.push(Term::ctor("Pure_virtual", vec![name]));
                continue;
            }
            for &base in overridden {
                overrides.push(Term::pair(self.object_name(base)?, name.clone()));
            }
            vtable.push(Term::ctor("Impl_virtual", vec![name]));
        }
        Ok((vtable, overrides))
    }

    fn operator_delete(&mut self, def: &RecordDefinition) -> Result<Term, LowerError> {
        let delete = match def.operator_delete {
            Some(f) => Some(self.object_name(f)?),
            None => None,
        };
        Ok(Term::option(delete))
    }
}

fn layout_info(offset: u64) -> Term {
    Term::ctor("Build_LayoutInfo", vec![Term::nat(offset)])
}

/// Size and alignment; 0 when the layout is unknown.
fn size_align(layout: Option<&RecordLayout>) -> (Term, Term) {
    let (size, align) = layout.map_or((0, 0), |l| (l.size, l.align));
    (Term::nat(size), Term::nat(align))
}
