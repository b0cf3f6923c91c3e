use pretty_assertions::assert_eq;

use keel_diagnostic::ErrorCode;
use keel_ir::{
    BaseSpec, CallConv, CtorDecl, CtorInit, DeclId, DeclKind, DtorDecl, EnumConstantDecl,
    EnumDecl, Expr, ExprKind, FieldDecl, InitTarget, Language, MethodDecl, Qualifiers,
    Specialization, StmtKind, StorageClass, TagKind, TemplateArg, TemplateParamDecl,
    TemplateParamKind, TypeId, TypeKind, VarDecl,
};

use crate::test_helpers::{base, codes, definition, layout, Fixture, INT};
use crate::LowerError;

fn method(fx: &mut Fixture, record: DeclId, name: &str, is_virtual: bool, is_pure: bool) -> DeclId {
    fx.decl(
        Some(record),
        name,
        DeclKind::Method(MethodDecl {
            func: keel_ir::FunctionDecl::new(TypeId::VOID, Vec::new()),
            is_static: false,
            is_virtual,
            is_pure,
            quals: Qualifiers::NONE,
            overrides: Vec::new(),
        }),
    )
}

fn enum_decl(fx: &mut Fixture, name: &str, underlying: TypeId) -> DeclId {
    fx.decl(
        None,
        name,
        DeclKind::Enum(EnumDecl {
            underlying: Some(underlying),
            scoped: false,
        }),
    )
}

/// `template <class T> T id(T x);` and its pattern.
fn function_template(fx: &mut Fixture) -> DeclId {
    let t = fx.unit.intern(TypeKind::TemplateParam {
        name: "T".into(),
        depth: 0,
        index: 0,
    });
    let f = fx.function(None, "id", t);
    fx.unit.decl_mut(f).templated = true;
    let param = fx.decl(
        Some(f),
        "T",
        DeclKind::TemplateParam(TemplateParamDecl {
            kind: TemplateParamKind::Type,
            depth: 0,
            index: 0,
        }),
    );
    fx.unit.decl_mut(f).template_params = vec![param];
    fx.param(f, "x", t);
    f
}

/// `id<int>`, instantiated from `pattern` with `args`.
fn instance(fx: &mut Fixture, pattern: DeclId, args: Vec<TemplateArg>) -> DeclId {
    let f = fx.function(None, "id", TypeId::INT);
    fx.param(f, "x", TypeId::INT);
    if let DeclKind::Function(func) = &mut fx.unit.decl_mut(f).kind {
        func.specialization = Some(Specialization { pattern, args });
    }
    f
}

// Records

#[test]
fn struct_layout_lists_bases_and_members_with_offsets() {
    let mut fx = Fixture::new();
    let a = fx.record(None, "A");
    let b = fx.record(None, "B");
    let d = fx.record(None, "D");
    let x = fx.field(d, "x", TypeId::INT);
    let a_ty = fx.unit.record_type(a);
    let b_ty = fx.unit.record_type(b);
    {
        let def = fx.definition_mut(d);
        def.bases = vec![base(a_ty), base(b_ty)];
        def.is_pod = false;
        let mut l = layout(16, 8);
        l.base_offsets = vec![(a, 0), (b, 8)];
        l.field_offsets = vec![(x, 12)];
        def.layout = Some(l);
    }

    let (terms, diags) = fx.lower_decl(d);
    let bases = "((\"_Z1A\", (Build_LayoutInfo 0%N)) :: (\"_Z1B\", (Build_LayoutInfo 8%N)) :: nil)";
    let members = format!("((mkMember \"x\" {INT} false None (Build_LayoutInfo 12%N)) :: nil)");
    assert_eq!(
        terms,
        vec![format!(
            "(Dstruct \"_Z1D\" (Some (Build_Struct {bases} {members} nil nil (Ndtor \"_Z1D\") \
             true None Standard 16%N 8%N)))"
        )]
    );
    assert!(diags.is_empty());
}

#[test]
fn virtual_base_is_placed_at_offset_zero_with_warning() {
    let mut fx = Fixture::new();
    let b = fx.record(None, "B");
    let d = fx.record(None, "D");
    let b_ty = fx.unit.record_type(b);
    {
        let def = fx.definition_mut(d);
        def.bases = vec![BaseSpec {
            ty: b_ty,
            is_virtual: true,
        }];
        let mut l = layout(16, 8);
        l.base_offsets = vec![(b, 8)];
        def.layout = Some(l);
    }

    let (terms, diags) = fx.lower_decl(d);
    assert!(terms[0].contains("((\"_Z1B\", (Build_LayoutInfo 0%N)) :: nil)"));
    assert_eq!(codes(&diags), vec![ErrorCode::W4003]);
}

#[test]
fn base_that_is_not_a_record_is_fatal() {
    let mut fx = Fixture::new();
    let d = fx.record(None, "D");
    fx.definition_mut(d).bases = vec![base(TypeId::INT)];

    let err = fx.try_lower_decl(d).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2002);
}

#[test]
fn bit_field_is_fatal() {
    let mut fx = Fixture::new();
    let s = fx.record(None, "S");
    fx.decl(
        Some(s),
        "flags",
        DeclKind::Field(FieldDecl {
            ty: TypeId::UINT,
            mutable: false,
            bit_width: Some(3),
            init: None,
        }),
    );

    let err = fx.try_lower_decl(s).unwrap_err();
    assert!(matches!(err, LowerError::BitField { ref field, .. } if field == "flags"));
    assert_eq!(err.code(), ErrorCode::E2001);
}

#[test]
fn union_has_members_and_size() {
    let mut fx = Fixture::new();
    let u = fx.record_with(None, "U", TagKind::Union, Some(definition()));
    let i = fx.field(u, "i", TypeId::INT);
    let mut l = layout(4, 4);
    l.field_offsets = vec![(i, 0)];
    fx.definition_mut(u).layout = Some(l);

    assert_eq!(
        fx.lower_decl(u).0,
        vec![format!(
            "(Dunion \"_Z1U\" (Some (Build_Union ((mkMember \"i\" {INT} false None \
             (Build_LayoutInfo 0%N)) :: nil) (Ndtor \"_Z1U\") true None 4%N 4%N)))"
        )]
    );
}

#[test]
fn incomplete_record_is_a_type_in_both_modes() {
    for mut fx in [Fixture::new(), Fixture::generic()] {
        let s = fx.record_with(None, "S", TagKind::Struct, None);
        assert_eq!(fx.lower_decl(s).0, vec!["(Dtype \"_Z1S\")".to_owned()]);
    }
}

#[test]
fn virtual_table_and_overrides() {
    let mut fx = Fixture::new();
    let b = fx.record(None, "B");
    let bm = method(&mut fx, b, "bm", true, false);
    let d = fx.record(None, "D");
    let m = method(&mut fx, d, "m", true, false);
    method(&mut fx, d, "p", true, true);
    if let DeclKind::Method(mm) = &mut fx.unit.decl_mut(m).kind {
        mm.overrides = vec![bm];
    }

    let (terms, _) = fx.lower_decl(d);
    assert_eq!(terms.len(), 3, "struct followed by its two methods");
    assert!(terms[0].contains(
        "((Impl_virtual \"_ZN1D1mEv\") :: (Pure_virtual \"_ZN1D1pEv\") :: nil) \
         ((\"_ZN1B2bmEv\", \"_ZN1D1mEv\") :: nil)"
    ));
    assert_eq!(
        terms[1],
        "(Dmethod false \"_ZN1D1mEv\" (Build_Method Tvoid \"_Z1D\" QM nil CC_C Ar_Definite None))"
    );
}

// Functions

#[test]
fn function_body_lowers_statements() {
    let mut fx = Fixture::new();
    let main = fx.function(None, "main", TypeId::INT);
    let one = fx.int(1);
    let x = fx.decl(
        Some(main),
        "x",
        DeclKind::Variable(VarDecl {
            ty: TypeId::INT,
            init: Some(one),
            storage: StorageClass::Auto,
        }),
    );
    let decl = fx.stmt(StmtKind::Decl(vec![x]));
    let cond = fx.expr(Expr::prvalue(ExprKind::BoolLit(true), TypeId::BOOL));
    let x_ref = fx.decl_ref(x, TypeId::INT);
    let ret_x = fx.stmt(StmtKind::Return(Some(x_ref)));
    let branch = fx.stmt(StmtKind::If {
        cond_var: None,
        cond,
        then_branch: ret_x,
        else_branch: None,
    });
    let zero = fx.int(0);
    let ret_0 = fx.stmt(StmtKind::Return(Some(zero)));
    let body = fx.stmt(StmtKind::Compound(vec![decl, branch, ret_0]));
    fx.set_body(main, body);

    let s_decl = format!("(Sdecl ((Dvar \"x\" {INT} (Some (Eint 1%Z {INT}))) :: nil))");
    let s_if = format!(
        "(Sif None (Ebool true) (Sreturn (Some (Evar (Lname \"x\") {INT}))) (Sseq nil))"
    );
    let s_ret = format!("(Sreturn (Some (Eint 0%Z {INT})))");
    assert_eq!(
        fx.lower_decl(main).0,
        vec![format!(
            "(Dfunction \"main\" (Build_Func {INT} nil CC_C Ar_Definite \
             (Some (Impl (Sseq ({s_decl} :: {s_if} :: {s_ret} :: nil))))))"
        )]
    );
}

#[test]
fn switch_labels_and_unsupported_statements() {
    let mut fx = Fixture::new();
    let f = fx.function(None, "f", TypeId::VOID);
    let case_1 = fx.stmt(StmtKind::Case { lo: 1, hi: None });
    let brk = fx.stmt(StmtKind::Break);
    let case_range = fx.stmt(StmtKind::Case { lo: 2, hi: Some(4) });
    let dflt = fx.stmt(StmtKind::Default);
    let goto = fx.stmt(StmtKind::Goto("out".into()));
    let cases = fx.stmt(StmtKind::Compound(vec![case_1, brk, case_range, dflt, goto]));
    let scrutinee = fx.int(1);
    let switch = fx.stmt(StmtKind::Switch {
        cond_var: None,
        cond: scrutinee,
        body: cases,
    });
    let null = fx.stmt(StmtKind::Null);
    let label = fx.stmt(StmtKind::Label {
        name: "out".into(),
        body: null,
    });
    let asm = fx.stmt(StmtKind::Unsupported("asm".into()));
    let body = fx.stmt(StmtKind::Compound(vec![switch, label, asm]));
    fx.set_body(f, body);

    let (terms, diags) = fx.lower_decl(f);
    let s_switch = format!(
        "(Sswitch None (Eint 1%Z {INT}) (Sseq ((Scase (Exact 1%Z)) :: Sbreak :: \
         (Scase (Range 2%Z 4%Z)) :: Sdefault :: (Sgoto \"out\") :: nil)))"
    );
    assert_eq!(
        terms,
        vec![format!(
            "(Dfunction \"_Z1fv\" (Build_Func Tvoid nil CC_C Ar_Definite (Some (Impl (Sseq \
             ({s_switch} :: (Slabeled \"out\" (Sseq nil)) :: (Sunsupported \"asm\") :: nil))))))"
        )]
    );
    assert_eq!(codes(&diags), vec![ErrorCode::W4001]);
}

#[test]
fn constructor_initializers_follow_initialization_order() {
    let mut fx = Fixture::new();
    let b = fx.record(None, "B");
    let b_ty = fx.unit.record_type(b);
    let s = fx.record(None, "S");
    fx.definition_mut(s).bases = vec![base(b_ty)];
    fx.field(s, "a", TypeId::INT);
    let f_b = fx.field(s, "b", TypeId::INT);
    let seven = fx.int(7);
    fx.decl(
        Some(s),
        "c",
        DeclKind::Field(FieldDecl {
            ty: TypeId::INT,
            mutable: false,
            bit_width: None,
            init: Some(seven),
        }),
    );
    let five = fx.int(5);
    let ctor = fx.decl(
        Some(s),
        "S",
        DeclKind::Constructor(CtorDecl {
            params: Vec::new(),
            cc: CallConv::C,
            variadic: false,
            inits: vec![CtorInit {
                target: InitTarget::Field(f_b),
                init: five,
            }],
            body: None,
            defaulted: false,
            instantiated_from: None,
        }),
    );
    let body = fx.stmt(StmtKind::Compound(Vec::new()));
    fx.set_body(ctor, body);

    let inits = [
        "(Build_Initializer (InitBase \"_Z1B\") (Tnamed \"_Z1B\") (Edefault_init (Tnamed \"_Z1B\")))"
            .to_owned(),
        format!("(Build_Initializer (InitField \"a\") {INT} (Edefault_init {INT}))"),
        format!("(Build_Initializer (InitField \"b\") {INT} (Eint 5%Z {INT}))"),
        format!("(Build_Initializer (InitField \"c\") {INT} (Edefault_init_expr (Eint 7%Z {INT})))"),
    ]
    .join(" :: ");
    assert_eq!(
        fx.lower_decl(ctor).0,
        vec![format!(
            "(Dconstructor \"_ZN1SC1Ev\" (Build_Ctor \"_Z1S\" nil CC_C Ar_Definite \
             (Some (UserDefined (({inits} :: nil), (Sseq nil))))))"
        )]
    );
}

#[test]
fn destructor_is_named_after_its_type() {
    let mut fx = Fixture::new();
    let s = fx.record(None, "S");
    let dtor = fx.decl(
        Some(s),
        "~S",
        DeclKind::Destructor(DtorDecl {
            cc: CallConv::C,
            body: None,
            defaulted: true,
            is_virtual: false,
            is_pure: false,
            instantiated_from: None,
        }),
    );

    assert_eq!(
        fx.lower_decl(dtor).0,
        vec!["(Ddestructor (Ndtor \"_Z1S\") (Build_Dtor \"_Z1S\" CC_C (Some Defaulted)))".to_owned()]
    );
}

#[test]
fn builtin_functions_name_their_builtin() {
    let mut fx = Fixture::new();
    let builtin = |fx: &mut Fixture, name: &str| {
        let f = fx.function(None, name, TypeId::VOID);
        if let DeclKind::Function(func) = &mut fx.unit.decl_mut(f).kind {
            func.builtin = Some(name.to_owned());
        }
        f
    };
    let memset = builtin(&mut fx, "__builtin_memset");
    let unknown = builtin(&mut fx, "__builtin_frobnicate");

    assert_eq!(
        fx.lower_decl(memset).0,
        vec![
            "(Dfunction \"__builtin_memset\" (Build_Func Tvoid nil CC_C Ar_Definite \
             (Some (Builtin Bin_memset))))"
                .to_owned()
        ]
    );
    assert!(fx.lower_decl(unknown).0[0]
        .ends_with("(Some (Builtin (Bin_unknown \"__builtin_frobnicate\")))))"));
}

// Templates

#[test]
fn templated_function_is_emitted_only_in_generic_mode() {
    let mut generic = Fixture::generic();
    let f = function_template(&mut generic);
    assert_eq!(
        generic.lower_decl(f).0,
        vec![
            "(Dfunction_template ((TypeParam \"T\") :: nil) \"id\" (Build_Func (Tparam \"T\") \
             ((\"x\", (Tparam \"T\")) :: nil) CC_C Ar_Definite None))"
                .to_owned()
        ]
    );

    let mut concrete = Fixture::new();
    let f = function_template(&mut concrete);
    assert!(concrete.lower_decl(f).0.is_empty());
}

#[test]
fn plain_function_is_emitted_only_in_concrete_mode() {
    let mut generic = Fixture::generic();
    let g = generic.function(None, "g", TypeId::VOID);
    assert!(generic.lower_decl(g).0.is_empty());

    let mut concrete = Fixture::new();
    let g = concrete.function(None, "g", TypeId::VOID);
    assert_eq!(
        concrete.lower_decl(g).0,
        vec!["(Dfunction \"_Z1gv\" (Build_Func Tvoid nil CC_C Ar_Definite None))".to_owned()]
    );
}

#[test]
fn instantiation_records_link_instance_to_pattern() {
    let mut fx = Fixture::generic();
    let pattern = function_template(&mut fx);
    let inst = instance(&mut fx, pattern, vec![TemplateArg::Type(TypeId::INT)]);

    assert_eq!(
        fx.lower_decl(inst).0,
        vec![format!("(Dinstantiation \"_Z2idIiEii\" \"id\" ((TypeArg {INT}) :: nil))")]
    );
}

/// `S()` and `~S()` of `owner`, optionally linked to their patterns.
fn special_members(
    fx: &mut Fixture,
    owner: DeclId,
    from: Option<(DeclId, DeclId)>,
) -> (DeclId, DeclId) {
    let ctor = fx.decl(
        Some(owner),
        "S",
        DeclKind::Constructor(CtorDecl {
            params: Vec::new(),
            cc: CallConv::C,
            variadic: false,
            inits: Vec::new(),
            body: None,
            defaulted: false,
            instantiated_from: from.map(|(c, _)| c),
        }),
    );
    let dtor = fx.decl(
        Some(owner),
        "~S",
        DeclKind::Destructor(DtorDecl {
            cc: CallConv::C,
            body: None,
            defaulted: false,
            is_virtual: false,
            is_pure: false,
            instantiated_from: from.map(|(_, d)| d),
        }),
    );
    (ctor, dtor)
}

#[test]
fn special_members_of_class_specializations_record_their_instantiation() {
    let mut fx = Fixture::generic();
    let pattern = fx.record(None, "S");
    fx.unit.decl_mut(pattern).templated = true;
    let pattern_members = special_members(&mut fx, pattern, None);

    let spec = fx.record(None, "S");
    if let DeclKind::Record(r) = &mut fx.unit.decl_mut(spec).kind {
        r.specialization = Some(Specialization {
            pattern,
            args: vec![TemplateArg::Type(TypeId::INT)],
        });
    }
    let (ctor, dtor) = special_members(&mut fx, spec, Some(pattern_members));

    let args = format!("((TypeArg {INT}) :: nil)");
    assert_eq!(
        fx.lower_decl(ctor).0,
        vec![format!("(Dinstantiation \"_ZN1SIiEC1Ev\" \"S::S\" {args})")]
    );
    assert_eq!(
        fx.lower_decl(dtor).0,
        vec![format!("(Dinstantiation (Ndtor \"_Z1SIiE\") (Ndtor \"_Z1S\") {args})")]
    );

    let mut concrete = Fixture::new();
    concrete.unit = fx.unit.clone();
    assert!(concrete
        .lower_decl(ctor)
        .0
        .iter()
        .all(|term| !term.starts_with("(Dinstantiation")));
}

#[test]
fn instantiation_body_is_emitted_in_concrete_mode() {
    let mut fx = Fixture::new();
    let pattern = function_template(&mut fx);
    let inst = instance(&mut fx, pattern, vec![TemplateArg::Type(TypeId::INT)]);

    let (terms, _) = fx.lower_decl(inst);
    assert_eq!(terms.len(), 1);
    assert!(terms[0].starts_with("(Dfunction \"_Z2idIiEii\""));
}

#[test]
fn non_type_instantiation_argument_is_fatal() {
    let mut fx = Fixture::generic();
    let pattern = function_template(&mut fx);
    let inst = instance(
        &mut fx,
        pattern,
        vec![TemplateArg::Integral {
            value: 3,
            ty: TypeId::INT,
        }],
    );

    let err = fx.try_lower_decl(inst).unwrap_err();
    assert_eq!(
        err,
        LowerError::NonTypeInstantiationArg {
            name: "id".into(),
            kind: "integral",
            span: keel_ir::Span::DUMMY,
        }
    );
    assert_eq!(err.code(), ErrorCode::E2003);
}

// Enums and scopes

#[test]
fn enum_is_followed_by_its_constants() {
    let mut fx = Fixture::new();
    let e = enum_decl(&mut fx, "E", TypeId::INT);
    let e_ty = fx.unit.enum_type(e);
    fx.decl(
        Some(e),
        "Neg",
        DeclKind::EnumConstant(EnumConstantDecl {
            ty: e_ty,
            value: -1,
            init: None,
        }),
    );

    assert_eq!(
        fx.lower_decl(e).0,
        vec![
            format!("(Denum \"_Z1E\" {INT} (\"Neg\" :: nil))"),
            format!(
                "(Denum_constant (Nenum_const \"_Z1E\" \"Neg\") (Tenum \"_Z1E\") {INT} \
                 (inr (-1)%Z) None)"
            ),
        ]
    );
}

#[test]
fn character_enum_constants_are_masked_naturals() {
    let mut fx = Fixture::generic();
    let e = enum_decl(&mut fx, "C", TypeId::CHAR);
    let e_ty = fx.unit.enum_type(e);
    let m = fx.decl(
        Some(e),
        "M",
        DeclKind::EnumConstant(EnumConstantDecl {
            ty: e_ty,
            value: -1,
            init: None,
        }),
    );

    assert_eq!(
        fx.lower_decl(m).0,
        vec![
            "(Denum_constant (Nenum_const \"_Z1C\" \"M\") (Tenum \"_Z1C\") (Tchar_ Cchar) \
             (inl 255%N) None)"
                .to_owned()
        ]
    );
}

#[test]
fn namespace_sees_through_linkage_blocks() {
    let mut fx = Fixture::new();
    let ns = fx.namespace(None, "ns");
    let c = fx.decl(Some(ns), "", DeclKind::LinkageSpec(Language::C));
    fx.var(Some(c), "v", TypeId::INT);

    assert_eq!(
        fx.lower_decl(ns).0,
        vec![format!("(Dnamespace ((Dvariable \"v\" {INT} None) :: nil))")]
    );
}

#[test]
fn unit_flattens_top_level_linkage_blocks() {
    let mut fx = Fixture::new();
    let c = fx.decl(None, "", DeclKind::LinkageSpec(Language::C));
    fx.var(Some(c), "v", TypeId::INT);
    fx.var(None, "w", TypeId::INT);

    assert_eq!(
        fx.lower_unit().0,
        vec![
            format!("(Dvariable \"v\" {INT} None)"),
            format!("(Dvariable \"w\" {INT} None)"),
        ]
    );
    assert_eq!(fx.try_lower_decl(c).unwrap_err().code(), ErrorCode::E2004);
}

#[test]
fn static_assert_keeps_its_message() {
    let mut fx = Fixture::new();
    let cond = fx.expr(Expr::prvalue(ExprKind::BoolLit(true), TypeId::BOOL));
    let sa = fx.decl(
        None,
        "",
        DeclKind::StaticAssert {
            cond,
            message: Some("ok".into()),
        },
    );

    assert_eq!(
        fx.lower_decl(sa).0,
        vec!["(Dstatic_assert (Some \"ok\") (Ebool true))".to_owned()]
    );
}

#[test]
fn typedefs_are_emitted_only_when_configured() {
    let mut fx = Fixture::new();
    let td = fx.decl(
        None,
        "word",
        DeclKind::Typedef {
            underlying: TypeId::UINT,
        },
    );
    assert!(fx.lower_decl(td).0.is_empty());

    fx.config.emit_typedefs = true;
    assert_eq!(
        fx.lower_decl(td).0,
        vec!["(Dtypedef \"_Z4word\" (Tnum W32 Unsigned))".to_owned()]
    );
}
