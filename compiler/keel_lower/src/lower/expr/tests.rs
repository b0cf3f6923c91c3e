use pretty_assertions::assert_eq;

use keel_diagnostic::ErrorCode;
use keel_ir::{
    BinaryOp, CastKind, CastStyle, DeclId, DeclKind, EnumConstantDecl, EnumDecl, Expr, ExprId,
    ExprKind, FunctionDecl, MethodDecl, Qualifiers, TypeId, TypeKind, UnaryOp, ValueCategory,
};

use crate::test_helpers::{codes, Fixture, INT};
use crate::LowerError;

fn cast(fx: &mut Fixture, kind: CastKind, style: CastStyle, operand: ExprId, ty: TypeId) -> ExprId {
    fx.expr(Expr::prvalue(
        ExprKind::Cast {
            kind,
            style,
            operand,
            conversion: None,
            path: Vec::new(),
        },
        ty,
    ))
}

fn method(fx: &mut Fixture, record: DeclId, name: &str, is_virtual: bool) -> DeclId {
    fx.decl(
        Some(record),
        name,
        DeclKind::Method(MethodDecl {
            func: FunctionDecl::new(TypeId::VOID, Vec::new()),
            is_static: false,
            is_virtual,
            is_pure: false,
            quals: Qualifiers::NONE,
            overrides: Vec::new(),
        }),
    )
}

// Literals

#[test]
fn integer_literal_bits_follow_type_signedness() {
    let mut fx = Fixture::new();
    let signed = fx.expr(Expr::prvalue(ExprKind::IntegerLit(0xffff_ffff), TypeId::INT));
    let unsigned = fx.expr(Expr::prvalue(ExprKind::IntegerLit(0xffff_ffff), TypeId::UINT));

    assert_eq!(fx.lower_expr(signed).0, format!("(Eint (-1)%Z {INT})"));
    assert_eq!(
        fx.lower_expr(unsigned).0,
        "(Eint 4294967295%Z (Tnum W32 Unsigned))"
    );
}

#[test]
fn float_literal_is_a_placeholder_with_warning() {
    let mut fx = Fixture::new();
    let e = fx.expr(Expr::prvalue(ExprKind::FloatLit("1.5".into()), TypeId::DOUBLE));

    let (term, diags) = fx.lower_expr(e);
    assert_eq!(term, "(Eunsupported \"float: 1.5\" Prvalue (Tfloat_ Fdouble))");
    assert_eq!(codes(&diags), vec![ErrorCode::W4001]);
}

#[test]
fn string_literal_lists_code_units() {
    let mut fx = Fixture::new();
    let ty = fx.unit.intern(TypeKind::Array {
        elem: TypeId::CHAR,
        len: 3,
    });
    let e = fx.expr(Expr::lvalue(
        ExprKind::StringLit {
            bytes: b"hi".to_vec(),
            char_width: 1,
        },
        ty,
    ));

    assert_eq!(
        fx.lower_expr(e).0,
        "(Estring (104%N :: 105%N :: nil) (Tchar_ Cchar))"
    );
}

#[test]
fn lambda_is_a_placeholder_with_warning() {
    let mut fx = Fixture::new();
    let e = fx.expr(Expr::prvalue(ExprKind::Lambda, TypeId::INT));

    let (term, diags) = fx.lower_expr(e);
    assert_eq!(term, format!("(Eunsupported \"lambda\" Prvalue {INT})"));
    assert_eq!(codes(&diags), vec![ErrorCode::W4001]);
}

// Operators

#[test]
fn compound_assignment_evaluates_target_once() {
    let mut fx = Fixture::new();
    let arr_ty = fx.unit.intern(TypeKind::Array {
        elem: TypeId::INT,
        len: 4,
    });
    let fn_ty = fx.unit.function_type(TypeId::INT, Vec::new());
    let arr = fx.var(None, "arr", arr_ty);
    let f = fx.function(None, "f", TypeId::INT);

    let arr_ref = fx.decl_ref(arr, arr_ty);
    let f_ref = fx.decl_ref(f, fn_ty);
    let call = fx.expr(Expr::prvalue(
        ExprKind::Call {
            callee: f_ref,
            args: Vec::new(),
        },
        TypeId::INT,
    ));
    let elem = fx.expr(Expr::lvalue(
        ExprKind::Subscript {
            base: arr_ref,
            index: call,
        },
        TypeId::INT,
    ));
    let one = fx.int(1);
    let e = fx.expr(Expr::lvalue(
        ExprKind::CompoundAssign {
            op: BinaryOp::Add,
            lhs: elem,
            rhs: one,
        },
        TypeId::INT,
    ));

    let (term, diags) = fx.lower_expr(e);
    let f_term = format!("(Evar (Gname \"_Z1fv\") (Tfunction CC_C Ar_Definite {INT} nil))");
    let target = format!(
        "(Esubscript (Evar (Gname \"arr\") (Tarray {INT} 4%N)) (Ecall {f_term} nil {INT}) {INT})"
    );
    assert_eq!(
        term,
        format!("(Eassign_op Badd {target} (Eint 1%Z {INT}) {INT})")
    );
    assert_eq!(term.matches("_Z1fv").count(), 1);
    assert!(diags.is_empty());
}

#[test]
fn logical_operators_carry_no_type() {
    let mut fx = Fixture::new();
    let l = fx.expr(Expr::prvalue(ExprKind::BoolLit(true), TypeId::BOOL));
    let r = fx.expr(Expr::prvalue(ExprKind::BoolLit(false), TypeId::BOOL));
    let e = fx.expr(Expr::prvalue(
        ExprKind::Binary {
            op: BinaryOp::LAnd,
            lhs: l,
            rhs: r,
        },
        TypeId::BOOL,
    ));

    assert_eq!(fx.lower_expr(e).0, "(Eseqand (Ebool true) (Ebool false))");
}

// Casts

#[test]
fn implicit_cast_lowers_to_its_kind() {
    let mut fx = Fixture::new();
    let h = fx.function(None, "h", TypeId::VOID);
    let x = fx.var(Some(h), "x", TypeId::INT);
    let x_ref = fx.decl_ref(x, TypeId::INT);
    let e = cast(&mut fx, CastKind::LValueToRValue, CastStyle::Implicit, x_ref, TypeId::INT);

    assert_eq!(
        fx.lower_expr(e).0,
        format!("(Ecast Cl2r (Evar (Lname \"x\") {INT}) Prvalue {INT})")
    );
}

#[test]
fn static_cast_keeps_its_spelling() {
    let mut fx = Fixture::new();
    let one = fx.int(1);
    let e = cast(&mut fx, CastKind::IntegralCast, CastStyle::Static, one, TypeId::LONG);

    assert_eq!(
        fx.lower_expr(e).0,
        format!("(Ecast (Cstatic Cintegral) (Eint 1%Z {INT}) Prvalue (Tnum W64 Signed))")
    );
}

#[test]
fn dynamic_cast_is_always_checked() {
    let mut fx = Fixture::new();
    let base = fx.record(None, "B");
    let derived = fx.record(None, "D");
    let b_ptr = {
        let b_ty = fx.unit.record_type(base);
        fx.unit.pointer_to(b_ty)
    };
    let d_ptr = {
        let d_ty = fx.unit.record_type(derived);
        fx.unit.pointer_to(d_ty)
    };
    let h = fx.function(None, "h", TypeId::VOID);
    let d = fx.var(Some(h), "d", d_ptr);
    let d_ref = fx.decl_ref(d, d_ptr);
    // An upcast the front end resolved statically still prints as checked.
    let e = cast(&mut fx, CastKind::NoOp, CastStyle::Dynamic, d_ref, b_ptr);

    let from = "(Tptr (Tnamed \"_Z1D\"))";
    let to = "(Tptr (Tnamed \"_Z1B\"))";
    assert_eq!(
        fx.lower_expr(e).0,
        format!("(Ecast (Cdynamic {from} {to}) (Evar (Lname \"d\") {from}) Prvalue {to})")
    );
}

#[test]
fn unsupported_cast_kind_is_a_placeholder() {
    let mut fx = Fixture::new();
    let one = fx.int(1);
    let e = cast(
        &mut fx,
        CastKind::IntegralToFloating,
        CastStyle::Implicit,
        one,
        TypeId::DOUBLE,
    );

    let (term, diags) = fx.lower_expr(e);
    assert_eq!(
        term,
        "(Eunsupported \"IntegralToFloating cast\" Prvalue (Tfloat_ Fdouble))"
    );
    assert_eq!(codes(&diags), vec![ErrorCode::W4002]);
}

// Names

#[test]
fn enum_constant_reference_depends_on_type() {
    let mut fx = Fixture::new();
    let e = fx.decl(
        None,
        "E",
        DeclKind::Enum(EnumDecl {
            underlying: Some(TypeId::INT),
            scoped: false,
        }),
    );
    let enum_ty = fx.unit.enum_type(e);
    let a = fx.decl(
        Some(e),
        "A",
        DeclKind::EnumConstant(EnumConstantDecl {
            ty: enum_ty,
            value: 1,
            init: None,
        }),
    );
    let at_enum = fx.expr(Expr::prvalue(ExprKind::DeclRef { decl: a }, enum_ty));
    let at_int = fx.expr(Expr::prvalue(ExprKind::DeclRef { decl: a }, TypeId::INT));

    let name = "(Nenum_const \"_Z1E\" \"A\")";
    assert_eq!(
        fx.lower_expr(at_enum).0,
        format!("(Econst_ref (Gname {name}) (Tenum \"_Z1E\"))")
    );
    assert_eq!(
        fx.lower_expr(at_int).0,
        format!("(Eenum_const_at {name} (Tenum \"_Z1E\") {INT})")
    );
}

#[test]
fn reference_variables_are_read_through() {
    let mut fx = Fixture::new();
    let int_ref = fx.unit.lvalue_ref_to(TypeId::INT);
    let h = fx.function(None, "h", TypeId::VOID);
    let r = fx.var(Some(h), "r", int_ref);
    let e = fx.decl_ref(r, TypeId::INT);

    assert_eq!(
        fx.lower_expr(e).0,
        format!("(Eread_ref (Evar (Lname \"r\") (Tref {INT})))")
    );
}

// Members and calls

#[test]
fn field_access_through_pointer_dereferences() {
    let mut fx = Fixture::new();
    let s = fx.record(None, "S");
    let x = fx.field(s, "x", TypeId::INT);
    let s_ty = fx.unit.record_type(s);
    let p_ty = fx.unit.pointer_to(s_ty);
    let p = fx.var(None, "p", p_ty);
    let p_ref = fx.decl_ref(p, p_ty);
    let e = fx.expr(Expr::lvalue(
        ExprKind::Member {
            base: p_ref,
            member: x,
            arrow: true,
            qualified: false,
        },
        TypeId::INT,
    ));

    assert_eq!(
        fx.lower_expr(e).0,
        format!(
            "(Emember (Ederef (Evar (Gname \"p\") (Tptr (Tnamed \"_Z1S\"))) (Tnamed \"_Z1S\")) \
             (Nfield \"_Z1S\" \"x\") {INT})"
        )
    );
}

#[test]
fn reference_fields_are_read_through() {
    let mut fx = Fixture::new();
    let s = fx.record(None, "S");
    let int_ref = fx.unit.lvalue_ref_to(TypeId::INT);
    let r = fx.field(s, "r", int_ref);
    let s_ty = fx.unit.record_type(s);
    let p_ty = fx.unit.pointer_to(s_ty);
    let v = fx.var(None, "v", s_ty);
    let p = fx.var(None, "p", p_ty);

    let member = |fx: &mut Fixture, base: ExprId, arrow: bool| {
        fx.expr(Expr::lvalue(
            ExprKind::Member {
                base,
                member: r,
                arrow,
                qualified: false,
            },
            TypeId::INT,
        ))
    };
    let v_ref = fx.decl_ref(v, s_ty);
    let dot = member(&mut fx, v_ref, false);
    let p_ref = fx.decl_ref(p, p_ty);
    let arrow = member(&mut fx, p_ref, true);

    let field = "(Nfield \"_Z1S\" \"r\")";
    assert_eq!(
        fx.lower_expr(dot).0,
        format!("(Eread_ref (Emember (Evar (Gname \"v\") (Tnamed \"_Z1S\")) {field} {INT}))")
    );
    assert_eq!(
        fx.lower_expr(arrow).0,
        format!(
            "(Eread_ref (Emember (Ederef (Evar (Gname \"p\") (Tptr (Tnamed \"_Z1S\"))) \
             (Tnamed \"_Z1S\")) {field} {INT}))"
        )
    );
}

#[test]
fn member_call_dispatch_follows_qualification() {
    let mut fx = Fixture::new();
    let s = fx.record(None, "S");
    let m = method(&mut fx, s, "m", true);
    let s_ty = fx.unit.record_type(s);
    let fn_ty = fx.unit.function_type(TypeId::VOID, Vec::new());
    let obj = fx.var(None, "s", s_ty);

    let call = |fx: &mut Fixture, qualified: bool| {
        let base = fx.decl_ref(obj, s_ty);
        let callee = fx.expr(Expr::prvalue(
            ExprKind::Member {
                base,
                member: m,
                arrow: false,
                qualified,
            },
            fn_ty,
        ));
        fx.expr(Expr::prvalue(
            ExprKind::MemberCall {
                callee,
                args: Vec::new(),
            },
            TypeId::VOID,
        ))
    };
    let virtual_call = call(&mut fx, false);
    let direct_call = call(&mut fx, true);

    let expected = |dispatch: &str| {
        format!(
            "(Emember_call (inl (\"_ZN1S1mEv\", {dispatch}, (Tfunction CC_C Ar_Definite Tvoid nil))) \
             (Evar (Gname \"s\") (Tnamed \"_Z1S\")) nil Tvoid)"
        )
    };
    assert_eq!(fx.lower_expr(virtual_call).0, expected("Virtual"));
    assert_eq!(fx.lower_expr(direct_call).0, expected("Direct"));
}

#[test]
fn new_without_allocation_function_is_fatal() {
    let mut fx = Fixture::new();
    let ptr = fx.unit.pointer_to(TypeId::INT);
    let e = fx.expr(Expr::prvalue(
        ExprKind::New {
            operator_new: None,
            placement: Vec::new(),
            allocated: TypeId::INT,
            array_size: None,
            init: None,
        },
        ptr,
    ));

    let err = fx.try_lower_expr(e).unwrap_err();
    assert!(matches!(err, LowerError::MissingOperatorNew { .. }));
    assert_eq!(err.code(), ErrorCode::E3001);
}

#[test]
fn lifetime_extended_temporary_is_fatal() {
    let mut fx = Fixture::new();
    let holder = fx.var(None, "r", TypeId::INT);
    let one = fx.int(1);
    let e = fx.expr(Expr::new(
        ExprKind::MaterializeTemporary {
            sub: one,
            extending_decl: Some(holder),
        },
        TypeId::INT,
        ValueCategory::Xvalue,
    ));

    assert!(matches!(
        fx.try_lower_expr(e),
        Err(LowerError::ExtendedTemporary { .. })
    ));
}

// Shared subexpressions

#[test]
fn binary_conditional_binds_common_operand() {
    let mut fx = Fixture::new();
    let g = fx.var(None, "g", TypeId::INT);
    let common = fx.decl_ref(g, TypeId::INT);
    let opaque = fx.expr(Expr::lvalue(
        ExprKind::OpaqueValue {
            source: Some(common),
        },
        TypeId::INT,
    ));
    let zero = fx.int(0);
    let e = fx.expr(Expr::prvalue(
        ExprKind::BinaryConditional {
            common,
            opaque,
            cond: opaque,
            then_expr: opaque,
            else_expr: zero,
        },
        TypeId::INT,
    ));

    let bound = format!("(Eopaque_ref 0%N Lvalue {INT})");
    assert_eq!(
        fx.lower_expr(e).0,
        format!(
            "(Eif2 0%N (Evar (Gname \"g\") {INT}) {bound} {bound} (Eint 0%Z {INT}) Prvalue {INT})"
        )
    );
}

#[test]
fn free_opaque_reference_is_a_placeholder() {
    let mut fx = Fixture::new();
    let e = fx.expr(Expr::lvalue(ExprKind::OpaqueValue { source: None }, TypeId::INT));

    let (term, diags) = fx.lower_expr(e);
    assert_eq!(term, format!("(Eunsupported \"free opaque value\" Lvalue {INT})"));
    assert_eq!(codes(&diags), vec![ErrorCode::W4001]);
}

#[test]
fn nested_array_loops_get_distinct_indices_and_depths() {
    let mut fx = Fixture::new();
    let arr3 = fx.unit.intern(TypeKind::Array {
        elem: TypeId::INT,
        len: 3,
    });
    let arr23 = fx.unit.intern(TypeKind::Array { elem: arr3, len: 2 });
    let a = fx.var(None, "a", arr23);

    // Outer loop over `a`, copying each row.
    let src = fx.decl_ref(a, arr23);
    let outer_common = fx.expr(Expr::lvalue(
        ExprKind::OpaqueValue { source: Some(src) },
        arr23,
    ));
    let outer_index = fx.expr(Expr::prvalue(ExprKind::ArrayInitIndex, TypeId::ULONG));
    let row = fx.expr(Expr::lvalue(
        ExprKind::Subscript {
            base: outer_common,
            index: outer_index,
        },
        arr3,
    ));

    // Inner loop over the row, copying each element.
    let inner_common = fx.expr(Expr::lvalue(
        ExprKind::OpaqueValue { source: Some(row) },
        arr3,
    ));
    let inner_index = fx.expr(Expr::prvalue(ExprKind::ArrayInitIndex, TypeId::ULONG));
    let elem = fx.expr(Expr::lvalue(
        ExprKind::Subscript {
            base: inner_common,
            index: inner_index,
        },
        TypeId::INT,
    ));
    let inner = fx.expr(Expr::prvalue(
        ExprKind::ArrayInitLoop {
            common: inner_common,
            size: 3,
            body: elem,
        },
        arr3,
    ));
    let outer = fx.expr(Expr::prvalue(
        ExprKind::ArrayInitLoop {
            common: outer_common,
            size: 2,
            body: inner,
        },
        arr23,
    ));

    let ulong = "(Tnum W64 Unsigned)";
    let arr3_t = format!("(Tarray {INT} 3%N)");
    let arr23_t = format!("(Tarray {arr3_t} 2%N)");
    let row_t = format!(
        "(Esubscript (Eopaque_ref 0%N Lvalue {arr23_t}) (Earrayloop_index 1%N {ulong}) {arr3_t})"
    );
    let elem_t = format!(
        "(Esubscript (Eopaque_ref 1%N Lvalue {arr3_t}) (Earrayloop_index 2%N {ulong}) {INT})"
    );
    let inner_t = format!("(Earrayloop_init 1%N {row_t} 2%N 3%N {elem_t} {arr3_t})");
    assert_eq!(
        fx.lower_expr(outer).0,
        format!("(Earrayloop_init 0%N (Evar (Gname \"a\") {arr23_t}) 1%N 2%N {inner_t} {arr23_t})")
    );
}

// Template patterns

#[test]
fn generic_calls_are_untyped() {
    let mut fx = Fixture::generic();
    let fn_ty = fx.unit.function_type(TypeId::INT, Vec::new());
    let f = fx.function(None, "f", TypeId::INT);
    let resolved_callee = fx.decl_ref(f, fn_ty);
    let resolved = fx.expr(Expr::prvalue(
        ExprKind::Call {
            callee: resolved_callee,
            args: Vec::new(),
        },
        TypeId::INT,
    ));
    let name = fx.expr(
        Expr::lvalue(
            ExprKind::UnresolvedLookup {
                name: "g".into(),
            },
            fn_ty,
        )
        .dependent(),
    );
    let arg = fx.int(1);
    let unresolved = fx.expr(
        Expr::prvalue(
            ExprKind::Call {
                callee: name,
                args: vec![arg],
            },
            TypeId::INT,
        )
        .dependent(),
    );

    assert_eq!(
        fx.lower_expr(resolved).0,
        format!("(Ecall (Evar (Gname \"_Z1fv\") (Tfunction CC_C Ar_Definite {INT} nil)) nil)")
    );
    assert_eq!(
        fx.lower_expr(unresolved).0,
        format!("(Eunresolved_call (Eunresolved_name \"g\") ((Eint 1%Z {INT}) :: nil))")
    );
}

#[test]
fn generic_operators_mark_dependent_types() {
    let mut fx = Fixture::generic();
    let t = fx.unit.intern(TypeKind::TemplateParam {
        name: "T".into(),
        depth: 0,
        index: 0,
    });
    let binop = |fx: &mut Fixture, ty: TypeId| {
        let l = fx.int(1);
        let r = fx.int(2);
        fx.expr(Expr::prvalue(
            ExprKind::Binary {
                op: BinaryOp::Add,
                lhs: l,
                rhs: r,
            },
            ty,
        ))
    };
    let known = binop(&mut fx, TypeId::INT);
    let dependent = binop(&mut fx, t);

    let operands = format!("(Eint 1%Z {INT}) (Eint 2%Z {INT})");
    assert_eq!(
        fx.lower_expr(known).0,
        format!("(Ebinop Badd {operands} (Some {INT}))")
    );
    assert_eq!(
        fx.lower_expr(dependent).0,
        format!("(Ebinop Badd {operands} None)")
    );
}

#[test]
fn generic_assignments_and_dereferences_mark_dependent_types() {
    let mut fx = Fixture::generic();
    let t = fx.unit.intern(TypeKind::TemplateParam {
        name: "T".into(),
        depth: 0,
        index: 0,
    });
    let t_ptr = fx.unit.pointer_to(t);
    let p = fx.var(None, "p", t_ptr);
    let x = fx.var(None, "x", t);

    let p_ref = fx.decl_ref(p, t_ptr);
    let deref = fx.expr(Expr::lvalue(
        ExprKind::Unary {
            op: UnaryOp::Deref,
            operand: p_ref,
        },
        t,
    ));
    let x_ref = fx.decl_ref(x, t);
    let assign = fx.expr(Expr::lvalue(
        ExprKind::Binary {
            op: BinaryOp::Assign,
            lhs: deref,
            rhs: x_ref,
        },
        t,
    ));
    let x_ref = fx.decl_ref(x, t);
    let one = fx.int(1);
    let compound = fx.expr(Expr::lvalue(
        ExprKind::CompoundAssign {
            op: BinaryOp::Add,
            lhs: x_ref,
            rhs: one,
        },
        t,
    ));
    let y = fx.var(None, "y", TypeId::INT);
    let y_ref = fx.decl_ref(y, TypeId::INT);
    let two = fx.int(2);
    let known = fx.expr(Expr::lvalue(
        ExprKind::Binary {
            op: BinaryOp::Assign,
            lhs: y_ref,
            rhs: two,
        },
        TypeId::INT,
    ));

    let deref_t = "(Ederef (Evar (Gname \"p\") (Tptr (Tparam \"T\"))) None)";
    let x_t = "(Evar (Gname \"x\") (Tparam \"T\"))";
    assert_eq!(fx.lower_expr(deref).0, deref_t);
    assert_eq!(
        fx.lower_expr(assign).0,
        format!("(Eassign {deref_t} {x_t} None)")
    );
    assert_eq!(
        fx.lower_expr(compound).0,
        format!("(Eassign_op Badd {x_t} (Eint 1%Z {INT}) None)")
    );
    assert_eq!(
        fx.lower_expr(known).0,
        format!("(Eassign (Evar (Gname \"y\") {INT}) (Eint 2%Z {INT}) (Some {INT}))")
    );
}

#[test]
fn concrete_unresolved_name_is_a_placeholder() {
    let mut fx = Fixture::new();
    let e = fx.expr(Expr::lvalue(
        ExprKind::UnresolvedLookup { name: "g".into() },
        TypeId::INT,
    ));

    let (term, diags) = fx.lower_expr(e);
    assert_eq!(term, format!("(Eunsupported \"unresolved name g\" Lvalue {INT})"));
    assert_eq!(codes(&diags), vec![ErrorCode::W4001]);
}
