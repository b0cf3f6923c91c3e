use pretty_assertions::assert_eq;

use keel_diagnostic::ErrorCode;
use keel_ir::{
    DeclId, DeclKind, FieldDecl, RecordDecl, RecordDefinition, Referrer, TagKind,
    TranslationUnit, TypeId,
};

use super::*;

fn record(unit: &mut TranslationUnit, name: &str, definition: Option<RecordDefinition>) -> DeclId {
    unit.add_decl(
        None,
        Some(name),
        DeclKind::Record(RecordDecl {
            tag: TagKind::Struct,
            typedef_name: None,
            definition,
            specialization: None,
        }),
    )
}

fn to_json(unit: &TranslationUnit) -> String {
    serde_json::to_string(unit).unwrap()
}

#[test]
fn terms_are_rendered_one_per_line() {
    let mut unit = TranslationUnit::new("a.cpp");
    record(&mut unit, "S", None);
    record(&mut unit, "T", None);

    let out = lower_source(Path::new("a.json"), &to_json(&unit), &LowerConfig::default()).unwrap();
    assert_eq!(out.text, "(Dtype \"_Z1S\")\n(Dtype \"_Z1T\")");
    assert_eq!(out.diagnostics, vec![]);
    assert_eq!(out.path, PathBuf::from("a.json"));
}

#[test]
fn invalid_json_is_a_parse_error() {
    let err = lower_source(Path::new("bad.json"), "{ not json", &LowerConfig::default())
        .unwrap_err();
    assert!(matches!(err, DriverError::Parse { ref path, .. } if path == Path::new("bad.json")));
    assert!(err.to_string().starts_with("bad.json: invalid translation unit"));
}

#[test]
fn dangling_references_are_rejected_before_lowering() {
    let mut unit = TranslationUnit::new("c.cpp");
    let s = record(&mut unit, "S", None);
    unit.decl_mut(s).parent = Some(DeclId::new(41));

    let err = lower_source(Path::new("c.json"), &to_json(&unit), &LowerConfig::default())
        .unwrap_err();
    let source = match err {
        DriverError::Dangling { source, .. } => source,
        other => panic!("expected a dangling reference, got {other:?}"),
    };
    assert_eq!(source.referrer, Referrer::Decl(s));
    assert_eq!(source.arena, "declaration");
    assert_eq!(source.index, 41);
}

#[test]
fn fatal_lowering_errors_carry_their_diagnostic() {
    let mut unit = TranslationUnit::new("b.cpp");
    let s = record(
        &mut unit,
        "S",
        Some(RecordDefinition {
            bases: Vec::new(),
            layout: None,
            is_pod: true,
            is_standard_layout: true,
            trivial_dtor: true,
            destructor: None,
            operator_delete: None,
        }),
    );
    unit.add_decl(
        Some(s),
        Some("flags"),
        DeclKind::Field(FieldDecl {
            ty: TypeId::UINT,
            mutable: false,
            bit_width: Some(3),
            init: None,
        }),
    );

    let err = lower_source(Path::new("b.json"), &to_json(&unit), &LowerConfig::default())
        .unwrap_err();
    let diagnostic = match err {
        DriverError::Lower { diagnostic, .. } => diagnostic,
        other => panic!("expected a lowering error, got {other:?}"),
    };
    assert_eq!(diagnostic.code, ErrorCode::E2001);
    assert!(diagnostic.is_fatal());
}

#[test]
fn missing_files_are_read_errors() {
    let inputs = vec![PathBuf::from("/nonexistent/keelc/unit.json")];
    let err = lower_files(&inputs, &LowerConfig::default()).unwrap_err();
    assert!(matches!(err, DriverError::Read { .. }));
}
