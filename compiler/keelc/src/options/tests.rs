use pretty_assertions::assert_eq;

use super::*;

fn parse(args: &[&str]) -> Result<Command, UsageError> {
    let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
    parse_args(&args)
}

fn lower(args: &[&str]) -> Options {
    match parse(args) {
        Ok(Command::Lower(options)) => options,
        other => panic!("expected a lowering command, got {other:?}"),
    }
}

#[test]
fn defaults_lower_concretely() {
    let options = lower(&["a.json"]);
    assert_eq!(options.config, LowerConfig::default());
    assert_eq!(options.output, None);
    assert_eq!(options.inputs, vec![PathBuf::from("a.json")]);
}

#[test]
fn flags_set_the_configuration() {
    let options = lower(&["--generic", "a.json", "--structured-names", "--typedefs"]);
    assert_eq!(options.config.mode, Mode::Generic);
    assert_eq!(options.config.naming, NamingStrategy::Structured);
    assert!(options.config.emit_typedefs);
    assert_eq!(options.inputs, vec![PathBuf::from("a.json")]);
}

#[test]
fn output_path_takes_the_next_argument() {
    let options = lower(&["-o", "out.v", "a.json", "b.json"]);
    assert_eq!(options.output, Some(PathBuf::from("out.v")));
    assert_eq!(
        options.inputs,
        vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
    );
}

#[test]
fn inputs_after_double_dash_may_look_like_flags() {
    let options = lower(&["--", "--generic", "-"]);
    assert_eq!(options.config.mode, Mode::Concrete);
    assert_eq!(
        options.inputs,
        vec![PathBuf::from("--generic"), PathBuf::from("-")]
    );
}

#[test]
fn help_wins_over_everything_else() {
    assert_eq!(parse(&["a.json", "--help", "--bogus"]), Ok(Command::Help));
    assert_eq!(parse(&["-h"]), Ok(Command::Help));
}

#[test]
fn usage_errors() {
    assert_eq!(parse(&["a.json", "-o"]), Err(UsageError::MissingOutput));
    assert_eq!(
        parse(&["--fast", "a.json"]),
        Err(UsageError::UnknownOption("--fast".to_string()))
    );
    assert_eq!(parse(&["--generic"]), Err(UsageError::NoInputs));
    assert_eq!(parse(&[]), Err(UsageError::NoInputs));
}
