//! Command-line options.

use std::path::PathBuf;

use keel_lower::{LowerConfig, Mode, NamingStrategy};

pub const USAGE: &str = "\
Usage: keelc [options] <unit.json>...

Options:
  --generic            Emit template patterns instead of instantiations
  --structured-names   Name types by qualified-name trees, not symbols
  --typedefs           Emit typedef declarations
  -o <path>            Write terms to <path> instead of stdout
  -h, --help           Show this message

Logging is controlled by RUST_LOG (e.g. RUST_LOG=keel_lower=debug).";

/// What the command line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Lower(Options),
    Help,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub config: LowerConfig,
    pub output: Option<PathBuf>,
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("`-o` needs a path")]
    MissingOutput,
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("no input files")]
    NoInputs,
}

/// Parse the arguments after the program name. Flags and inputs may be
/// interleaved; everything after `--` is an input.
pub fn parse_args(args: &[String]) -> Result<Command, UsageError> {
    let mut options = Options::default();
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--generic" => options.config.mode = Mode::Generic,
            "--structured-names" => options.config.naming = NamingStrategy::Structured,
            "--typedefs" => options.config.emit_typedefs = true,
            "-o" => {
                let path = args.next().ok_or(UsageError::MissingOutput)?;
                options.output = Some(PathBuf::from(path));
            }
            "--" => {
                options.inputs.extend(args.by_ref().map(PathBuf::from));
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(UsageError::UnknownOption(flag.to_string()));
            }
            input => options.inputs.push(PathBuf::from(input)),
        }
    }
    if options.inputs.is_empty() {
        return Err(UsageError::NoInputs);
    }
    Ok(Command::Lower(options))
}

#[cfg(test)]
mod tests;
