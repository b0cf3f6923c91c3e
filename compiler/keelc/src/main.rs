//! Keel CLI
//!
//! Lowers JSON-encoded translation units to canonical terms, one term per
//! line, in input order.

mod driver;
mod options;

use std::io::Write;
use std::sync::Once;

use keel_diagnostic::Severity;

use crate::driver::{lower_files, UnitOutput};
use crate::options::{parse_args, Command, Options, USAGE};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing. Nothing is installed unless `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match parse_args(&args) {
        Ok(Command::Help) => println!("{USAGE}"),
        Ok(Command::Lower(options)) => {
            if let Err(message) = run(&options) {
                eprintln!("error: {message}");
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

/// Lower all inputs and write the result. Nothing is written if any unit
/// fails.
fn run(options: &Options) -> Result<(), String> {
    let units = lower_files(&options.inputs, &options.config).map_err(|e| e.to_string())?;
    report_warnings(&units);

    let mut text = String::new();
    for unit in &units {
        if unit.text.is_empty() {
            continue;
        }
        text.push_str(&unit.text);
        text.push('\n');
    }

    match &options.output {
        Some(path) => std::fs::write(path, text)
            .map_err(|e| format!("cannot write {}: {e}", path.display())),
        None => std::io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .map_err(|e| format!("cannot write output: {e}")),
    }
}

fn report_warnings(units: &[UnitOutput]) {
    for unit in units {
        for diagnostic in &unit.diagnostics {
            if diagnostic.severity >= Severity::Unsupported {
                eprintln!("warning: {}: {diagnostic}", unit.path.display());
            }
        }
    }
}
