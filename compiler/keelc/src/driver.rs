//! Reading, lowering and rendering translation units.
//!
//! Units are independent: each is deserialized and lowered on its own
//! rayon task, and results are collected in input order so the output does
//! not depend on scheduling.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use keel_diagnostic::{Diagnostic, DiagnosticQueue};
use keel_ir::TranslationUnit;
use keel_lower::{lower_unit, ItaniumMangler, LowerConfig};
use keel_term::CoqEmitter;

/// Rendered terms of one unit plus the unsupported constructs it hit.
#[derive(Debug)]
pub struct UnitOutput {
    pub path: PathBuf,
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: invalid translation unit: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{}: invalid translation unit: {source}", path.display())]
    Dangling {
        path: PathBuf,
        source: keel_ir::DanglingId,
    },
    #[error("{}: {diagnostic}", path.display())]
    Lower {
        path: PathBuf,
        diagnostic: Box<Diagnostic>,
    },
}

/// Lower every input. The first fatal error, in input order, wins.
pub fn lower_files(
    inputs: &[PathBuf],
    config: &LowerConfig,
) -> Result<Vec<UnitOutput>, DriverError> {
    inputs
        .par_iter()
        .map(|path| {
            let source = std::fs::read_to_string(path).map_err(|source| DriverError::Read {
                path: path.clone(),
                source,
            })?;
            lower_source(path, &source, config)
        })
        .collect()
}

/// Lower one JSON-encoded translation unit. References between nodes are
/// checked before lowering starts.
pub fn lower_source(
    path: &Path,
    source: &str,
    config: &LowerConfig,
) -> Result<UnitOutput, DriverError> {
    let _span = tracing::info_span!("unit", path = %path.display()).entered();
    let unit: TranslationUnit =
        serde_json::from_str(source).map_err(|source| DriverError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    unit.validate().map_err(|source| DriverError::Dangling {
        path: path.to_path_buf(),
        source,
    })?;

    let mut queue = DiagnosticQueue::new();
    let terms = lower_unit(&unit, config, &ItaniumMangler, &mut queue).map_err(|err| {
        tracing::error!(code = err.code().as_str(), "{err}");
        DriverError::Lower {
            path: path.to_path_buf(),
            diagnostic: Box::new(err.to_diagnostic()),
        }
    })?;

    let mut emitter = CoqEmitter::with_capacity(terms.len() * 128);
    for term in &terms {
        term.emit(&mut emitter);
    }
    tracing::debug!(
        terms = terms.len(),
        warnings = queue.len(),
        "lowered unit"
    );
    Ok(UnitOutput {
        path: path.to_path_buf(),
        text: emitter.output(),
        diagnostics: queue.flush(),
    })
}

#[cfg(test)]
mod tests;
