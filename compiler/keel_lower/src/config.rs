//! Run-wide lowering configuration.

/// Which side of a template is emitted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Mode {
    /// Emit only uninstantiated template patterns, with their parameter
    /// headers, plus instantiation records.
    Generic,
    /// Emit only non-templated declarations and instantiated bodies.
    #[default]
    Concrete,
}

/// How type identities are spelled.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NamingStrategy {
    /// Host-compatible mangled symbols, with positional fallbacks for
    /// anonymous scopes.
    Opaque,
    /// Explicit qualified-name trees; never an opaque string.
    Structured,
}

impl Default for NamingStrategy {
    fn default() -> Self {
        if cfg!(feature = "structured-names") {
            NamingStrategy::Structured
        } else {
            NamingStrategy::Opaque
        }
    }
}

/// Configuration fixed for a whole lowering run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LowerConfig {
    pub mode: Mode,
    pub naming: NamingStrategy,
    /// Emit `Dtypedef` records for typedef declarations instead of
    /// skipping them.
    pub emit_typedefs: bool,
}

impl LowerConfig {
    pub fn generic() -> Self {
        LowerConfig {
            mode: Mode::Generic,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    pub fn is_generic(&self) -> bool {
        self.mode == Mode::Generic
    }
}
