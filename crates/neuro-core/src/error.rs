use std::path::PathBuf;

use thiserror::Error;

/// The engine's single closed error taxonomy. Every fallible public operation
/// returns one of these variants; build-time per-file failures never reach
/// here (they are logged and skipped instead).
#[derive(Debug, Error)]
pub enum NeurocodeError {
    #[error("IR snapshot not found at {path}. Run `neurocode ir` first.")]
    IrNotFound { path: PathBuf },

    #[error("embedding store not found at {path}. Run `neurocode embed` first.")]
    EmbeddingsNotFound { path: PathBuf },

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("ambiguous symbol {symbol}: matches {candidates:?}")]
    AmbiguousSymbol { symbol: String, candidates: Vec<String> },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("patch plan error: {0}")]
    PatchPlanError(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl NeurocodeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NeurocodeError::Io { path: path.into(), source }
    }

    /// Maps this error to the process exit code the CLI should use.
    ///
    /// `3` is reserved for patch/plan no-op, which is signaled separately by
    /// callers and never constructed from this enum.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, NeurocodeError>;
