pub mod check;
pub mod embed;
pub mod explain;
pub mod explain_bundle;
pub mod ir;
pub mod patch;
pub mod patch_history;
pub mod plan;
pub mod query;
pub mod search;
pub mod status;

use std::path::PathBuf;

use neuro_core::error::NeurocodeError;
use neuro_enforce::embedding_provider::{DummyEmbeddingProvider, EmbeddingProvider};
use neuro_enforce::facade::Project;

pub fn resolve_root(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| PathBuf::from("."))
}

pub fn open_project(path: Option<PathBuf>) -> Project {
    Project::open(resolve_root(path))
}

/// Resolves `--provider <name>` against the project's configuration. Only
/// `dummy` is known to this engine; it is used only when explicitly named
/// here or allowed by `embedding.allow_dummy` in configuration — it is never
/// silently substituted for a real provider.
pub fn resolve_provider(project: &Project, requested: &str) -> Result<Box<dyn EmbeddingProvider>, NeurocodeError> {
    match requested {
        "dummy" => {
            if requested == project.config.embedding.provider || project.config.embedding.allow_dummy {
                Ok(Box::new(DummyEmbeddingProvider::default()))
            } else {
                Err(NeurocodeError::ConfigError(
                    "the dummy embedding provider is not allowed by this project's configuration; set embedding.allow_dummy = true or pass --provider explicitly".to_string(),
                ))
            }
        }
        other => Err(NeurocodeError::ConfigError(format!("unknown embedding provider: {other}"))),
    }
}

pub fn print_result(output: String) {
    if !output.is_empty() {
        print!("{output}");
    }
}

pub fn eprint_error(command: &str, err: &NeurocodeError) -> i32 {
    eprintln!("[neurocode] {command}: {err}");
    err.exit_code()
}
