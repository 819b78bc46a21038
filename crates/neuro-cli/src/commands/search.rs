use std::path::PathBuf;

use neuro_core::error::NeurocodeError;
use neuro_output::OutputFormatter;

use super::{eprint_error, open_project, print_result, resolve_provider};

/// Run `neurocode search <path> {--text|--like} [--k] [--module]`.
#[allow(clippy::too_many_arguments)]
pub fn run(
    formatter: &dyn OutputFormatter,
    path: Option<PathBuf>,
    text: Option<String>,
    like: Option<String>,
    k: usize,
    module: Option<String>,
    provider_name: String,
) -> i32 {
    let project = open_project(path);

    let result = match (text, like) {
        (Some(text), None) => {
            let provider = match resolve_provider(&project, &provider_name) {
                Ok(p) => p,
                Err(e) => return eprint_error("search", &e),
            };
            project.search_text(&text, provider.as_ref(), module.as_deref(), k)
        }
        (None, Some(symbol)) => project.search_like(&symbol, module.as_deref(), k),
        _ => Err(NeurocodeError::ConfigError("search requires exactly one of --text or --like".to_string())),
    };

    match result {
        Ok(result) => {
            print_result(formatter.format_search(&result));
            0
        }
        Err(e) => eprint_error("search", &e),
    }
}
