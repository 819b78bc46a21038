use std::path::PathBuf;

use neuro_output::OutputFormatter;

use super::{eprint_error, open_project, print_result, resolve_provider};

/// Run `neurocode embed [path] [--provider] [--update]`.
pub fn run(formatter: &dyn OutputFormatter, path: Option<PathBuf>, provider_name: String, update: bool) -> i32 {
    let project = open_project(path);
    let provider = match resolve_provider(&project, &provider_name) {
        Ok(p) => p,
        Err(e) => return eprint_error("embed", &e),
    };
    match project.embed(provider.as_ref(), update) {
        Ok(result) => {
            print_result(formatter.format_embed(&result));
            0
        }
        Err(e) => eprint_error("embed", &e),
    }
}
