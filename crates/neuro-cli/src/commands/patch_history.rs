use std::path::PathBuf;

use neuro_output::OutputFormatter;

use super::{eprint_error, open_project, print_result};

/// Run `neurocode patch-history [path] [--limit]`.
pub fn run(formatter: &dyn OutputFormatter, path: Option<PathBuf>, limit: Option<usize>) -> i32 {
    let project = open_project(path);
    match project.patch_history(limit) {
        Ok(result) => {
            print_result(formatter.format_patch_history(&result));
            0
        }
        Err(e) => eprint_error("patch-history", &e),
    }
}
