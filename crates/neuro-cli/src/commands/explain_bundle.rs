use std::path::PathBuf;

use neuro_output::OutputFormatter;

use super::{eprint_error, open_project, print_result};

/// Run `neurocode explain-bundle <file> [--symbol]`.
pub fn run(formatter: &dyn OutputFormatter, file: PathBuf, symbol: Option<String>) -> i32 {
    let project = open_project(None);
    match project.explain_bundle(&file, symbol.as_deref()) {
        Ok(result) => {
            print_result(formatter.format_explain_bundle(&result));
            0
        }
        Err(e) => eprint_error("explain-bundle", &e),
    }
}
