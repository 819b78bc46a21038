use std::path::PathBuf;

use neuro_output::OutputFormatter;

use super::{eprint_error, open_project, print_result};

/// Run `neurocode explain <file>`.
pub fn run(formatter: &dyn OutputFormatter, file: PathBuf) -> i32 {
    let project = open_project(None);
    match project.explain(&file) {
        Ok(result) => {
            print_result(formatter.format_explain(&result));
            0
        }
        Err(e) => eprint_error("explain", &e),
    }
}
