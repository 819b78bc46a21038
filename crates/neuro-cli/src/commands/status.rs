use std::path::PathBuf;

use neuro_output::OutputFormatter;

use super::{eprint_error, open_project, print_result};

/// Run `neurocode status [path]`.
pub fn run(formatter: &dyn OutputFormatter, path: Option<PathBuf>) -> i32 {
    let project = open_project(path);
    match project.status() {
        Ok(result) => {
            let code = result.exit_code();
            print_result(formatter.format_status(&result));
            code
        }
        Err(e) => eprint_error("status", &e),
    }
}
