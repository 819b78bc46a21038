use std::path::PathBuf;

use neuro_output::OutputFormatter;

use super::{eprint_error, open_project, print_result};

/// Run `neurocode ir [path] [--check]`.
pub fn run(formatter: &dyn OutputFormatter, path: Option<PathBuf>, check: bool) -> i32 {
    let project = open_project(path);
    match project.ir_command(check) {
        Ok(result) => {
            let code = result.exit_code();
            print_result(formatter.format_ir(&result));
            code
        }
        Err(e) => eprint_error("ir", &e),
    }
}
