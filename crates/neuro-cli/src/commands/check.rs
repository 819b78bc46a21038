use std::path::PathBuf;

use neuro_output::OutputFormatter;

use super::{eprint_error, open_project, print_result};

/// Run `neurocode check <file>`.
pub fn run(formatter: &dyn OutputFormatter, file: PathBuf) -> i32 {
    let project = open_project(None);
    match project.check_file(&file) {
        Ok(result) => {
            let code = result.exit_code();
            print_result(formatter.format_check(&result));
            code
        }
        Err(e) => eprint_error("check", &e),
    }
}
