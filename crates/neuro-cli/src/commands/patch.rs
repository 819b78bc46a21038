use std::path::PathBuf;

use neuro_output::OutputFormatter;

use crate::cli_args::PatchStrategyArg;
use neuro_enforce::local_patch::Strategy;

use super::{eprint_error, open_project, print_result};

/// Run `neurocode patch <file> --fix <text> [--strategy] [--target] [--dry-run] [--show-diff] [--require-fresh-ir] [--require-target]`.
#[allow(clippy::too_many_arguments)]
pub fn run(
    formatter: &dyn OutputFormatter,
    file: PathBuf,
    fix: String,
    strategy: PatchStrategyArg,
    target: Option<String>,
    dry_run: bool,
    show_diff: bool,
    require_fresh_ir: bool,
    require_target: bool,
) -> i32 {
    let project = open_project(None);
    let strategy = match strategy {
        PatchStrategyArg::Guard => Strategy::Guard,
        PatchStrategyArg::Todo => Strategy::Todo,
        PatchStrategyArg::Inject => Strategy::Inject,
    };
    match project.patch(&file, &fix, strategy, target.as_deref(), dry_run, require_fresh_ir, require_target) {
        Ok(mut result) => {
            let code = result.exit_code();
            if !show_diff && !dry_run {
                result.diff = None;
            }
            print_result(formatter.format_patch(&result));
            code
        }
        Err(e) => eprint_error("patch", &e),
    }
}
