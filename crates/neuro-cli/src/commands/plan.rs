use std::path::PathBuf;

use neuro_core::error::NeurocodeError;
use neuro_output::OutputFormatter;

use super::{eprint_error, open_project, print_result};

/// Run `neurocode plan <file> --symbol <name>`.
pub fn run_build(formatter: &dyn OutputFormatter, file: PathBuf, symbol: Option<String>) -> i32 {
    let Some(symbol) = symbol else {
        return eprint_error("plan", &NeurocodeError::ConfigError("plan requires --symbol".to_string()));
    };
    let project = open_project(None);
    match project.plan(&file, &symbol) {
        Ok(result) => {
            print_result(formatter.format_plan(&result));
            0
        }
        Err(e) => eprint_error("plan", &e),
    }
}

/// Run `neurocode plan apply <plan.json> [--dry-run] [--show-diff]`.
pub fn run_apply(formatter: &dyn OutputFormatter, plan_file: PathBuf, dry_run: bool, show_diff: bool) -> i32 {
    let project = open_project(None);

    let text = match std::fs::read_to_string(&plan_file) {
        Ok(t) => t,
        Err(e) => return eprint_error("plan apply", &NeurocodeError::io(&plan_file, e)),
    };
    let value: serde_json::Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => return eprint_error("plan apply", &NeurocodeError::PatchPlanError(format!("invalid JSON: {e}"))),
    };

    match project.plan_apply(&value, dry_run, show_diff) {
        Ok(mut result) => {
            let code = result.exit_code();
            if !show_diff && !dry_run {
                result.diff = None;
            }
            print_result(formatter.format_plan_apply(&result));
            code
        }
        Err(e) => eprint_error("plan apply", &e),
    }
}
