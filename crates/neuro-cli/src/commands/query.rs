use std::path::PathBuf;

use neuro_output::OutputFormatter;

use crate::cli_args::QueryKindArg;
use neuro_enforce::query::QueryKind;

use super::{eprint_error, open_project, print_result};

/// Run `neurocode query <path> --kind ...`.
pub fn run(formatter: &dyn OutputFormatter, path: Option<PathBuf>, kind: QueryKindArg, symbol: Option<String>, module: Option<String>) -> i32 {
    let project = open_project(path);
    let query_kind = match kind {
        QueryKindArg::Callers => QueryKind::Callers,
        QueryKindArg::Callees => QueryKind::Callees,
        QueryKindArg::FanIn => QueryKind::FanIn,
        QueryKindArg::FanOut => QueryKind::FanOut,
    };
    match project.query(query_kind, symbol.as_deref(), module.as_deref()) {
        Ok(result) => {
            print_result(formatter.format_query(&result));
            0
        }
        Err(e) => eprint_error("query", &e),
    }
}
