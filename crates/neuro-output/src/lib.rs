//! Output formatters for neurocode command results.
//!
//! Every CLI command routes its result through exactly one of these two
//! formatters, selected by the global `--format` flag:
//! - **text**: human-readable, terminal-oriented rendering
//! - **json**: a single well-formed JSON value on stdout

pub mod human;
pub mod json;

use neuro_enforce::types::{
    CheckResult, EmbedResult, ExplainBundle, ExplainResult, IrBuildResult, LocalPatchResult, PatchApplyResult, PatchHistoryResult,
    PatchPlanBundle, QueryResult, SearchResult, StatusResult,
};

pub trait OutputFormatter {
    fn format_ir(&self, result: &IrBuildResult) -> String;
    fn format_explain(&self, result: &ExplainResult) -> String;
    fn format_check(&self, result: &CheckResult) -> String;
    fn format_query(&self, result: &QueryResult) -> String;
    fn format_embed(&self, result: &EmbedResult) -> String;
    fn format_search(&self, result: &SearchResult) -> String;
    fn format_status(&self, result: &StatusResult) -> String;
    fn format_patch(&self, result: &LocalPatchResult) -> String;
    fn format_patch_history(&self, result: &PatchHistoryResult) -> String;
    fn format_explain_bundle(&self, result: &ExplainBundle) -> String;
    fn format_plan(&self, result: &PatchPlanBundle) -> String;
    fn format_plan_apply(&self, result: &PatchApplyResult) -> String;
}
