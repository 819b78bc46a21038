use crate::OutputFormatter;
use neuro_enforce::types::{
    CheckResult, EmbedResult, ExplainBundle, ExplainResult, IrBuildResult, LocalPatchResult, PatchApplyResult, PatchHistoryResult,
    PatchPlanBundle, QueryResult, SearchResult, StatusResult,
};

pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_ir(&self, result: &IrBuildResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_explain(&self, result: &ExplainResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_check(&self, result: &CheckResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_query(&self, result: &QueryResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_embed(&self, result: &EmbedResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_search(&self, result: &SearchResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_status(&self, result: &StatusResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_patch(&self, result: &LocalPatchResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_patch_history(&self, result: &PatchHistoryResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_explain_bundle(&self, result: &ExplainBundle) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_plan(&self, result: &PatchPlanBundle) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_plan_apply(&self, result: &PatchApplyResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_enforce::types::{ModuleFreshness, ModuleFreshnessEntry};
    use std::collections::HashMap;

    #[test]
    fn status_round_trips() {
        let fmt = JsonFormatter;
        let result = StatusResult {
            root: "/repo".to_string(),
            fresh: false,
            modules: vec![ModuleFreshnessEntry { module: "pkg.mod".to_string(), path: "pkg/mod.py".to_string(), status: ModuleFreshness::Stale }],
            config: neuro_enforce::types::ConfigSummary {
                fanout_threshold: 10,
                long_function_threshold: 50,
                enabled_checks: vec!["UNUSED_IMPORT".to_string()],
                severity_overrides: HashMap::new(),
                embedding_provider: "dummy".to_string(),
                embedding_model: "dummy-v1".to_string(),
            },
        };
        let out = fmt.format_status(&result);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["fresh"], false);
        assert_eq!(parsed["modules"][0]["status"], "stale");
    }

    #[test]
    fn ir_build_result_round_trips() {
        let fmt = JsonFormatter;
        let result = IrBuildResult { root: "/repo".to_string(), num_modules: 3, num_classes: 1, num_functions: 9, num_call_edges: 4, checked: false, fresh: true };
        let out = fmt.format_ir(&result);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["num_modules"], 3);
    }
}
