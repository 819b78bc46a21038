use crate::OutputFormatter;
use neuro_enforce::types::{
    CheckResult, EmbedResult, ExplainBundle, ExplainResult, IrBuildResult, LocalPatchResult, PatchApplyResult, PatchHistoryResult,
    PatchPlanBundle, QueryResult, SearchResult, StatusResult,
};

pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_ir(&self, result: &IrBuildResult) -> String {
        let verb = if result.checked { "checked" } else { "built" };
        format!(
            "{} {}: {} module(s), {} class(es), {} function(s), {} call edge(s) [{}]\n",
            verb,
            result.root,
            result.num_modules,
            result.num_classes,
            result.num_functions,
            result.num_call_edges,
            if result.fresh { "fresh" } else { "stale" },
        )
    }

    fn format_explain(&self, result: &ExplainResult) -> String {
        let m = &result.module;
        let mut out = format!("{} ({})\n", m.module, m.path);
        if !m.imports.is_empty() {
            out.push_str(&format!("\nImports ({}):\n", m.imports.len()));
            for i in &m.imports {
                out.push_str(&format!("  {} {}\n", i.kind, i.name));
            }
        }
        if !m.classes.is_empty() {
            out.push_str(&format!("\nClasses ({}):\n", m.classes.len()));
            for c in &m.classes {
                out.push_str(&format!("  {} :{}", c.qualified_name, c.lineno));
                if !c.bases.is_empty() {
                    out.push_str(&format!(" ({})", c.bases.join(", ")));
                }
                out.push('\n');
            }
        }
        if !m.functions.is_empty() {
            out.push_str(&format!("\nFunctions ({}):\n", m.functions.len()));
            for f in &m.functions {
                out.push_str(&format!("  {} :{}-{}\n", f.qualified_name, f.lineno, f.end_lineno));
            }
        }
        out
    }

    fn format_check(&self, result: &CheckResult) -> String {
        if result.findings.is_empty() {
            return match &result.stale_warning {
                Some(w) => format!("{}: no findings\nwarning: {}\n", result.file, w),
                None => String::new(),
            };
        }
        let mut out = String::new();
        for f in &result.findings {
            out.push_str(&format!("{} [{}] {}:{} {}\n", f.code, f.severity, f.file, f.line, f.message));
        }
        out.push_str(&format!("\n{} finding(s) in {}\n", result.findings.len(), result.file));
        if let Some(w) = &result.stale_warning {
            out.push_str(&format!("warning: {}\n", w));
        }
        out
    }

    fn format_query(&self, result: &QueryResult) -> String {
        let mut out = format!("{} {} ({} result(s)):\n", result.kind, result.target, result.entries.len());
        for e in &result.entries {
            match e.count {
                Some(n) => out.push_str(&format!("  {} {}:{} count={}\n", e.qualified_name, e.file, e.line, n)),
                None => out.push_str(&format!("  {} {}:{}\n", e.qualified_name, e.file, e.line)),
            }
        }
        out
    }

    fn format_embed(&self, result: &EmbedResult) -> String {
        format!(
            "{}: embedded {}/{} item(s) with {} ({})\n",
            result.root,
            result.items_embedded,
            result.items_total,
            result.model,
            if result.updated_existing_store { "updated" } else { "rebuilt" },
        )
    }

    fn format_search(&self, result: &SearchResult) -> String {
        let mut out = format!("search '{}' ({} hit(s)):\n", result.query, result.hits.len());
        for h in &result.hits {
            out.push_str(&format!("  {:.4} {} {}:{}\n", h.score, h.qualified_name, h.file, h.lineno));
        }
        out
    }

    fn format_status(&self, result: &StatusResult) -> String {
        let mut out = format!("{}: {}\n", result.root, if result.fresh { "fresh" } else { "stale" });
        for m in &result.modules {
            out.push_str(&format!("  {} [{}] {}\n", m.module, m.status.as_str(), m.path));
        }
        out
    }

    fn format_patch(&self, result: &LocalPatchResult) -> String {
        let mut out = String::new();
        let symbol = result.symbol.as_deref().unwrap_or("?");
        if result.is_noop {
            out.push_str(&format!("{} {} ({}): no-op, already patched\n", result.file, symbol, result.strategy));
        } else {
            out.push_str(&format!(
                "{} {} ({}): {}\n",
                result.file,
                symbol,
                result.strategy,
                if result.written { "patched" } else { "dry run" },
            ));
        }
        if let Some(diff) = &result.diff {
            out.push_str(diff);
            if !diff.ends_with('\n') {
                out.push('\n');
            }
        }
        for w in &result.warnings {
            out.push_str(&format!("warning: {}\n", w));
        }
        out
    }

    fn format_patch_history(&self, result: &PatchHistoryResult) -> String {
        let mut out = format!("{}: {} entr(ies)\n", result.root, result.entries.len());
        for e in &result.entries {
            out.push_str(&format!(
                "  {} {} {} files=[{}]{}\n",
                e.timestamp,
                if e.is_noop { "noop" } else { "applied" },
                e.fix,
                e.files_changed.join(", "),
                e.plan_id.as_deref().map(|p| format!(" plan={p}")).unwrap_or_default(),
            ));
        }
        out
    }

    fn format_explain_bundle(&self, result: &ExplainBundle) -> String {
        let mut out = format!("bundle for {} (engine {})\n", result.file, result.engine_version);
        if let Some(t) = &result.target {
            out.push_str(&format!("target: {} :{}-{}\n", t.qualified_name, t.lineno, t.end_lineno));
        }
        out.push_str(&format!("callers: {}, callees: {}\n", result.callers.len(), result.callees.len()));
        out.push_str(&format!("checks: {}\n", result.checks.len()));
        out.push_str(&format!("semantic neighbors: {}\n", result.semantic_neighbors.len()));
        out
    }

    fn format_plan(&self, result: &PatchPlanBundle) -> String {
        let mut out = format!("plan {} ({} operation(s)):\n", result.plan_id, result.operations.len());
        for op in &result.operations {
            out.push_str(&format!("  [{}] {} {} {}:{}\n", op.id, op.op, op.symbol, op.file, op.lineno));
        }
        out
    }

    fn format_plan_apply(&self, result: &PatchApplyResult) -> String {
        let mut out = format!("{}: files changed: {}\n", result.status, result.files_changed.join(", "));
        if let Some(diff) = &result.diff {
            out.push_str(diff);
            if !diff.ends_with('\n') {
                out.push('\n');
            }
        }
        for w in &result.warnings {
            out.push_str(&format!("warning: {}\n", w));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_enforce::types::{ModuleFreshness, ModuleFreshnessEntry};

    #[test]
    fn status_lists_modules() {
        let fmt = HumanFormatter;
        let result = StatusResult {
            root: "/repo".to_string(),
            fresh: false,
            modules: vec![ModuleFreshnessEntry { module: "pkg.mod".to_string(), path: "pkg/mod.py".to_string(), status: ModuleFreshness::Stale }],
            config: neuro_enforce::types::ConfigSummary {
                fanout_threshold: 10,
                long_function_threshold: 50,
                enabled_checks: vec![],
                severity_overrides: Default::default(),
                embedding_provider: "dummy".to_string(),
                embedding_model: "dummy-v1".to_string(),
            },
        };
        let out = fmt.format_status(&result);
        assert!(out.contains("stale"));
        assert!(out.contains("pkg.mod"));
    }

    #[test]
    fn check_empty_findings_with_no_warning_is_empty() {
        let fmt = HumanFormatter;
        let result = CheckResult { file: "a.py".to_string(), findings: vec![], stale_warning: None };
        assert_eq!(fmt.format_check(&result), String::new());
    }
}
