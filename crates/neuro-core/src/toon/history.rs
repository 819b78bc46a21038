//! Serializer/parser for `patch-history.toon`: the append-only patch log.

use std::path::Path;

use super::document::{col, parse_document};
use super::row::{col_to_bool, bool_to_col, escape_value, join_multi, join_row, split_multi};

#[derive(Debug, Clone)]
pub struct PatchHistoryEntry {
    pub id: String,
    pub timestamp: String,
    pub fix: String,
    pub files_changed: Vec<String>,
    pub is_noop: bool,
    pub summary: String,
    pub warnings: Vec<String>,
    pub plan_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PatchHistory {
    pub entries: Vec<PatchHistoryEntry>,
}

pub fn history_to_toon(history: &PatchHistory) -> String {
    let mut lines = Vec::new();
    lines.push("patch_history:".to_string());
    lines.push(format!("  count: {}", history.entries.len()));
    lines.push(String::new());

    lines.push(format!(
        "entries[{}]{{id,timestamp,fix,files_changed,is_noop,summary,warnings,plan_id}}:",
        history.entries.len()
    ));
    for e in &history.entries {
        let row = join_row(&[
            escape_value(&e.id),
            escape_value(&e.timestamp),
            escape_value(&e.fix),
            escape_value(&join_multi(&e.files_changed)),
            bool_to_col(e.is_noop).to_string(),
            escape_value(&e.summary),
            escape_value(&join_multi(&e.warnings)),
            escape_value(e.plan_id.as_deref().unwrap_or("")),
        ]);
        lines.push(format!("  {row}"));
    }
    lines.push(String::new());
    lines.join("\n")
}

pub fn history_from_toon(text: &str) -> PatchHistory {
    let doc = parse_document(text, "patch_history");
    let mut entries = Vec::new();
    for row in doc.table("entries") {
        let plan_id = col(row, "plan_id");
        entries.push(PatchHistoryEntry {
            id: col(row, "id").to_string(),
            timestamp: col(row, "timestamp").to_string(),
            fix: col(row, "fix").to_string(),
            files_changed: split_multi(col(row, "files_changed")),
            is_noop: col_to_bool(col(row, "is_noop")),
            summary: col(row, "summary").to_string(),
            warnings: split_multi(col(row, "warnings")),
            plan_id: if plan_id.is_empty() { None } else { Some(plan_id.to_string()) },
        });
    }
    PatchHistory { entries }
}

fn history_path(repo_root: &Path) -> std::path::PathBuf {
    repo_root.join(".neurocode").join("patch-history.toon")
}

pub fn load_patch_history(repo_root: &Path) -> PatchHistory {
    let path = history_path(repo_root);
    match std::fs::read_to_string(&path) {
        Ok(text) => history_from_toon(&text),
        Err(_) => PatchHistory::default(),
    }
}

pub fn save_patch_history(repo_root: &Path, history: &PatchHistory) -> std::io::Result<()> {
    let path = history_path(repo_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    crate::toon::write_atomic(&path, &history_to_toon(history))
}

/// Appends one entry to the on-disk history. Failure is logged and
/// swallowed: a history write never aborts the patch operation it records.
pub fn append_patch_history(
    repo_root: &Path,
    now_iso: &str,
    fix: &str,
    files_changed: Vec<String>,
    is_noop: bool,
    summary: &str,
    warnings: Vec<String>,
    plan_id: Option<String>,
) {
    let mut history = load_patch_history(repo_root);
    history.entries.push(PatchHistoryEntry {
        id: now_iso.to_string(),
        timestamp: now_iso.to_string(),
        fix: fix.to_string(),
        files_changed,
        is_noop,
        summary: summary.to_string(),
        warnings,
        plan_id,
    });
    if let Err(e) = save_patch_history(repo_root, &history) {
        eprintln!("[neurocode] warning: failed to append patch history: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_entries() {
        let history = PatchHistory {
            entries: vec![PatchHistoryEntry {
                id: "2024-01-01T00:00:00Z".to_string(),
                timestamp: "2024-01-01T00:00:00Z".to_string(),
                fix: "add a, guard".to_string(),
                files_changed: vec!["a.py".to_string(), "b.py".to_string()],
                is_noop: false,
                summary: "inserted guard clause".to_string(),
                warnings: vec!["stale ir".to_string()],
                plan_id: Some("plan-1".to_string()),
            }],
        };
        let text = history_to_toon(&history);
        let parsed = history_from_toon(&text);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].fix, "add a, guard");
        assert_eq!(parsed.entries[0].files_changed, vec!["a.py", "b.py"]);
        assert_eq!(parsed.entries[0].plan_id, Some("plan-1".to_string()));
    }
}
