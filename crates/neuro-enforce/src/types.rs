//! Result types shared by every facade operation and rendered by
//! `neuro-output`. These are the wire shapes for `--format json`; the text
//! formatter renders the same data as human-readable lines.

use serde::{Deserialize, Serialize};

/// Default severities named by the spec. Config may override a check's
/// severity to an arbitrary string, so [`CheckFinding::severity`] stays a
/// plain `String` rather than this enum.
pub const SEVERITY_INFO: &str = "INFO";
pub const SEVERITY_WARNING: &str = "WARNING";

/// One of the six structural diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckKind {
    UnusedImport,
    UnusedFunction,
    HighFanout,
    UnusedParam,
    LongFunction,
    CallCycle,
}

impl CheckKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::UnusedImport => "UNUSED_IMPORT",
            CheckKind::UnusedFunction => "UNUSED_FUNCTION",
            CheckKind::HighFanout => "HIGH_FANOUT",
            CheckKind::UnusedParam => "UNUSED_PARAM",
            CheckKind::LongFunction => "LONG_FUNCTION",
            CheckKind::CallCycle => "CALL_CYCLE",
        }
    }

    pub fn default_severity(self) -> &'static str {
        match self {
            CheckKind::UnusedImport | CheckKind::CallCycle => SEVERITY_WARNING,
            _ => SEVERITY_INFO,
        }
    }

    pub fn all() -> [CheckKind; 6] {
        [
            CheckKind::UnusedImport,
            CheckKind::UnusedFunction,
            CheckKind::HighFanout,
            CheckKind::UnusedParam,
            CheckKind::LongFunction,
            CheckKind::CallCycle,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFinding {
    pub code: String,
    pub severity: String,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub file: String,
    pub findings: Vec<CheckFinding>,
    pub stale_warning: Option<String>,
}

impl CheckResult {
    /// `0` if every finding is INFO or lower, `1` otherwise (§4.5).
    pub fn exit_code(&self) -> i32 {
        if self.findings.iter().any(|f| f.severity != SEVERITY_INFO) {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFreshness {
    Fresh,
    Stale,
    Missing,
    Unknown,
}

impl ModuleFreshness {
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleFreshness::Fresh => "fresh",
            ModuleFreshness::Stale => "stale",
            ModuleFreshness::Missing => "missing",
            ModuleFreshness::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleFreshnessEntry {
    pub module: String,
    pub path: String,
    pub status: ModuleFreshness,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub fanout_threshold: u32,
    pub long_function_threshold: u32,
    pub enabled_checks: Vec<String>,
    pub severity_overrides: std::collections::HashMap<String, String>,
    pub embedding_provider: String,
    pub embedding_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResult {
    pub root: String,
    pub fresh: bool,
    pub modules: Vec<ModuleFreshnessEntry>,
    pub config: ConfigSummary,
}

impl StatusResult {
    pub fn exit_code(&self) -> i32 {
        if self.fresh {
            0
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrBuildResult {
    pub root: String,
    pub num_modules: usize,
    pub num_classes: usize,
    pub num_functions: usize,
    pub num_call_edges: usize,
    pub checked: bool,
    pub fresh: bool,
}

impl IrBuildResult {
    pub fn exit_code(&self) -> i32 {
        if self.checked && !self.fresh {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryEntry {
    pub symbol_id: String,
    pub qualified_name: String,
    pub module: String,
    pub file: String,
    pub line: u32,
    /// Populated for `fan-in`/`fan-out`; `None` for `callers`/`callees`.
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub kind: String,
    pub target: String,
    pub entries: Vec<QueryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResult {
    pub root: String,
    pub provider: String,
    pub model: String,
    pub items_embedded: usize,
    pub items_total: usize,
    pub updated_existing_store: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub qualified_name: String,
    pub module: String,
    pub file: String,
    pub lineno: u32,
    pub signature: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub kind: String,
    pub module: Option<String>,
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSummary {
    pub symbol_id: String,
    pub name: String,
    pub qualified_name: String,
    pub kind: String,
    pub lineno: u32,
    pub end_lineno: u32,
    pub signature: Option<String>,
    pub docstring: Option<String>,
    pub is_entrypoint: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSummary {
    pub qualified_name: String,
    pub name: String,
    pub lineno: u32,
    pub bases: Vec<String>,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub module: String,
    pub path: String,
    pub imports: Vec<ImportSummary>,
    pub functions: Vec<FunctionSummary>,
    pub classes: Vec<ClassSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResult {
    pub engine_version: String,
    pub root: String,
    pub file: String,
    pub module: ModuleSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallGraphNeighbor {
    pub symbol_id: String,
    pub qualified_name: String,
    pub module: String,
    pub file: String,
    pub lineno: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticNeighbor {
    pub symbol_id: String,
    pub qualified_name: String,
    pub module: String,
    pub file: String,
    pub lineno: u32,
    pub score: f32,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub text: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSlice {
    pub symbol_id: String,
    pub code: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainBundle {
    pub engine_version: String,
    pub root: String,
    pub file: String,
    pub module: ModuleSummary,
    pub target: Option<FunctionSummary>,
    pub callers: Vec<CallGraphNeighbor>,
    pub callees: Vec<CallGraphNeighbor>,
    pub checks: Vec<CheckFinding>,
    pub semantic_neighbors: Vec<SemanticNeighbor>,
    pub source: SourceDocument,
    pub slices: Vec<SourceSlice>,
}

/// One anchored edit the patch-plan schema allows. Closed enumeration:
/// implementations should exhaustively match, never pattern on a
/// catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOp {
    InsertBefore,
    InsertAfter,
    ReplaceRange,
    AppendToFunction,
}

impl PatchOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PatchOp::InsertBefore => "insert_before",
            PatchOp::InsertAfter => "insert_after",
            PatchOp::ReplaceRange => "replace_range",
            PatchOp::AppendToFunction => "append_to_function",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "insert_before" => Some(PatchOp::InsertBefore),
            "insert_after" => Some(PatchOp::InsertAfter),
            "replace_range" => Some(PatchOp::ReplaceRange),
            "append_to_function" => Some(PatchOp::AppendToFunction),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchOperation {
    pub id: String,
    pub op: String,
    pub file: String,
    pub symbol: String,
    pub lineno: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_lineno: Option<u32>,
    pub description: String,
    pub code: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchPlanBundle {
    pub plan_id: String,
    pub explain: ExplainBundle,
    pub operations: Vec<PatchOperation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchApplyResult {
    pub status: String,
    pub is_noop: bool,
    pub files_changed: Vec<String>,
    pub diff: Option<String>,
    pub warnings: Vec<String>,
}

impl PatchApplyResult {
    pub fn exit_code(&self) -> i32 {
        if self.is_noop {
            3
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalPatchResult {
    pub file: String,
    pub symbol: Option<String>,
    pub strategy: String,
    pub is_noop: bool,
    pub written: bool,
    pub diff: Option<String>,
    pub warnings: Vec<String>,
}

impl LocalPatchResult {
    pub fn exit_code(&self) -> i32 {
        if self.is_noop {
            3
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchHistoryEntryView {
    pub id: String,
    pub timestamp: String,
    pub fix: String,
    pub files_changed: Vec<String>,
    pub is_noop: bool,
    pub summary: String,
    pub warnings: Vec<String>,
    pub plan_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchHistoryResult {
    pub root: String,
    pub entries: Vec<PatchHistoryEntryView>,
}
