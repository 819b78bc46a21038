//! Structural queries over a resolved repository: callers, callees, and
//! fan-in/fan-out rankings.

use std::collections::HashSet;
use std::path::Path;

use neuro_core::error::{NeurocodeError, Result};
use neuro_core::types::{FunctionId, FunctionIR, ModuleIR, RepositoryIR};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Callers,
    Callees,
    FanIn,
    FanOut,
}

impl QueryKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "callers" => Some(Self::Callers),
            "callees" => Some(Self::Callees),
            "fan-in" => Some(Self::FanIn),
            "fan-out" => Some(Self::FanOut),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Callers => "callers",
            Self::Callees => "callees",
            Self::FanIn => "fan-in",
            Self::FanOut => "fan-out",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolRef {
    pub symbol_id: String,
    pub module: String,
    pub function: String,
    pub file: String,
    pub lineno: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FanCount {
    pub symbol_id: String,
    pub module: String,
    pub function: String,
    pub file: String,
    pub lineno: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum QueryOutcome {
    #[serde(rename = "callers")]
    Callers { symbol: String, callers: Vec<SymbolRef> },
    #[serde(rename = "callees")]
    Callees { symbol: String, callees: Vec<SymbolRef> },
    #[serde(rename = "fan-in")]
    FanIn { functions: Vec<FanCount> },
    #[serde(rename = "fan-out")]
    FanOut { functions: Vec<FanCount> },
}

impl QueryOutcome {
    pub fn into_query_result(self, kind: QueryKind) -> crate::types::QueryResult {
        let (target, entries) = match self {
            QueryOutcome::Callers { symbol, callers } => (symbol, callers.into_iter().map(SymbolRef::into_entry).collect()),
            QueryOutcome::Callees { symbol, callees } => (symbol, callees.into_iter().map(SymbolRef::into_entry).collect()),
            QueryOutcome::FanIn { functions } => (String::new(), functions.into_iter().map(FanCount::into_entry).collect()),
            QueryOutcome::FanOut { functions } => (String::new(), functions.into_iter().map(FanCount::into_entry).collect()),
        };
        crate::types::QueryResult { kind: kind.as_str().to_string(), target, entries }
    }
}

impl SymbolRef {
    fn into_entry(self) -> crate::types::QueryEntry {
        crate::types::QueryEntry {
            symbol_id: self.symbol_id,
            qualified_name: self.function,
            module: self.module,
            file: self.file,
            line: self.lineno,
            count: None,
        }
    }
}

impl FanCount {
    fn into_entry(self) -> crate::types::QueryEntry {
        crate::types::QueryEntry {
            symbol_id: self.symbol_id,
            qualified_name: self.function,
            module: self.module,
            file: self.file,
            line: self.lineno,
            count: Some(self.count),
        }
    }
}

/// Resolve a symbol name against every function in the repository. Accepts
/// fully qualified names, simple names, or qualified-name suffixes.
pub(crate) fn resolve_function<'a>(ir: &'a RepositoryIR, target: &str) -> Result<&'a FunctionIR> {
    let functions: Vec<&FunctionIR> = ir.functions().collect();
    let candidates: Vec<&FunctionIR> = functions
        .iter()
        .copied()
        .filter(|f| f.qualified_name == target || f.name == target || f.qualified_name.ends_with(&format!(".{target}")))
        .collect();

    match candidates.len() {
        0 => Err(NeurocodeError::SymbolNotFound(target.to_string())),
        1 => Ok(candidates[0]),
        _ => {
            let exact: Vec<&FunctionIR> = candidates.iter().copied().filter(|f| f.qualified_name == target).collect();
            if exact.len() == 1 {
                Ok(exact[0])
            } else {
                Err(NeurocodeError::AmbiguousSymbol {
                    symbol: target.to_string(),
                    candidates: candidates.iter().map(|f| f.qualified_name.clone()).collect(),
                })
            }
        }
    }
}

fn modules_in_scope<'a>(ir: &'a RepositoryIR, repo_root: &Path, module_filter: Option<&str>) -> Result<Vec<&'a ModuleIR>> {
    let Some(filter) = module_filter else {
        return Ok(ir.modules.iter().collect());
    };

    let filter_path = Path::new(filter);
    let mut scope: Vec<&ModuleIR> = Vec::new();
    for m in &ir.modules {
        if m.module_name == filter {
            scope.push(m);
            continue;
        }
        if filter_path.exists() {
            if let Ok(rel) = filter_path.canonicalize() {
                if let Ok(rel) = rel.strip_prefix(repo_root) {
                    if m.path == rel {
                        scope.push(m);
                        continue;
                    }
                }
            }
        }
        if m.path.to_string_lossy().ends_with(filter) {
            scope.push(m);
        }
    }
    if scope.is_empty() {
        return Err(NeurocodeError::ConfigError(format!("Module not found for filter: {filter}")));
    }
    Ok(scope)
}

fn symbol_ref(ir: &RepositoryIR, repo_root: &Path, fn_ir: &FunctionIR) -> SymbolRef {
    let module = ir.module_by_id(fn_ir.module_id).expect("function references known module");
    SymbolRef {
        symbol_id: fn_ir.symbol_id.clone().unwrap_or_else(|| fn_ir.qualified_name.clone()),
        module: module.module_name.clone(),
        function: fn_ir.qualified_name.clone(),
        file: repo_root.join(&module.path).display().to_string(),
        lineno: fn_ir.lineno,
    }
}

pub fn run_query(
    ir: &RepositoryIR,
    repo_root: &Path,
    kind: QueryKind,
    symbol: Option<&str>,
    module_filter: Option<&str>,
) -> Result<QueryOutcome> {
    match kind {
        QueryKind::Callers => {
            let symbol_name = symbol.ok_or_else(|| NeurocodeError::ConfigError("Symbol is required for this query kind".to_string()))?;
            let target = resolve_function(ir, symbol_name)?;
            let mut caller_ids: Vec<FunctionId> = ir
                .call_edges
                .iter()
                .filter(|e| e.callee_function_id == Some(target.id))
                .map(|e| e.caller_function_id)
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            caller_ids.sort_unstable();
            let callers = caller_ids
                .iter()
                .filter_map(|&id| ir.function_by_id(id))
                .map(|f| symbol_ref(ir, repo_root, f))
                .collect();
            Ok(QueryOutcome::Callers { symbol: target.qualified_name.clone(), callers })
        }
        QueryKind::Callees => {
            let symbol_name = symbol.ok_or_else(|| NeurocodeError::ConfigError("Symbol is required for this query kind".to_string()))?;
            let target = resolve_function(ir, symbol_name)?;
            let mut callee_ids: Vec<FunctionId> = ir
                .call_edges
                .iter()
                .filter(|e| e.caller_function_id == target.id)
                .filter_map(|e| e.callee_function_id)
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            callee_ids.sort_unstable();
            let callees = callee_ids
                .iter()
                .filter_map(|&id| ir.function_by_id(id))
                .map(|f| symbol_ref(ir, repo_root, f))
                .collect();
            Ok(QueryOutcome::Callees { symbol: target.qualified_name.clone(), callees })
        }
        QueryKind::FanIn | QueryKind::FanOut => {
            let reverse = kind == QueryKind::FanIn;
            let scope_modules = modules_in_scope(ir, repo_root, module_filter)?;
            let scope_ids: HashSet<u32> = scope_modules.iter().map(|m| m.id).collect();
            let scope_functions: Vec<&FunctionIR> = ir.functions().into_iter().filter(|f| scope_ids.contains(&f.module_id)).collect();

            let mut counts: std::collections::HashMap<FunctionId, HashSet<FunctionId>> =
                scope_functions.iter().map(|f| (f.id, HashSet::new())).collect();
            for edge in &ir.call_edges {
                let Some(callee) = edge.callee_function_id else { continue };
                if reverse {
                    if let Some(set) = counts.get_mut(&callee) {
                        set.insert(edge.caller_function_id);
                    }
                } else if let Some(set) = counts.get_mut(&edge.caller_function_id) {
                    set.insert(callee);
                }
            }

            let mut ordered: Vec<(&FunctionIR, usize)> =
                scope_functions.iter().map(|&f| (f, counts.get(&f.id).map(|s| s.len()).unwrap_or(0))).collect();
            ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.qualified_name.cmp(&b.0.qualified_name)));

            let functions: Vec<FanCount> = ordered
                .into_iter()
                .map(|(f, count)| {
                    let module = ir.module_by_id(f.module_id).expect("function references known module");
                    FanCount {
                        symbol_id: f.symbol_id.clone().unwrap_or_else(|| f.qualified_name.clone()),
                        module: module.module_name.clone(),
                        function: f.qualified_name.clone(),
                        file: repo_root.join(&module.path).display().to_string(),
                        lineno: f.lineno,
                        count: count as u32,
                    }
                })
                .collect();

            if reverse {
                Ok(QueryOutcome::FanIn { functions })
            } else {
                Ok(QueryOutcome::FanOut { functions })
            }
        }
    }
}

pub fn render_query_result_text(result: &QueryOutcome) -> String {
    match result {
        QueryOutcome::Callers { symbol, callers } => {
            let mut lines = vec![format!("Callers of {symbol}:")];
            lines.extend(callers.iter().map(|c| format!("- {}", c.function)));
            lines.join("\n")
        }
        QueryOutcome::Callees { symbol, callees } => {
            let mut lines = vec![format!("Callees of {symbol}:")];
            lines.extend(callees.iter().map(|c| format!("- {}", c.function)));
            lines.join("\n")
        }
        QueryOutcome::FanIn { functions } => {
            let mut lines = vec!["Fan-in (callers per function):".to_string()];
            lines.extend(functions.iter().map(|f| format!("{:>3} {}", f.count, f.function)));
            lines.join("\n")
        }
        QueryOutcome::FanOut { functions } => {
            let mut lines = vec!["Fan-out (callees per function):".to_string()];
            lines.extend(functions.iter().map(|f| format!("{:>3} {}", f.count, f.function)));
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_core::types::*;
    use std::path::PathBuf;

    fn repo() -> RepositoryIR {
        let module = ModuleIR {
            id: 0,
            path: PathBuf::from("pkg/mod.py"),
            module_name: "pkg.mod".to_string(),
            file_hash: None,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: vec![
                FunctionIR { id: 0, module_id: 0, name: "a".into(), qualified_name: "pkg.mod.a".into(), lineno: 1, end_lineno: 2, parent_class_id: None, kind: FunctionKind::Function, is_entrypoint: false, symbol_id: Some("pkg.mod:a".into()), signature: None, docstring: None, params: vec![], call_sites: vec![] },
                FunctionIR { id: 1, module_id: 0, name: "b".into(), qualified_name: "pkg.mod.b".into(), lineno: 3, end_lineno: 4, parent_class_id: None, kind: FunctionKind::Function, is_entrypoint: false, symbol_id: Some("pkg.mod:b".into()), signature: None, docstring: None, params: vec![], call_sites: vec![] },
            ],
            entry_symbol_id: None,
        };
        RepositoryIR {
            root: PathBuf::from("/repo"),
            build_timestamp: String::new(),
            modules: vec![module],
            module_imports: Vec::new(),
            call_edges: vec![CallEdge { caller_function_id: 0, callee_function_id: Some(1), caller_symbol_id: "pkg.mod:a".into(), callee_symbol_id: Some("pkg.mod:b".into()), lineno: 2, target: "b".into() }],
            console_scripts: Vec::new(),
            config_paths: Vec::new(),
        }
    }

    #[test]
    fn callers_of_b_is_a() {
        let ir = repo();
        let result = run_query(&ir, Path::new("/repo"), QueryKind::Callers, Some("b"), None).unwrap();
        match result {
            QueryOutcome::Callers { callers, .. } => assert_eq!(callers.len(), 1),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unknown_symbol_errors() {
        let ir = repo();
        let err = run_query(&ir, Path::new("/repo"), QueryKind::Callers, Some("nope"), None);
        assert!(err.is_err());
    }
}
