//! The six structural diagnostics: unused imports, unused functions, high
//! fan-out, unused parameters, long functions, and call-graph cycles.
//!
//! Each check is scoped to a single module but several need repository-wide
//! context (resolved call edges) to decide what counts as "used" or "called".

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use neuro_core::config::Config;
use neuro_core::types::{FunctionId, FunctionIR, ModuleIR, RepositoryIR};

#[derive(Debug, Clone, serde::Serialize)]
pub struct Finding {
    pub code: &'static str,
    pub severity: String,
    pub message: String,
    pub file: PathBuf,
    pub module: Option<String>,
    pub function: Option<String>,
    pub lineno: Option<u32>,
}

impl From<Finding> for crate::types::CheckFinding {
    fn from(f: Finding) -> Self {
        crate::types::CheckFinding {
            code: f.code.to_string(),
            severity: f.severity,
            message: f.message,
            file: f.file.display().to_string(),
            line: f.lineno.unwrap_or(0),
            symbol: f.function.or(f.module),
        }
    }
}

/// Run every enabled check against the module that owns `file`.
pub fn check_module(
    ir: &RepositoryIR,
    module: &ModuleIR,
    file: &Path,
    config: &Config,
) -> Vec<Finding> {
    let mut results = Vec::new();
    if config.is_check_enabled("UNUSED_IMPORT") {
        results.extend(check_unused_imports(module, file, config));
    }
    if config.is_check_enabled("UNUSED_FUNCTION") {
        results.extend(check_unused_functions(ir, module, file, config));
    }
    if config.is_check_enabled("HIGH_FANOUT") {
        results.extend(check_high_fanout(ir, module, file, config));
    }
    if config.is_check_enabled("UNUSED_PARAM") {
        results.extend(check_unused_params(module, file, config));
    }
    if config.is_check_enabled("LONG_FUNCTION") {
        results.extend(check_long_functions(module, file, config));
    }
    if config.is_check_enabled("CALL_CYCLE") {
        results.extend(check_call_cycles(ir, module, file, config));
    }
    results
}

fn check_unused_imports(module: &ModuleIR, file: &Path, config: &Config) -> Vec<Finding> {
    if module.imports.is_empty() {
        return Vec::new();
    }

    let mut used_symbols: HashSet<String> = HashSet::new();
    for fn_ir in &module.functions {
        for call in &fn_ir.call_sites {
            let parts: Vec<&str> = call.target.split('.').collect();
            for i in 1..=parts.len() {
                used_symbols.insert(parts[..i].join("."));
            }
        }
    }

    let mut results = Vec::new();
    for imp in &module.imports {
        let mut candidates: Vec<String> = Vec::new();
        if let Some(alias) = &imp.alias {
            candidates.push(alias.clone());
        }
        let imported_repr = match imp.kind {
            neuro_core::types::ImportKind::Import => {
                candidates.push(imp.imported_name.rsplit('.').next().unwrap_or(&imp.imported_name).to_string());
                candidates.push(imp.imported_name.clone());
                imp.imported_name.clone()
            }
            neuro_core::types::ImportKind::From => {
                candidates.push(imp.imported_name.clone());
                if let Some(src) = &imp.source_module {
                    candidates.push(format!("{src}.{}", imp.imported_name));
                }
                match &imp.source_module {
                    Some(src) => format!("{src}.{}", imp.imported_name),
                    None => imp.imported_name.clone(),
                }
            }
        };

        let mut seen = HashSet::new();
        let filtered: Vec<String> = candidates
            .into_iter()
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        if filtered.iter().any(|s| used_symbols.contains(s)) {
            continue;
        }

        results.push(Finding {
            code: "UNUSED_IMPORT",
            severity: config.severity_for("UNUSED_IMPORT", "WARNING"),
            message: format!("{imported_repr} imported in {} but never used", module.module_name),
            file: file.to_path_buf(),
            module: Some(module.module_name.clone()),
            function: None,
            lineno: None,
        });
    }
    results
}

fn should_ignore_unused(fn_ir: &FunctionIR) -> bool {
    fn_ir.is_dunder() || fn_ir.is_private() || fn_ir.is_test_named()
}

fn check_unused_functions(
    ir: &RepositoryIR,
    module: &ModuleIR,
    file: &Path,
    config: &Config,
) -> Vec<Finding> {
    let called: HashSet<FunctionId> = ir
        .call_edges
        .iter()
        .filter_map(|e| e.callee_function_id)
        .collect();

    module
        .non_module_functions()
        .into_iter()
        .filter(|fn_ir| !should_ignore_unused(fn_ir) && !called.contains(&fn_ir.id))
        .map(|fn_ir| Finding {
            code: "UNUSED_FUNCTION",
            severity: config.severity_for("UNUSED_FUNCTION", "INFO"),
            message: format!("{} is never called from any other function", fn_ir.qualified_name),
            file: file.to_path_buf(),
            module: Some(module.module_name.clone()),
            function: Some(fn_ir.name.clone()),
            lineno: Some(fn_ir.lineno),
        })
        .collect()
}

fn check_high_fanout(
    ir: &RepositoryIR,
    module: &ModuleIR,
    file: &Path,
    config: &Config,
) -> Vec<Finding> {
    let module_fn_ids: HashSet<FunctionId> = module.functions.iter().map(|f| f.id).collect();
    if module_fn_ids.is_empty() {
        return Vec::new();
    }

    let mut targets_by_fn: HashMap<FunctionId, HashSet<String>> = HashMap::new();
    for edge in &ir.call_edges {
        if !module_fn_ids.contains(&edge.caller_function_id) {
            continue;
        }
        let key = match edge.callee_function_id {
            Some(id) => format!("id:{id}"),
            None => format!("name:{}", edge.target),
        };
        targets_by_fn.entry(edge.caller_function_id).or_default().insert(key);
    }

    let mut results = Vec::new();
    for fn_ir in &module.functions {
        let count = targets_by_fn.get(&fn_ir.id).map(|s| s.len()).unwrap_or(0);
        if count as u32 >= config.fanout_threshold {
            results.push(Finding {
                code: "HIGH_FANOUT",
                severity: config.severity_for("HIGH_FANOUT", "INFO"),
                message: format!("{} calls {count} distinct functions", fn_ir.qualified_name),
                file: file.to_path_buf(),
                module: Some(module.module_name.clone()),
                function: Some(fn_ir.name.clone()),
                lineno: Some(fn_ir.lineno),
            });
        }
    }
    results
}

fn check_long_functions(module: &ModuleIR, file: &Path, config: &Config) -> Vec<Finding> {
    let threshold = config.long_function_threshold;
    module
        .non_module_functions()
        .into_iter()
        .filter_map(|fn_ir| {
            let length = fn_ir.end_lineno.checked_sub(fn_ir.lineno)? + 1;
            if length >= threshold {
                Some(Finding {
                    code: "LONG_FUNCTION",
                    severity: config.severity_for("LONG_FUNCTION", "INFO"),
                    message: format!(
                        "{} is {length} lines long (threshold {threshold})",
                        fn_ir.qualified_name
                    ),
                    file: file.to_path_buf(),
                    module: Some(module.module_name.clone()),
                    function: Some(fn_ir.name.clone()),
                    lineno: Some(fn_ir.lineno),
                })
            } else {
                None
            }
        })
        .collect()
}

fn check_call_cycles(
    ir: &RepositoryIR,
    module: &ModuleIR,
    file: &Path,
    config: &Config,
) -> Vec<Finding> {
    let local_fn_ids: HashSet<FunctionId> = module.functions.iter().map(|f| f.id).collect();
    let mut adj: HashMap<FunctionId, Vec<FunctionId>> = HashMap::new();
    for edge in &ir.call_edges {
        if local_fn_ids.contains(&edge.caller_function_id) {
            if let Some(callee) = edge.callee_function_id {
                adj.entry(edge.caller_function_id).or_default().push(callee);
            }
        }
    }

    let mut visited: HashSet<FunctionId> = HashSet::new();
    let mut cycles: Vec<Vec<FunctionId>> = Vec::new();

    for &start in &local_fn_ids {
        if !visited.contains(&start) {
            let mut stack: HashSet<FunctionId> = HashSet::new();
            let mut path: Vec<FunctionId> = Vec::new();
            dfs(start, &adj, &mut visited, &mut stack, &mut path, &mut cycles);
        }
    }

    if cycles.is_empty() {
        return Vec::new();
    }

    let fn_by_id: HashMap<FunctionId, &FunctionIR> =
        module.functions.iter().map(|f| (f.id, f)).collect();

    cycles
        .into_iter()
        .map(|cycle| {
            let names: Vec<&str> = cycle
                .iter()
                .filter_map(|id| fn_by_id.get(id).map(|f| f.qualified_name.as_str()))
                .collect();
            let first = fn_by_id.get(&cycle[0]);
            Finding {
                code: "CALL_CYCLE",
                severity: config.severity_for("CALL_CYCLE", "WARNING"),
                message: format!("Call cycle detected: {}", names.join(" -> ")),
                file: file.to_path_buf(),
                module: Some(module.module_name.clone()),
                function: first.map(|f| f.name.clone()),
                lineno: first.map(|f| f.lineno),
            }
        })
        .collect()
}

fn dfs(
    node: FunctionId,
    adj: &HashMap<FunctionId, Vec<FunctionId>>,
    visited: &mut HashSet<FunctionId>,
    stack: &mut HashSet<FunctionId>,
    path: &mut Vec<FunctionId>,
    cycles: &mut Vec<Vec<FunctionId>>,
) {
    if stack.contains(&node) {
        let idx = path.iter().position(|&n| n == node).unwrap_or(0);
        let mut cycle = path[idx..].to_vec();
        cycle.push(node);
        cycles.push(cycle);
        return;
    }
    if visited.contains(&node) {
        return;
    }
    visited.insert(node);
    stack.insert(node);
    path.push(node);
    if let Some(next) = adj.get(&node) {
        for &n in next {
            dfs(n, adj, visited, stack, path, cycles);
        }
    }
    path.pop();
    stack.remove(&node);
}

/// Flag parameters that are declared but never read in the body. Requires a
/// fresh parse of the source because the RIR does not track name-load sites.
fn check_unused_params(module: &ModuleIR, file: &Path, config: &Config) -> Vec<Finding> {
    let Ok(source) = std::fs::read_to_string(file) else {
        return Vec::new();
    };
    let mut parser = tree_sitter::Parser::new();
    if parser.set_language(&tree_sitter_python::LANGUAGE.into()).is_err() {
        return Vec::new();
    }
    let Some(tree) = parser.parse(&source, None) else {
        return Vec::new();
    };

    let bytes = source.as_bytes();
    let mut results = Vec::new();
    walk_for_unused_params(tree.root_node(), bytes, module, file, config, &mut results);
    results
}

fn walk_for_unused_params(
    node: tree_sitter::Node,
    bytes: &[u8],
    module: &ModuleIR,
    file: &Path,
    config: &Config,
    results: &mut Vec<Finding>,
) {
    if node.kind() == "function_definition" {
        if let (Some(name_node), Some(params_node), Some(body_node)) =
            (node.child_by_field_name("name"), node.child_by_field_name("parameters"), node.child_by_field_name("body"))
        {
            let name = name_node.utf8_text(bytes).unwrap_or("").to_string();
            let params = param_names(params_node, bytes);
            if !params.is_empty() {
                let used = collect_loaded_names(body_node, bytes);
                for param in &params {
                    if !used.contains(param) && !param.starts_with('_') {
                        results.push(Finding {
                            code: "UNUSED_PARAM",
                            severity: config.severity_for("UNUSED_PARAM", "INFO"),
                            message: format!(
                                "Parameter '{param}' in {}.{name} is never used",
                                module.module_name
                            ),
                            file: file.to_path_buf(),
                            module: Some(module.module_name.clone()),
                            function: Some(name.clone()),
                            lineno: Some(node.start_position().row as u32 + 1),
                        });
                    }
                }
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_for_unused_params(child, bytes, module, file, config, results);
    }
}

fn param_names(params_node: tree_sitter::Node, bytes: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = params_node.walk();
    for child in params_node.named_children(&mut cursor) {
        let ident = match child.kind() {
            "identifier" => Some(child),
            "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                child.child_by_field_name("name").or_else(|| child.named_child(0))
            }
            "list_splat_pattern" | "dictionary_splat_pattern" => child.named_child(0),
            _ => None,
        };
        if let Some(id_node) = ident {
            if let Ok(text) = id_node.utf8_text(bytes) {
                if text != "self" && text != "cls" {
                    names.push(text.to_string());
                }
            }
        }
    }
    names
}

fn collect_loaded_names(node: tree_sitter::Node, bytes: &[u8]) -> HashSet<String> {
    let mut used = HashSet::new();
    collect_loaded_names_rec(node, bytes, &mut used);
    used
}

fn collect_loaded_names_rec(node: tree_sitter::Node, bytes: &[u8], used: &mut HashSet<String>) {
    if node.kind() == "identifier" {
        if let Some(parent) = node.parent() {
            // A bare identifier as the left side of `=` or as an attribute's
            // object is still a load; only the assignment target itself (and
            // attribute/subscript targets we don't track here) are not.
            if parent.kind() != "function_definition" && parent.kind() != "class_definition" {
                if let Ok(text) = node.utf8_text(bytes) {
                    used.insert(text.to_string());
                }
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_loaded_names_rec(child, bytes, used);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_core::types::*;

    fn sample_repo() -> RepositoryIR {
        let module = ModuleIR {
            id: 0,
            path: PathBuf::from("pkg/mod.py"),
            module_name: "pkg.mod".to_string(),
            file_hash: None,
            imports: vec![ImportEntry {
                kind: ImportKind::Import,
                source_module: None,
                imported_name: "statistics".to_string(),
                alias: None,
            }],
            classes: Vec::new(),
            functions: vec![
                FunctionIR {
                    id: 0,
                    module_id: 0,
                    name: "<module>".to_string(),
                    qualified_name: "pkg.mod.<module>".to_string(),
                    lineno: 1,
                    end_lineno: 1,
                    parent_class_id: None,
                    kind: FunctionKind::Module,
                    is_entrypoint: false,
                    symbol_id: Some("pkg.mod:<module>".to_string()),
                    signature: None,
                    docstring: None,
                    params: Vec::new(),
                    call_sites: Vec::new(),
                },
                FunctionIR {
                    id: 1,
                    module_id: 0,
                    name: "helper".to_string(),
                    qualified_name: "pkg.mod.helper".to_string(),
                    lineno: 3,
                    end_lineno: 4,
                    parent_class_id: None,
                    kind: FunctionKind::Function,
                    is_entrypoint: false,
                    symbol_id: Some("pkg.mod:helper".to_string()),
                    signature: None,
                    docstring: None,
                    params: Vec::new(),
                    call_sites: Vec::new(),
                },
            ],
            entry_symbol_id: None,
        };
        RepositoryIR {
            root: PathBuf::from("/repo"),
            build_timestamp: "2026-01-01T00:00:00Z".to_string(),
            modules: vec![module],
            module_imports: Vec::new(),
            call_edges: Vec::new(),
            console_scripts: Vec::new(),
            config_paths: Vec::new(),
        }
    }

    #[test]
    fn flags_unused_import() {
        let ir = sample_repo();
        let module = &ir.modules[0];
        let config = Config::default();
        let results = check_unused_imports(module, Path::new("pkg/mod.py"), &config);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "UNUSED_IMPORT");
    }

    #[test]
    fn flags_unused_function() {
        let ir = sample_repo();
        let module = &ir.modules[0];
        let config = Config::default();
        let results = check_unused_functions(&ir, module, Path::new("pkg/mod.py"), &config);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].function.as_deref(), Some("helper"));
    }

    #[test]
    fn high_fanout_respects_threshold() {
        let mut ir = sample_repo();
        for i in 0..11u32 {
            ir.call_edges.push(CallEdge {
                caller_function_id: 1,
                callee_function_id: None,
                caller_symbol_id: "pkg.mod:helper".to_string(),
                callee_symbol_id: None,
                lineno: 4,
                target: format!("fn_{i}"),
            });
        }
        let module = &ir.modules[0].clone();
        let mut config = Config::default();
        config.fanout_threshold = 10;
        let results = check_high_fanout(&ir, module, Path::new("pkg/mod.py"), &config);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn call_cycle_detected() {
        let mut ir = sample_repo();
        ir.call_edges.push(CallEdge {
            caller_function_id: 1,
            callee_function_id: Some(1),
            caller_symbol_id: "pkg.mod:helper".to_string(),
            callee_symbol_id: Some("pkg.mod:helper".to_string()),
            lineno: 4,
            target: "helper".to_string(),
        });
        let module = &ir.modules[0].clone();
        let config = Config::default();
        let results = check_call_cycles(&ir, module, Path::new("pkg/mod.py"), &config);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "CALL_CYCLE");
    }
}
