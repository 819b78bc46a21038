//! Builds the deterministic text documents that get embedded for semantic
//! search, one per non-module function.

use std::collections::HashMap;

use neuro_core::toon::embeddings::EmbeddingItem;
use neuro_core::types::{FunctionId, RepositoryIR};

/// Build one embedding document per non-module function, sorted by module
/// name then line number so the output is stable across runs.
pub fn build_embedding_items(ir: &RepositoryIR) -> Vec<EmbeddingItem> {
    let fn_by_id: HashMap<FunctionId, (&str, &neuro_core::types::FunctionIR)> = ir
        .modules
        .iter()
        .flat_map(|m| m.functions.iter().map(move |f| (f.id, (m.module_name.as_str(), f))))
        .collect();

    let mut outgoing: HashMap<FunctionId, Vec<String>> = HashMap::new();
    for edge in &ir.call_edges {
        let name = match edge.callee_function_id.and_then(|id| fn_by_id.get(&id)) {
            Some((_, f)) => f.qualified_name.clone(),
            None => edge.target.clone(),
        };
        outgoing.entry(edge.caller_function_id).or_default().push(name);
    }

    let mut modules: Vec<&neuro_core::types::ModuleIR> = ir.modules.iter().collect();
    modules.sort_by(|a, b| a.module_name.cmp(&b.module_name));

    let mut items = Vec::new();
    for module in modules {
        let mut functions: Vec<&neuro_core::types::FunctionIR> = module.non_module_functions();
        functions.sort_by_key(|f| f.lineno);

        for fn_ir in functions {
            let signature = fn_ir.signature.clone().unwrap_or_else(|| format!("def {}(...)", fn_ir.qualified_name));

            let mut calls: Vec<String> = outgoing.get(&fn_ir.id).cloned().unwrap_or_default();
            calls.sort();
            calls.dedup();

            let mut text_lines = vec![
                format!("module: {}", module.module_name),
                format!("function: {}", fn_ir.qualified_name),
                format!("lineno: {}", fn_ir.lineno),
                format!("signature: {signature}"),
            ];
            if let Some(doc) = &fn_ir.docstring {
                text_lines.push(format!("docstring: {doc}"));
            }
            if !calls.is_empty() {
                text_lines.push(format!("calls: {}", calls.join(", ")));
            }

            items.push(EmbeddingItem {
                kind: "function".to_string(),
                id: fn_ir.symbol_id.clone().unwrap_or_else(|| fn_ir.qualified_name.clone()),
                module: module.module_name.clone(),
                name: fn_ir.name.clone(),
                file: module.path.to_string_lossy().to_string(),
                lineno: fn_ir.lineno,
                signature,
                docstring: fn_ir.docstring.clone(),
                text: text_lines.join("\n"),
                embedding: Vec::new(),
            });
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_core::types::*;
    use std::path::PathBuf;

    #[test]
    fn builds_one_document_per_non_module_function() {
        let module = ModuleIR {
            id: 0,
            path: PathBuf::from("pkg/mod.py"),
            module_name: "pkg.mod".to_string(),
            file_hash: None,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: vec![
                FunctionIR { id: 0, module_id: 0, name: "<module>".into(), qualified_name: "pkg.mod.<module>".into(), lineno: 1, end_lineno: 1, parent_class_id: None, kind: FunctionKind::Module, is_entrypoint: false, symbol_id: Some("pkg.mod:<module>".into()), signature: None, docstring: None, params: vec![], call_sites: vec![] },
                FunctionIR { id: 1, module_id: 0, name: "greet".into(), qualified_name: "pkg.mod.greet".into(), lineno: 3, end_lineno: 4, parent_class_id: None, kind: FunctionKind::Function, is_entrypoint: false, symbol_id: Some("pkg.mod:greet".into()), signature: Some("def greet(name)".into()), docstring: None, params: vec!["name".into()], call_sites: vec![] },
            ],
            entry_symbol_id: None,
        };
        let ir = RepositoryIR {
            root: PathBuf::from("/repo"),
            build_timestamp: String::new(),
            modules: vec![module],
            module_imports: Vec::new(),
            call_edges: Vec::new(),
            console_scripts: Vec::new(),
            config_paths: Vec::new(),
        };
        let items = build_embedding_items(&ir);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "pkg.mod:greet");
        assert!(items[0].text.contains("function: pkg.mod.greet"));
    }
}
