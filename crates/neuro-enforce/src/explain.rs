//! Assembles the LLM-ready explain bundle and the plain module summary that
//! backs the `explain` command (§4.9).

use std::collections::HashSet;
use std::path::Path;

use neuro_core::error::{NeurocodeError, Result};
use neuro_core::toon::embeddings::EmbeddingStore;
use neuro_core::types::{ClassIR, FunctionIR, ModuleIR, RepositoryIR};

use crate::checks::check_module;
use crate::query::resolve_function;
use crate::search::{resolve_like_symbol, search_embeddings};
use crate::types::{
    CallGraphNeighbor, ClassSummary, ExplainBundle, ExplainResult, FunctionSummary, ImportSummary,
    ModuleSummary, SemanticNeighbor, SourceDocument, SourceSlice,
};

const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
const SOURCE_CAP: usize = 20_000;
const SLICE_CAP: usize = 40_000;
pub const DEFAULT_NEIGHBOR_K: usize = 5;

fn truncate_bytes(text: &str, cap: usize) -> (String, bool) {
    if text.len() <= cap {
        (text.to_string(), false)
    } else {
        let mut end = cap;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        (text[..end].to_string(), true)
    }
}

pub fn module_for_file<'a>(ir: &'a RepositoryIR, repo_root: &Path, file: &Path) -> Result<&'a ModuleIR> {
    let rel = file.strip_prefix(repo_root).unwrap_or(file);
    ir.modules
        .iter()
        .find(|m| m.path == rel)
        .ok_or_else(|| NeurocodeError::SymbolNotFound(format!("no module recorded for {}", file.display())))
}

fn function_summary(f: &FunctionIR) -> FunctionSummary {
    FunctionSummary {
        symbol_id: f.symbol_id.clone().unwrap_or_else(|| f.qualified_name.clone()),
        name: f.name.clone(),
        qualified_name: f.qualified_name.clone(),
        kind: f.kind.as_str().to_string(),
        lineno: f.lineno,
        end_lineno: f.end_lineno,
        signature: f.signature.clone(),
        docstring: f.docstring.clone(),
        is_entrypoint: f.is_entrypoint,
    }
}

fn class_summary(class: &ClassIR, ir: &RepositoryIR) -> ClassSummary {
    ClassSummary {
        qualified_name: class.qualified_name.clone(),
        name: class.name.clone(),
        lineno: class.lineno,
        bases: class.bases.clone(),
        methods: ir.methods_of(class.id).iter().map(|f| f.name.clone()).collect(),
    }
}

pub fn build_module_summary(ir: &RepositoryIR, module: &ModuleIR) -> ModuleSummary {
    let mut functions: Vec<FunctionSummary> = module.non_module_functions().map(function_summary).collect();
    functions.sort_by(|a, b| a.lineno.cmp(&b.lineno));

    let mut classes: Vec<ClassSummary> = module.classes.iter().map(|c| class_summary(c, ir)).collect();
    classes.sort_by(|a, b| a.lineno.cmp(&b.lineno));

    let imports = module
        .imports
        .iter()
        .map(|i| ImportSummary {
            kind: i.kind.as_str().to_string(),
            module: i.source_module.clone(),
            name: i.imported_name.clone(),
            alias: i.alias.clone(),
        })
        .collect();

    ModuleSummary { module: module.module_name.clone(), path: module.path.display().to_string(), imports, functions, classes }
}

pub fn explain_module(ir: &RepositoryIR, repo_root: &Path, file: &Path) -> Result<ExplainResult> {
    let module = module_for_file(ir, repo_root, file)?;
    Ok(ExplainResult {
        engine_version: ENGINE_VERSION.to_string(),
        root: repo_root.display().to_string(),
        file: module.path.display().to_string(),
        module: build_module_summary(ir, module),
    })
}

fn neighbor(ir: &RepositoryIR, repo_root: &Path, f: &FunctionIR) -> CallGraphNeighbor {
    let module = ir.module_by_id(f.module_id).expect("function references known module");
    CallGraphNeighbor {
        symbol_id: f.symbol_id.clone().unwrap_or_else(|| f.qualified_name.clone()),
        qualified_name: f.qualified_name.clone(),
        module: module.module_name.clone(),
        file: repo_root.join(&module.path).display().to_string(),
        lineno: f.lineno,
    }
}

fn callers_of(ir: &RepositoryIR, repo_root: &Path, target: &FunctionIR) -> Vec<CallGraphNeighbor> {
    let mut ids: Vec<_> = ir
        .call_edges
        .iter()
        .filter(|e| e.callee_function_id == Some(target.id))
        .map(|e| e.caller_function_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    ids.sort_unstable();
    ids.iter().filter_map(|&id| ir.function_by_id(id)).map(|f| neighbor(ir, repo_root, f)).collect()
}

fn callees_of(ir: &RepositoryIR, repo_root: &Path, target: &FunctionIR) -> Vec<CallGraphNeighbor> {
    let mut ids: Vec<_> = ir
        .call_edges
        .iter()
        .filter(|e| e.caller_function_id == target.id)
        .filter_map(|e| e.callee_function_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    ids.sort_unstable();
    ids.iter().filter_map(|&id| ir.function_by_id(id)).map(|f| neighbor(ir, repo_root, f)).collect()
}

fn slice_for(source: &str, f: &FunctionIR) -> SourceSlice {
    let lines: Vec<&str> = source.lines().collect();
    let start = f.lineno.saturating_sub(1) as usize;
    let end = (f.end_lineno as usize).min(lines.len());
    let code = if start < end { lines[start..end].join("\n") } else { String::new() };
    let (code, truncated) = truncate_bytes(&code, SLICE_CAP);
    SourceSlice { symbol_id: f.symbol_id.clone().unwrap_or_else(|| f.qualified_name.clone()), code, truncated }
}

/// Builds the full explain bundle for `file`, optionally anchored to
/// `symbol`. Missing embeddings degrade `semantic_neighbors` to an empty,
/// unavailable list rather than failing the bundle.
#[allow(clippy::too_many_arguments)]
pub fn build_explain_bundle(
    ir: &RepositoryIR,
    repo_root: &Path,
    file: &Path,
    symbol: Option<&str>,
    config: &neuro_core::config::Config,
    embeddings: Option<&EmbeddingStore>,
    k: usize,
) -> Result<ExplainBundle> {
    let module = module_for_file(ir, repo_root, file)?;
    let module_summary = build_module_summary(ir, module);

    let target = symbol.map(|s| resolve_function(ir, s)).transpose()?;

    let (callers, callees) = match target {
        Some(f) => (callers_of(ir, repo_root, f), callees_of(ir, repo_root, f)),
        None => (Vec::new(), Vec::new()),
    };

    let abs_file = repo_root.join(&module.path);
    let checks = check_module(ir, module, &abs_file, config).into_iter().map(Into::into).collect();

    let source_text = std::fs::read_to_string(&abs_file).unwrap_or_default();
    let (text, truncated) = truncate_bytes(&source_text, SOURCE_CAP);
    let source = SourceDocument { text, truncated };

    let mut slices = Vec::new();
    if let Some(f) = target {
        slices.push(slice_for(&source_text, f));
    }
    for n in callers.iter().chain(callees.iter()) {
        if let Some(f) = ir.functions().find(|f| f.symbol_id.as_deref() == Some(n.symbol_id.as_str())) {
            slices.push(slice_for(&source_text, f));
        }
    }

    let semantic_neighbors = semantic_neighbors_for(ir, repo_root, embeddings, target, k);

    Ok(ExplainBundle {
        engine_version: ENGINE_VERSION.to_string(),
        root: repo_root.display().to_string(),
        file: module.path.display().to_string(),
        module: module_summary,
        target: target.map(function_summary),
        callers,
        callees,
        checks,
        semantic_neighbors,
        source,
        slices,
    })
}

fn semantic_neighbors_for(
    ir: &RepositoryIR,
    repo_root: &Path,
    embeddings: Option<&EmbeddingStore>,
    target: Option<&FunctionIR>,
    k: usize,
) -> Vec<SemanticNeighbor> {
    let (Some(store), Some(target)) = (embeddings, target) else {
        return Vec::new();
    };
    let symbol_id = target.symbol_id.clone().unwrap_or_else(|| target.qualified_name.clone());
    let Ok(item) = resolve_like_symbol(store, &symbol_id) else {
        return Vec::new();
    };
    let hits = search_embeddings(store, &item.embedding, None, k + 1);
    hits.into_iter()
        .filter(|h| h.id != item.id)
        .take(k)
        .map(|h| {
            let module = repo_root.to_path_buf();
            let file = ir
                .functions()
                .find(|f| f.symbol_id.as_deref() == Some(h.id.as_str()) || f.qualified_name == h.id)
                .and_then(|f| ir.module_by_id(f.module_id))
                .map(|m| module.join(&m.path).display().to_string())
                .unwrap_or_else(|| h.file.clone());
            SemanticNeighbor {
                symbol_id: h.id,
                qualified_name: h.name,
                module: h.module,
                file,
                lineno: h.lineno,
                score: h.score,
                available: true,
            }
        })
        .collect()
}
