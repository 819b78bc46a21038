//! Orchestrates a full repository build: walk, parallel per-file extraction,
//! then the resolver's two serialized passes.

use std::path::Path;

use rayon::prelude::*;

use neuro_core::hash::hash_file_content;
use neuro_core::types::{ModuleIR, RepositoryIR};

use crate::python::PyExtractor;
use crate::resolver::resolve_repository;
use crate::walker::FileWalker;

/// Builds a fresh [`RepositoryIR`] by walking `root` for `.py` files,
/// extracting each in parallel, and resolving ids and call edges serially.
///
/// Unreadable or unparseable files are skipped with a warning on stderr;
/// a single bad file never aborts the build (§4.1).
pub fn build_repository_ir(root: &Path, build_timestamp: String) -> RepositoryIR {
    let entries = FileWalker::new(root).walk();

    let mut modules: Vec<Option<ModuleIR>> = entries
        .par_iter()
        .enumerate()
        .map(|(idx, entry)| {
            let bytes = match std::fs::read(&entry.path) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("[neurocode] warning: skipping {}: {e}", entry.path.display());
                    return None;
                }
            };
            let source = match String::from_utf8(bytes.clone()) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("[neurocode] warning: skipping {}: {e}", entry.path.display());
                    return None;
                }
            };
            let mut extractor = PyExtractor::new();
            match extractor.extract(idx as u32, &entry.path, &entry.module_name, &source) {
                Ok(mut module) => {
                    module.file_hash = Some(hash_file_content(&bytes));
                    let rel = entry.path.strip_prefix(root).unwrap_or(&entry.path).to_path_buf();
                    module.path = rel;
                    Some(module)
                }
                Err(e) => {
                    eprintln!("[neurocode] warning: skipping {}: {e}", entry.path.display());
                    None
                }
            }
        })
        .collect();

    // Discovery order is the walker's sorted path order (fixed regardless of
    // which parallel task finished first); reassign dense module ids to
    // match since some files may have been skipped, and propagate the new
    // id to every function/class the extractor tagged with the old one.
    let mut ordered: Vec<ModuleIR> = modules.drain(..).flatten().collect();
    for (new_id, module) in ordered.iter_mut().enumerate() {
        let new_id = new_id as u32;
        module.id = new_id;
        for func in module.functions.iter_mut() {
            func.module_id = new_id;
        }
        for class in module.classes.iter_mut() {
            class.module_id = new_id;
        }
    }

    let (modules, call_edges, module_imports) = resolve_repository(ordered);

    RepositoryIR {
        root: root.to_path_buf(),
        build_timestamp,
        modules,
        module_imports,
        call_edges,
        console_scripts: Vec::new(),
        config_paths: Vec::new(),
    }
}
