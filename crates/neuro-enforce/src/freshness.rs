//! Hash-based per-module staleness detection (§4.4).

use std::path::Path;

use neuro_core::hash::hash_file_content;
use neuro_core::types::{ModuleIR, RepositoryIR};

use crate::types::{ModuleFreshness, ModuleFreshnessEntry};

/// Compares a module's recorded `file_hash` against the bytes on disk.
pub fn module_freshness(repo_root: &Path, module: &ModuleIR) -> ModuleFreshness {
    let Some(recorded) = &module.file_hash else {
        return ModuleFreshness::Unknown;
    };
    let path = repo_root.join(&module.path);
    match std::fs::read(&path) {
        Ok(bytes) => {
            if &hash_file_content(&bytes) == recorded {
                ModuleFreshness::Fresh
            } else {
                ModuleFreshness::Stale
            }
        }
        Err(_) => ModuleFreshness::Missing,
    }
}

/// Repository-level freshness is the conjunction over all modules.
pub fn repository_is_fresh(repo_root: &Path, ir: &RepositoryIR) -> bool {
    ir.modules.iter().all(|m| module_freshness(repo_root, m) == ModuleFreshness::Fresh)
}

pub fn freshness_entries(repo_root: &Path, ir: &RepositoryIR) -> Vec<ModuleFreshnessEntry> {
    ir.modules
        .iter()
        .map(|m| ModuleFreshnessEntry {
            module: m.module_name.clone(),
            path: m.path.display().to_string(),
            status: module_freshness(repo_root, m),
        })
        .collect()
}

/// Freshness of the single module that owns `file`, used by `check` to
/// surface a staleness warning alongside findings.
pub fn module_for_file<'a>(ir: &'a RepositoryIR, repo_root: &Path, file: &Path) -> Option<&'a ModuleIR> {
    let rel = file.strip_prefix(repo_root).unwrap_or(file);
    ir.modules.iter().find(|m| m.path == rel)
}

pub fn stale_warning(repo_root: &Path, ir: &RepositoryIR, file: &Path) -> Option<String> {
    let module = module_for_file(ir, repo_root, file)?;
    match module_freshness(repo_root, module) {
        ModuleFreshness::Fresh => None,
        status => Some(format!(
            "IR for module '{}' is {} relative to the file on disk; rerun `neurocode ir` for up-to-date results",
            module.module_name,
            status.as_str()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_core::types::{CallEdge, FunctionIR, FunctionKind};
    use std::path::PathBuf;

    fn module_with_hash(hash: Option<&str>) -> ModuleIR {
        ModuleIR {
            id: 0,
            path: PathBuf::from("pkg/mod.py"),
            module_name: "pkg.mod".to_string(),
            file_hash: hash.map(|h| h.to_string()),
            imports: Vec::new(),
            classes: Vec::new(),
            functions: vec![FunctionIR {
                id: 0,
                module_id: 0,
                name: "__module__".into(),
                qualified_name: "pkg.mod".into(),
                lineno: 1,
                end_lineno: 1,
                parent_class_id: None,
                kind: FunctionKind::Module,
                is_entrypoint: false,
                symbol_id: None,
                signature: None,
                docstring: None,
                params: vec![],
                call_sites: vec![],
            }],
            entry_symbol_id: None,
        }
    }

    fn repo_with(module: ModuleIR) -> RepositoryIR {
        RepositoryIR {
            root: PathBuf::from("/repo"),
            build_timestamp: String::new(),
            modules: vec![module],
            module_imports: Vec::new(),
            call_edges: Vec::<CallEdge>::new(),
            console_scripts: Vec::new(),
            config_paths: Vec::new(),
        }
    }

    #[test]
    fn unknown_when_no_hash_recorded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/mod.py"), "x = 1\n").unwrap();
        let module = module_with_hash(None);
        assert_eq!(module_freshness(dir.path(), &module), ModuleFreshness::Unknown);
    }

    #[test]
    fn fresh_when_hash_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/mod.py"), "x = 1\n").unwrap();
        let hash = hash_file_content(b"x = 1\n");
        let module = module_with_hash(Some(&hash));
        assert_eq!(module_freshness(dir.path(), &module), ModuleFreshness::Fresh);
    }

    #[test]
    fn stale_when_hash_diverges() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/mod.py"), "x = 2\n").unwrap();
        let hash = hash_file_content(b"x = 1\n");
        let module = module_with_hash(Some(&hash));
        assert_eq!(module_freshness(dir.path(), &module), ModuleFreshness::Stale);
    }

    #[test]
    fn missing_when_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        let hash = hash_file_content(b"x = 1\n");
        let module = module_with_hash(Some(&hash));
        assert_eq!(module_freshness(dir.path(), &module), ModuleFreshness::Missing);
    }

    #[test]
    fn repository_freshness_is_conjunction() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/mod.py"), "x = 1\n").unwrap();
        let hash = hash_file_content(b"x = 1\n");
        let fresh_repo = repo_with(module_with_hash(Some(&hash)));
        assert!(repository_is_fresh(dir.path(), &fresh_repo));

        let stale_repo = repo_with(module_with_hash(Some("00000000000")));
        assert!(!repository_is_fresh(dir.path(), &stale_repo));
    }
}
