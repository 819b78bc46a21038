//! Discovers the Python source files that make up a repository.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// One discovered Python source file, with its dotted module name already
/// derived from its repository-relative path.
pub struct WalkEntry {
    pub path: PathBuf,
    pub module_name: String,
}

pub struct FileWalker {
    root: PathBuf,
}

impl FileWalker {
    /// Creates a new file walker rooted at the given directory.
    pub fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf() }
    }

    /// Walks the root directory and returns every `.py` file, respecting
    /// `.gitignore` and a repo-local `.neurocodeignore`.
    pub fn walk(&self) -> Vec<WalkEntry> {
        let mut entries = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .add_custom_ignore_filename(".neurocodeignore")
            .build();

        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(_) => continue,
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.into_path();
            if path.extension().and_then(|e| e.to_str()) != Some("py") {
                continue;
            }
            let module_name = module_name_for(&self.root, &path);
            entries.push(WalkEntry { path, module_name });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }
}

/// Derives a dotted module name from a repository-relative `.py` path.
/// `pkg/sub/mod.py` -> `pkg.sub.mod`; `pkg/__init__.py` -> `pkg`.
fn module_name_for(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut parts: Vec<String> = rel
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if parts.first().map(String::as_str) == Some("src") {
        parts.remove(0);
    }
    if parts.last().map(String::as_str) == Some("__init__") {
        parts.pop();
    }
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_python_files_and_derives_module_names() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pkg/sub")).unwrap();
        fs::write(root.join("pkg/__init__.py"), "").unwrap();
        fs::write(root.join("pkg/sub/mod.py"), "").unwrap();
        fs::write(root.join("README.md"), "# hi").unwrap();

        let entries = FileWalker::new(root).walk();
        let names: Vec<_> = entries.iter().map(|e| e.module_name.as_str()).collect();
        assert_eq!(names, vec!["pkg", "pkg.sub.mod"]);
    }

    #[test]
    fn respects_neurocodeignore() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::write(root.join("app.py"), "").unwrap();
        fs::write(root.join("vendor/lib.py"), "").unwrap();
        fs::write(root.join(".neurocodeignore"), "vendor/\n").unwrap();

        let entries = FileWalker::new(root).walk();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].module_name, "app");
    }
}
