//! The TOON ("table-oriented object notation") format: the line-oriented
//! tabular text format used for every document under `.neurocode/`.

pub mod document;
pub mod embeddings;
pub mod history;
pub mod ir;
pub mod row;

pub use embeddings::{EmbeddingItem, EmbeddingStore};
pub use history::{PatchHistory, PatchHistoryEntry};
pub use ir::{load_repository_ir, repository_ir_from_toon, repository_ir_to_toon, save_repository_ir};

use std::io::Write;
use std::path::Path;

/// Write `contents` to `path` using write-then-rename: write to a sibling
/// temp file, flush, then atomically rename over the target. Falls back to
/// a direct write if the temp file cannot be created in the same directory
/// (e.g. cross-filesystem mounts), so callers never fail outright.
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("toon")
    ));
    match std::fs::File::create(&tmp_path) {
        Ok(mut f) => {
            f.write_all(contents.as_bytes())?;
            f.flush()?;
            std::fs::rename(&tmp_path, path)
        }
        Err(_) => std::fs::write(path, contents),
    }
}
