//! Cosine-similarity semantic search over a persisted embedding store.

use neuro_core::error::{NeurocodeError, Result};
use neuro_core::toon::embeddings::{EmbeddingItem, EmbeddingStore};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ScoredHit {
    pub id: String,
    pub kind: String,
    pub module: String,
    pub name: String,
    pub file: String,
    pub lineno: u32,
    pub signature: String,
    pub score: f32,
}

impl From<ScoredHit> for crate::types::SearchHit {
    fn from(h: ScoredHit) -> Self {
        crate::types::SearchHit {
            id: h.id,
            qualified_name: h.name,
            module: h.module,
            file: h.file,
            lineno: h.lineno,
            signature: h.signature,
            score: h.score,
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|y| y * y).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn filter_by_module<'a>(items: &[&'a EmbeddingItem], module_filter: Option<&str>) -> Vec<&'a EmbeddingItem> {
    match module_filter {
        None => items.to_vec(),
        Some(filter) => items
            .iter()
            .copied()
            .filter(|item| item.module == filter || item.module.starts_with(&format!("{filter}.")))
            .collect(),
    }
}

pub fn search_embeddings(
    store: &EmbeddingStore,
    query_embedding: &[f32],
    module_filter: Option<&str>,
    k: usize,
) -> Vec<ScoredHit> {
    let functions: Vec<&EmbeddingItem> = store.items.iter().filter(|i| i.kind == "function").collect();
    let candidates = filter_by_module(&functions, module_filter);

    let mut scored: Vec<ScoredHit> = candidates
        .into_iter()
        .map(|item| ScoredHit {
            id: item.id.clone(),
            kind: item.kind.clone(),
            module: item.module.clone(),
            name: item.name.clone(),
            file: item.file.clone(),
            lineno: item.lineno,
            signature: item.signature.clone(),
            score: cosine_similarity(query_embedding, &item.embedding),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}

/// Resolve `--like <symbol>` against a stored embedding, normalizing the
/// `module:qualname` separator to `.` before comparing against stored ids.
pub fn resolve_like_symbol<'a>(store: &'a EmbeddingStore, symbol: &str) -> Result<&'a EmbeddingItem> {
    let normalized = symbol.replace(':', ".");
    store
        .items
        .iter()
        .find(|item| item.id == normalized)
        .ok_or_else(|| NeurocodeError::SymbolNotFound(symbol.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn item(id: &str, module: &str, embedding: Vec<f32>) -> EmbeddingItem {
        EmbeddingItem {
            kind: "function".to_string(),
            id: id.to_string(),
            module: module.to_string(),
            name: id.to_string(),
            file: "pkg/mod.py".to_string(),
            lineno: 1,
            signature: "def f()".to_string(),
            docstring: None,
            text: String::new(),
            embedding,
        }
    }

    #[test]
    fn ranks_by_cosine_similarity() {
        let store = EmbeddingStore {
            version: 1,
            engine_version: "0.1.0".to_string(),
            model: "dummy-v1".to_string(),
            created_at: String::new(),
            repo_root: PathBuf::from("/repo"),
            items: vec![
                item("pkg.mod:a", "pkg.mod", vec![1.0, 0.0]),
                item("pkg.mod:b", "pkg.mod", vec![0.0, 1.0]),
            ],
        };
        let results = search_embeddings(&store, &[1.0, 0.0], None, 10);
        assert_eq!(results[0].id, "pkg.mod:a");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn zero_norm_query_scores_zero() {
        let store = EmbeddingStore {
            version: 1,
            engine_version: String::new(),
            model: String::new(),
            created_at: String::new(),
            repo_root: PathBuf::from("/repo"),
            items: vec![item("pkg.mod:a", "pkg.mod", vec![1.0, 0.0])],
        };
        let results = search_embeddings(&store, &[0.0, 0.0], None, 10);
        assert_eq!(results[0].score, 0.0);
    }

    #[test]
    fn module_filter_restricts_candidates() {
        let store = EmbeddingStore {
            version: 1,
            engine_version: String::new(),
            model: String::new(),
            created_at: String::new(),
            repo_root: PathBuf::from("/repo"),
            items: vec![item("a:x", "pkg.a", vec![1.0]), item("b:y", "pkg.b", vec![1.0])],
        };
        let results = search_embeddings(&store, &[1.0], Some("pkg.a"), 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].module, "pkg.a");
    }
}
