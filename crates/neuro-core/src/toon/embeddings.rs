//! Serializer/parser for `ir-embeddings.toon`: the persisted vector store.

use std::path::{Path, PathBuf};

use super::document::{col, parse_document};
use super::row::{escape_value, join_row};

#[derive(Debug, Clone)]
pub struct EmbeddingItem {
    pub kind: String,
    pub id: String,
    pub module: String,
    pub name: String,
    pub file: String,
    pub lineno: u32,
    pub signature: String,
    pub docstring: Option<String>,
    pub text: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    pub version: u32,
    pub engine_version: String,
    pub model: String,
    pub created_at: String,
    pub repo_root: PathBuf,
    pub items: Vec<EmbeddingItem>,
}

impl EmbeddingStore {
    pub fn new(repo_root: PathBuf, engine_version: String, model: String, created_at: String) -> Self {
        Self { version: 1, engine_version, model, created_at, repo_root, items: Vec::new() }
    }
}

pub fn embedding_store_to_toon(store: &EmbeddingStore) -> String {
    let mut lines = Vec::new();
    lines.push("store:".to_string());
    lines.push(format!("  version: {}", store.version));
    lines.push(format!("  engine_version: {}", store.engine_version));
    lines.push(format!("  model: {}", store.model));
    lines.push(format!("  created_at: {}", store.created_at));
    lines.push(format!("  repo_root: {}", store.repo_root.display()));
    lines.push(format!("  num_items: {}", store.items.len()));
    lines.push(String::new());

    lines.push(format!(
        "items[{}]{{kind,id,module,name,file,lineno,signature,docstring,text,embedding}}:",
        store.items.len()
    ));
    for item in &store.items {
        let emb_str: Vec<String> = item.embedding.iter().map(|v| format!("{v:.6}")).collect();
        let row = join_row(&[
            escape_value(&item.kind),
            escape_value(&item.id),
            escape_value(&item.module),
            escape_value(&item.name),
            escape_value(&item.file),
            item.lineno.to_string(),
            escape_value(&item.signature),
            escape_value(item.docstring.as_deref().unwrap_or("")),
            escape_value(&item.text),
            escape_value(&emb_str.join("|")),
        ]);
        lines.push(format!("  {row}"));
    }
    lines.push(String::new());
    lines.join("\n")
}

pub fn embedding_store_from_toon(text: &str) -> Result<EmbeddingStore, String> {
    let doc = parse_document(text, "store");
    let repo_root = doc.header_get("repo_root").ok_or("TOON embedding store missing repo_root")?;

    let mut items = Vec::new();
    for row in doc.table("items") {
        let emb_raw = col(row, "embedding");
        let embedding: Vec<f32> = if emb_raw.is_empty() {
            Vec::new()
        } else {
            emb_raw
                .split('|')
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<f32>().map_err(|_| "bad embedding component".to_string()))
                .collect::<Result<Vec<_>, _>>()?
        };
        let docstring = col(row, "docstring");
        items.push(EmbeddingItem {
            kind: col(row, "kind").to_string(),
            id: col(row, "id").to_string(),
            module: col(row, "module").to_string(),
            name: col(row, "name").to_string(),
            file: col(row, "file").to_string(),
            lineno: col(row, "lineno").parse().unwrap_or(0),
            signature: col(row, "signature").to_string(),
            docstring: if docstring.is_empty() { None } else { Some(docstring.to_string()) },
            text: col(row, "text").to_string(),
            embedding,
        });
    }

    Ok(EmbeddingStore {
        version: doc.header_get("version").and_then(|v| v.parse().ok()).unwrap_or(1),
        engine_version: doc.header_get("engine_version").unwrap_or("").to_string(),
        model: doc.header_get("model").unwrap_or("").to_string(),
        created_at: doc.header_get("created_at").unwrap_or("").to_string(),
        repo_root: PathBuf::from(repo_root),
        items,
    })
}

pub fn load_embedding_store(path: &Path) -> Result<EmbeddingStore, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    embedding_store_from_toon(&text)
}

pub fn save_embedding_store(store: &EmbeddingStore, path: &Path) -> std::io::Result<()> {
    crate::toon::write_atomic(path, &embedding_store_to_toon(store))
}
