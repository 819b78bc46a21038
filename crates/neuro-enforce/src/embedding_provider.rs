//! The embedding-provider capability the engine embeds against, plus the
//! offline deterministic provider shipped for tests and no-network use.

use neuro_core::error::Result;
use sha2::{Digest, Sha256};

/// A single synchronous batch-embedding operation. Implementations must
/// return one vector per input text, all of equal dimension.
pub trait EmbeddingProvider {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Identifier stored alongside vectors so a later search can detect a
    /// model mismatch between the store and the caller.
    fn model_name(&self) -> &str;
}

/// Deterministic, hash-derived embeddings requiring no network access. Must
/// be explicitly selected (`--provider dummy`) or allowed by configuration —
/// never silently substituted for a real provider.
pub struct DummyEmbeddingProvider {
    dim: usize,
}

impl DummyEmbeddingProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for DummyEmbeddingProvider {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EmbeddingProvider for DummyEmbeddingProvider {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| hash_embed(t, self.dim)).collect())
    }

    fn model_name(&self) -> &str {
        "dummy-v1"
    }
}

fn hash_embed(text: &str, dim: usize) -> Vec<f32> {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = Vec::with_capacity(dim);
    for i in 0..dim {
        let b = digest[i % digest.len()];
        out.push((b as f32) / 255.0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_provider_is_deterministic() {
        let provider = DummyEmbeddingProvider::default();
        let a = provider.embed_batch(&["hello".to_string()]).unwrap();
        let b = provider.embed_batch(&["hello".to_string()]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn dummy_provider_differs_by_text() {
        let provider = DummyEmbeddingProvider::default();
        let a = provider.embed_batch(&["hello".to_string()]).unwrap();
        let b = provider.embed_batch(&["world".to_string()]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn vectors_have_requested_dimension() {
        let provider = DummyEmbeddingProvider::new(16);
        let v = provider.embed_batch(&["x".to_string()]).unwrap();
        assert_eq!(v[0].len(), 16);
    }
}
