//! Embedder trait and a deterministic offline implementation.
//!
//! The embedding model is an opaque text → vector function; `dims()` is a
//! property of the embedder and must match the index mapping.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::recall::RecallError;

/// Default dimensionality for the offline embedder; matches the mapping the
/// memory index is created with when nothing else is configured.
pub const DEFAULT_DIMS: usize = 384;

/// Turns text into dense vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Vector dimensionality; every returned vector has this length.
    fn dims(&self) -> usize;

    /// Embed each text; one vector per input, in order.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RecallError>;
}

/// Deterministic bag-of-tokens embedder for tests and offline runs.
///
/// Each lowercased whitespace token hashes to one dimension; vectors are
/// L2-normalized so cosine similarity reflects token overlap. Not a semantic
/// model, but stable and dependency-free.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMS)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RecallError> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0f32; self.dims];
                for token in text.to_lowercase().split_whitespace() {
                    let mut hasher = DefaultHasher::new();
                    token.hash(&mut hasher);
                    let bucket = (hasher.finish() as usize) % self.dims;
                    v[bucket] += 1.0;
                }
                let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for x in &mut v {
                        *x /= norm;
                    }
                }
                v
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    /// **Scenario**: Same text embeds to the same vector; vectors have dims() length.
    #[tokio::test]
    async fn hash_embedder_is_deterministic() {
        let e = HashEmbedder::new(64);
        let a = e.embed(&["hello world"]).await.unwrap();
        let b = e.embed(&["hello world"]).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].len(), 64);
    }

    /// **Scenario**: Overlapping texts score higher than disjoint texts under cosine.
    #[tokio::test]
    async fn hash_embedder_reflects_token_overlap() {
        let e = HashEmbedder::default();
        let vs = e
            .embed(&[
                "rust borrow checker",
                "the rust borrow checker rules",
                "gardening tips for spring",
            ])
            .await
            .unwrap();
        let near = cosine(&vs[0], &vs[1]);
        let far = cosine(&vs[0], &vs[2]);
        assert!(near > far, "near={} far={}", near, far);
    }
}
