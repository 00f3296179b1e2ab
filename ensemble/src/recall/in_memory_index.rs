//! Pure in-memory vector index: cosine similarity over a dashmap.
//!
//! All data lives in memory and is lost when the index is dropped. Use
//! `ElasticIndex` (feature `elastic`) for a real deployment.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::recall::document::{Document, KnnHit};
use crate::recall::index::VectorIndex;
use crate::recall::RecallError;

/// In-memory vector index for dev and tests.
pub struct InMemoryIndex {
    data: DashMap<u64, Document>,
    next_id: AtomicU64,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cosine similarity; 0.0 when either vector has zero magnitude.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot / (norm_a * norm_b)
        }
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn index(&self, document: Document) -> Result<(), RecallError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.data.insert(id, document);
        Ok(())
    }

    async fn knn(&self, query_vector: &[f32], k: usize) -> Result<Vec<KnnHit>, RecallError> {
        let mut hits: Vec<KnnHit> = self
            .data
            .iter()
            .map(|entry| KnnHit {
                text: entry.text.clone(),
                score: Self::cosine_similarity(query_vector, &entry.embedding),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, embedding: Vec<f32>) -> Document {
        Document {
            text: text.into(),
            embedding,
        }
    }

    /// **Scenario**: knn returns the k closest documents best first.
    #[tokio::test]
    async fn knn_returns_closest_first() {
        let index = InMemoryIndex::new();
        index.index(doc("x-axis", vec![1.0, 0.0])).await.unwrap();
        index.index(doc("y-axis", vec![0.0, 1.0])).await.unwrap();
        index.index(doc("diagonal", vec![1.0, 1.0])).await.unwrap();

        let hits = index.knn(&[1.0, 0.1], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "x-axis");
        assert_eq!(hits[1].text, "diagonal");
        assert!(hits[0].score > hits[1].score);
    }

    /// **Scenario**: k larger than the corpus returns everything; empty index returns nothing.
    #[tokio::test]
    async fn knn_bounds() {
        let index = InMemoryIndex::new();
        assert!(index.knn(&[1.0], 5).await.unwrap().is_empty());
        index.index(doc("only", vec![1.0])).await.unwrap();
        assert_eq!(index.knn(&[1.0], 5).await.unwrap().len(), 1);
    }

    /// **Scenario**: Zero-magnitude vectors score 0.0 instead of NaN.
    #[test]
    fn cosine_zero_vector_is_zero() {
        assert_eq!(InMemoryIndex::cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
