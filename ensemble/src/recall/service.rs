//! Memory service: remember conversation chunks, answer k-NN queries.
//!
//! Thin composition of an `Embedder` and a `VectorIndex`; this is what the
//! recall agent and the `/memory` routes talk to.

use std::sync::Arc;

use tracing::debug;

use crate::recall::document::{Document, KnnResponse};
use crate::recall::embedder::Embedder;
use crate::recall::index::VectorIndex;
use crate::recall::RecallError;

/// Semantic memory service.
///
/// **Interaction**: `remember_conversation` is fed finished conversations
/// (one chunk per message or turn); `knn` serves the recall agent's tool and
/// the `/memory/knn` route.
#[derive(Clone)]
pub struct MemoryService {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl MemoryService {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Vector dimensionality of the underlying embedder.
    pub fn dims(&self) -> usize {
        self.embedder.dims()
    }

    /// Embeds and indexes each chunk of a conversation. Empty chunks are skipped.
    pub async fn remember_conversation(&self, chunks: &[String]) -> Result<(), RecallError> {
        for chunk in chunks {
            if chunk.trim().is_empty() {
                continue;
            }
            let vectors = self.embedder.embed(&[chunk.as_str()]).await?;
            let embedding = vectors
                .into_iter()
                .next()
                .ok_or_else(|| RecallError::Embedding("no vector returned".into()))?;
            self.index
                .index(Document {
                    text: chunk.clone(),
                    embedding,
                })
                .await?;
        }
        debug!(chunks = chunks.len(), "conversation remembered");
        Ok(())
    }

    /// k nearest neighbours of `query`, ranked best first. k is clamped to ≥ 1.
    pub async fn knn(&self, query: &str, k: usize) -> Result<KnnResponse, RecallError> {
        let k = k.max(1);
        let vectors = self.embedder.embed(&[query]).await?;
        let query_vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| RecallError::Embedding("no vector returned".into()))?;
        let hits = self.index.knn(&query_vector, k).await?;
        debug!(query, k, hits = hits.len(), "knn query served");
        Ok(KnnResponse::ranked(hits))
    }
}
