//! Vector index trait: store documents, answer k-NN queries.

use async_trait::async_trait;

use crate::recall::document::{Document, KnnHit};
use crate::recall::RecallError;

/// A store of embedded documents answering nearest-neighbour queries.
///
/// **Interaction**: `MemoryService` writes via `index` and reads via `knn`;
/// hits come back sorted by score descending.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Stores one document.
    async fn index(&self, document: Document) -> Result<(), RecallError>;

    /// Returns up to `k` nearest neighbours of `query_vector`, best first.
    async fn knn(&self, query_vector: &[f32], k: usize) -> Result<Vec<KnnHit>, RecallError>;
}
