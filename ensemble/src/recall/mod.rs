//! # Semantic recall
//!
//! Embeddings + vector index + k-NN ranking: the memory service behind the
//! recall agent and the `/memory` HTTP routes. Text is embedded by an opaque
//! [`Embedder`], stored in a [`VectorIndex`], and retrieved as a ranked
//! [`KnnResponse`].
//!
//! ## Index implementations
//!
//! | Type             | Persistence   | Feature   |
//! |------------------|---------------|-----------|
//! | [`InMemoryIndex`] | In-memory     | —         |
//! | [`ElasticIndex`]  | Elasticsearch | `elastic` |

mod document;
mod embedder;
mod in_memory_index;
mod index;
mod service;

#[cfg(feature = "elastic")]
mod elastic_index;

pub use document::{Document, KnnHit, KnnResponse};
pub use embedder::{Embedder, HashEmbedder, DEFAULT_DIMS};
pub use in_memory_index::InMemoryIndex;
pub use index::VectorIndex;
pub use service::MemoryService;

#[cfg(feature = "elastic")]
pub use elastic_index::ElasticIndex;

use thiserror::Error;

/// Recall subsystem failure.
#[derive(Debug, Error)]
pub enum RecallError {
    /// Embedding the text failed.
    #[error("embedding failed: {0}")]
    Embedding(String),
    /// The vector index rejected the operation.
    #[error("index operation failed: {0}")]
    Index(String),
}
