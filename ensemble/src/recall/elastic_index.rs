//! Elasticsearch-backed vector index (feature `elastic`).
//!
//! Talks plain JSON over HTTP: creates the index with a `dense_vector`
//! mapping on first use, writes documents, and issues k-NN searches.
//! Elasticsearch's own indexing/ranking internals are opaque here.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::recall::document::{Document, KnnHit};
use crate::recall::index::VectorIndex;
use crate::recall::RecallError;

/// Vector index over an Elasticsearch dense_vector field.
///
/// **Interaction**: Construct, then call `ensure_index()` once at startup;
/// `MemoryService` drives `index`/`knn`.
pub struct ElasticIndex {
    client: reqwest::Client,
    base_url: String,
    index_name: String,
    dims: usize,
}

impl ElasticIndex {
    /// `base_url` like "http://localhost:9200"; `dims` must match the embedder.
    pub fn new(base_url: impl Into<String>, index_name: impl Into<String>, dims: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index_name: index_name.into(),
            dims,
        }
    }

    fn index_url(&self, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, self.index_name, suffix)
    }

    /// Index mapping: text field plus a cosine dense_vector of `dims`.
    fn mapping(&self) -> Value {
        json!({
            "mappings": {
                "properties": {
                    "text": { "type": "text" },
                    "embedding": {
                        "type": "dense_vector",
                        "dims": self.dims,
                        "index": true,
                        "similarity": "cosine"
                    }
                }
            }
        })
    }

    /// Creates the index with the dense_vector mapping if it does not exist.
    pub async fn ensure_index(&self) -> Result<(), RecallError> {
        let head = self
            .client
            .head(self.index_url(""))
            .send()
            .await
            .map_err(|e| RecallError::Index(e.to_string()))?;
        if head.status().is_success() {
            return Ok(());
        }

        let response = self
            .client
            .put(self.index_url(""))
            .json(&self.mapping())
            .send()
            .await
            .map_err(|e| RecallError::Index(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecallError::Index(format!(
                "index creation failed ({}): {}",
                status, body
            )));
        }
        Ok(())
    }

    /// k-NN search body: `num_candidates` scales with k for recall.
    fn knn_query(query_vector: &[f32], k: usize) -> Value {
        json!({
            "size": k,
            "knn": {
                "field": "embedding",
                "query_vector": query_vector,
                "k": k,
                "num_candidates": (k * 4).max(10)
            },
            "_source": ["text"]
        })
    }
}

#[async_trait]
impl VectorIndex for ElasticIndex {
    async fn index(&self, document: Document) -> Result<(), RecallError> {
        let response = self
            .client
            .post(self.index_url("/_doc"))
            .json(&json!({
                "text": document.text,
                "embedding": document.embedding,
            }))
            .send()
            .await
            .map_err(|e| RecallError::Index(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecallError::Index(format!(
                "document indexing failed ({}): {}",
                status, body
            )));
        }
        Ok(())
    }

    async fn knn(&self, query_vector: &[f32], k: usize) -> Result<Vec<KnnHit>, RecallError> {
        let response = self
            .client
            .post(self.index_url("/_search"))
            .json(&Self::knn_query(query_vector, k))
            .send()
            .await
            .map_err(|e| RecallError::Index(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecallError::Index(format!(
                "knn search failed ({}): {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RecallError::Index(e.to_string()))?;
        let hits = body["hits"]["hits"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                let text = hit["_source"]["text"].as_str()?.to_string();
                let score = hit["_score"].as_f64()? as f32;
                Some(KnnHit { text, score })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: The knn query body carries size, field, k, and candidate count.
    #[test]
    fn knn_query_shape() {
        let q = ElasticIndex::knn_query(&[0.1, 0.2], 5);
        assert_eq!(q["size"], 5);
        assert_eq!(q["knn"]["field"], "embedding");
        assert_eq!(q["knn"]["k"], 5);
        assert_eq!(q["knn"]["num_candidates"], 20);
        assert_eq!(q["_source"][0], "text");
    }

    /// **Scenario**: num_candidates never drops below 10 for tiny k.
    #[test]
    fn knn_query_min_candidates() {
        let q = ElasticIndex::knn_query(&[0.1], 1);
        assert_eq!(q["knn"]["num_candidates"], 10);
    }

    /// **Scenario**: Mapping declares a cosine dense_vector of the configured dims.
    #[test]
    fn mapping_declares_dense_vector() {
        let idx = ElasticIndex::new("http://localhost:9200/", "memories", 384);
        let m = idx.mapping();
        let embedding = &m["mappings"]["properties"]["embedding"];
        assert_eq!(embedding["type"], "dense_vector");
        assert_eq!(embedding["dims"], 384);
        assert_eq!(embedding["similarity"], "cosine");
        // Trailing slash on base_url is normalized away.
        assert_eq!(idx.index_url("/_doc"), "http://localhost:9200/memories/_doc");
    }
}
