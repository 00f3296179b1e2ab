//! Documents and k-NN response types for the memory service.

use serde::{Deserialize, Serialize};

/// One stored memory: text plus its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// One k-NN hit: text and similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnHit {
    pub text: String,
    pub score: f32,
}

/// Ranked k-NN response.
///
/// `Display` renders hit texts best-first, blank-line separated — the plain
/// string handed to the recall agent's LLM as tool output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnnResponse {
    pub hits: Vec<KnnHit>,
}

impl KnnResponse {
    /// Builds a response sorted by score descending.
    pub fn ranked(mut hits: Vec<KnnHit>) -> Self {
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Self { hits }
    }
}

impl std::fmt::Display for KnnResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sorted: Vec<&KnnHit> = self.hits.iter().collect();
        sorted.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        let texts: Vec<&str> = sorted.iter().map(|h| h.text.as_str()).collect();
        write!(f, "{}", texts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: ranked() orders hits by score descending regardless of input order.
    #[test]
    fn ranked_sorts_by_score_desc() {
        let response = KnnResponse::ranked(vec![
            KnnHit { text: "low".into(), score: 0.1 },
            KnnHit { text: "high".into(), score: 0.9 },
            KnnHit { text: "mid".into(), score: 0.5 },
        ]);
        let texts: Vec<&str> = response.hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["high", "mid", "low"]);
    }

    /// **Scenario**: Display joins texts best-first with blank lines.
    #[test]
    fn display_joins_best_first() {
        let response = KnnResponse {
            hits: vec![
                KnnHit { text: "second".into(), score: 0.4 },
                KnnHit { text: "first".into(), score: 0.8 },
            ],
        };
        assert_eq!(response.to_string(), "first\n\nsecond");
    }

    /// **Scenario**: Empty response renders as an empty string.
    #[test]
    fn display_empty() {
        assert_eq!(KnnResponse::default().to_string(), "");
    }
}
