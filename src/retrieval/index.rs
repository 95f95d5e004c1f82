//! Namespaced in-memory embedding index.
//!
//! Upserts are keyed deterministically by (source_id, segment offset) so
//! re-running the offline indexer never duplicates a segment. Namespaces
//! are hard-isolated and each namespace pins the embedding model it was
//! first populated with; mismatched models fail loudly instead of
//! silently degrading relevance.
//!
//! Writes happen only during offline indexing; conversation-time traffic
//! is concurrent reads, which the RwLock admits without coordination.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::IndexError;

/// One indexed segment. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Identifier of the source document.
    pub source_id: String,
    /// Byte offset of the segment within the source document. Together
    /// with `source_id` this is the entry's identity.
    pub offset: usize,
    /// The segment text.
    pub segment_text: String,
    /// Free-form source metadata (title, jurisdiction, tags).
    pub source_metadata: serde_json::Value,
    /// The embedding vector.
    pub vector: Vec<f32>,
}

/// Equality filter against a field of `source_metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub field: String,
    pub equals: serde_json::Value,
}

impl QueryFilter {
    fn matches(&self, metadata: &serde_json::Value) -> bool {
        metadata.get(&self.field) == Some(&self.equals)
    }
}

/// A ranked candidate returned by `query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    pub source_id: String,
    pub offset: usize,
    pub segment_text: String,
    pub source_metadata: serde_json::Value,
    /// Cosine similarity to the query vector.
    pub score: f32,
}

/// Outcome of one upsert batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpsertStats {
    pub inserted: usize,
    pub updated: usize,
}

struct NamespaceIndex {
    /// Embedding model this namespace is pinned to.
    model_name: String,
    dimension: usize,
    entries: HashMap<(String, usize), IndexEntry>,
}

/// The namespaced vector store.
pub struct EmbeddingIndex {
    namespaces: RwLock<HashMap<String, NamespaceIndex>>,
}

impl EmbeddingIndex {
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or overwrite entries in `namespace`. The first successful
    /// upsert pins the namespace to `model_name` and the entries'
    /// dimension; later upserts must match both. The batch is validated
    /// up front, so a rejected batch writes nothing.
    pub async fn upsert(
        &self,
        namespace: &str,
        model_name: &str,
        entries: Vec<IndexEntry>,
    ) -> Result<UpsertStats, IndexError> {
        let mut stats = UpsertStats {
            inserted: 0,
            updated: 0,
        };
        if entries.is_empty() {
            return Ok(stats);
        }

        let mut namespaces = self.namespaces.write().await;

        // Validate the whole batch before the first write so a bad entry
        // leaves the namespace untouched (and an unknown namespace
        // uncreated and unpinned).
        if let Some(ns) = namespaces.get(namespace) {
            if ns.model_name != model_name {
                return Err(IndexError::ModelMismatch {
                    namespace: namespace.to_string(),
                    expected: ns.model_name.clone(),
                    actual: model_name.to_string(),
                });
            }
        }
        let dimension = namespaces
            .get(namespace)
            .map(|ns| ns.dimension)
            .unwrap_or_else(|| entries[0].vector.len());
        for entry in &entries {
            if entry.vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    namespace: namespace.to_string(),
                    expected: dimension,
                    actual: entry.vector.len(),
                });
            }
            if norm(&entry.vector) == 0.0 {
                return Err(IndexError::DegenerateVector(format!(
                    "zero vector for {}#{}",
                    entry.source_id, entry.offset
                )));
            }
        }

        let ns = namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| NamespaceIndex {
                model_name: model_name.to_string(),
                dimension,
                entries: HashMap::new(),
            });
        for entry in entries {
            let key = (entry.source_id.clone(), entry.offset);
            if ns.entries.insert(key, entry).is_some() {
                stats.updated += 1;
            } else {
                stats.inserted += 1;
            }
        }

        tracing::debug!(
            namespace,
            inserted = stats.inserted,
            updated = stats.updated,
            "Upserted index entries"
        );
        Ok(stats)
    }

    /// Nearest-neighbor search in `namespace`, ranked by cosine similarity
    /// descending, ties broken by entry key for determinism. An unknown or
    /// empty namespace returns an empty list, not an error.
    pub async fn query(
        &self,
        vector: &[f32],
        namespace: &str,
        model_name: &str,
        top_k: usize,
        filter: Option<&QueryFilter>,
    ) -> Result<Vec<ScoredMatch>, IndexError> {
        if norm(vector) == 0.0 {
            return Err(IndexError::DegenerateVector(
                "query vector has zero norm".to_string(),
            ));
        }

        let namespaces = self.namespaces.read().await;
        let Some(ns) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        if ns.model_name != model_name {
            return Err(IndexError::ModelMismatch {
                namespace: namespace.to_string(),
                expected: ns.model_name.clone(),
                actual: model_name.to_string(),
            });
        }
        if vector.len() != ns.dimension {
            return Err(IndexError::DimensionMismatch {
                namespace: namespace.to_string(),
                expected: ns.dimension,
                actual: vector.len(),
            });
        }

        let mut matches: Vec<ScoredMatch> = ns
            .entries
            .values()
            .filter(|entry| filter.is_none_or(|f| f.matches(&entry.source_metadata)))
            .map(|entry| ScoredMatch {
                source_id: entry.source_id.clone(),
                offset: entry.offset,
                segment_text: entry.segment_text.clone(),
                source_metadata: entry.source_metadata.clone(),
                score: cosine_similarity(vector, &entry.vector),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| (&a.source_id, a.offset).cmp(&(&b.source_id, b.offset)))
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    /// Number of entries in a namespace (0 for unknown namespaces).
    pub async fn namespace_len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .map(|ns| ns.entries.len())
            .unwrap_or(0)
    }

}

impl Default for EmbeddingIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let denom = norm(a) * norm(b);
    if denom == 0.0 { 0.0 } else { dot / denom }
}
