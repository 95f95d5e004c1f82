//! Offline indexing path: chunk → embed → upsert.
//!
//! Exercised once per corpus update, never per conversation. Because
//! chunking is deterministic and upserts are keyed by (source_id, offset),
//! re-running the indexer over the same corpus is idempotent.

use std::sync::Arc;

use serde::Serialize;

use crate::config::ChunkingConfig;
use crate::error::RetrievalError;

use super::chunker::chunk_document;
use super::embedder::Embedder;
use super::index::{EmbeddingIndex, IndexEntry};

/// One document of the corpus to index.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub source_id: String,
    pub text: String,
    /// Metadata stored alongside every segment of this document.
    pub metadata: serde_json::Value,
}

impl SourceDocument {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Outcome of one indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Batch indexer over an externally supplied embedding function.
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    index: Arc<EmbeddingIndex>,
    chunking: ChunkingConfig,
}

impl Indexer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<EmbeddingIndex>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            chunking,
        }
    }

    /// Chunk, embed, and upsert a batch of documents into `namespace`.
    /// Empty documents contribute nothing and are not an error.
    pub async fn index_documents(
        &self,
        documents: &[SourceDocument],
        namespace: &str,
    ) -> Result<IndexReport, RetrievalError> {
        let mut texts = Vec::new();
        let mut pending = Vec::new();

        for doc in documents {
            for chunk in chunk_document(&doc.text, &self.chunking) {
                texts.push(chunk.text.clone());
                pending.push((doc, chunk));
            }
        }

        if pending.is_empty() {
            return Ok(IndexReport {
                documents: documents.len(),
                chunks: 0,
                inserted: 0,
                updated: 0,
            });
        }

        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != pending.len() {
            return Err(RetrievalError::Backend(format!(
                "embedding count mismatch: {} chunks, {} vectors",
                pending.len(),
                vectors.len()
            )));
        }

        let entries: Vec<IndexEntry> = pending
            .into_iter()
            .zip(vectors)
            .map(|((doc, chunk), vector)| IndexEntry {
                source_id: doc.source_id.clone(),
                offset: chunk.offset,
                segment_text: chunk.text,
                source_metadata: doc.metadata.clone(),
                vector,
            })
            .collect();

        let chunk_count = entries.len();
        let stats = self
            .index
            .upsert(namespace, self.embedder.model_name(), entries)
            .await?;

        tracing::info!(
            namespace,
            documents = documents.len(),
            chunks = chunk_count,
            inserted = stats.inserted,
            updated = stats.updated,
            "Indexed corpus batch"
        );

        Ok(IndexReport {
            documents: documents.len(),
            chunks: chunk_count,
            inserted: stats.inserted,
            updated: stats.updated,
        })
    }

    /// Whether `namespace` already holds vectors, so a loader can skip
    /// re-embedding an unchanged corpus.
    pub async fn namespace_is_populated(&self, namespace: &str) -> bool {
        self.index.namespace_len(namespace).await > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetrievalError;
    use async_trait::async_trait;

    /// Token-bucket hash embedder: deterministic, never zero for
    /// non-empty text.
    struct HashEmbedder;

    const DIMS: usize = 16;

    fn hash_vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMS];
        for token in text.split_whitespace() {
            let mut h: usize = 5381;
            for b in token.to_lowercase().bytes() {
                h = h.wrapping_mul(33).wrapping_add(b as usize);
            }
            v[h % DIMS] += 1.0;
        }
        v
    }

    #[async_trait]
    impl Embedder for HashEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
            Ok(hash_vector(text))
        }
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
            Ok(texts.iter().map(|t| hash_vector(t)).collect())
        }
        fn model_name(&self) -> &str {
            "hash-test-model"
        }
        fn dimension(&self) -> usize {
            DIMS
        }
    }

    fn indexer_with(index: Arc<EmbeddingIndex>) -> Indexer {
        Indexer::new(Arc::new(HashEmbedder), index, ChunkingConfig::default())
    }

    #[tokio::test]
    async fn indexes_documents_into_namespace() {
        let index = Arc::new(EmbeddingIndex::new());
        let indexer = indexer_with(index.clone());

        let docs = vec![
            SourceDocument::new("acme", "Acme Corp holds ISO 27001 and SOC 2 certifications."),
            SourceDocument::new("globex", "Globex is a high risk vendor under investigation."),
        ];
        let report = indexer.index_documents(&docs, "companies").await.unwrap();

        assert_eq!(report.documents, 2);
        assert_eq!(report.chunks, 2);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.updated, 0);
        assert_eq!(index.namespace_len("companies").await, 2);
    }

    #[tokio::test]
    async fn reindexing_is_idempotent() {
        let index = Arc::new(EmbeddingIndex::new());
        let indexer = indexer_with(index.clone());

        let docs = vec![SourceDocument::new("acme", "Acme Corp profile text.")];
        indexer.index_documents(&docs, "companies").await.unwrap();
        let report = indexer.index_documents(&docs, "companies").await.unwrap();

        assert_eq!(report.inserted, 0);
        assert_eq!(report.updated, 1);
        assert_eq!(index.namespace_len("companies").await, 1);
    }

    #[tokio::test]
    async fn empty_documents_are_skipped() {
        let index = Arc::new(EmbeddingIndex::new());
        let indexer = indexer_with(index.clone());

        let docs = vec![SourceDocument::new("empty", "   \n\n ")];
        let report = indexer.index_documents(&docs, "companies").await.unwrap();

        assert_eq!(report.documents, 1);
        assert_eq!(report.chunks, 0);
        assert!(!indexer.namespace_is_populated("companies").await);
    }

    #[tokio::test]
    async fn populated_check_reflects_state() {
        let index = Arc::new(EmbeddingIndex::new());
        let indexer = indexer_with(index.clone());
        assert!(!indexer.namespace_is_populated("companies").await);

        let docs = vec![SourceDocument::new("acme", "Acme Corp profile text.")];
        indexer.index_documents(&docs, "companies").await.unwrap();
        assert!(indexer.namespace_is_populated("companies").await);
    }
}
