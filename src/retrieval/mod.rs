//! Semantic retrieval subsystem.
//!
//! Two independent paths connected only by the index contract: the offline
//! indexing path (chunk → embed → upsert) and the query-time read path
//! (embed query → nearest-neighbor search → bounded evidence snippets).

pub mod chunker;
pub mod embedder;
pub mod index;
pub mod indexer;
pub(crate) mod retry;
pub mod service;

pub use chunker::{Chunk, chunk_document};
pub use embedder::{Embedder, OpenAiEmbedder};
pub use index::{EmbeddingIndex, IndexEntry, QueryFilter, ScoredMatch, UpsertStats};
pub use indexer::{IndexReport, Indexer, SourceDocument};
pub use service::RetrievalService;
