//! Configuration types.

use std::time::Duration;

/// Retrieval tuning knobs.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Number of evidence snippets returned per search.
    pub top_k: usize,
    /// Character budget per rendered snippet.
    pub snippet_char_budget: usize,
    /// Total character budget across all returned snippets.
    pub total_char_budget: usize,
    /// Timeout for one embedding backend call.
    pub embed_timeout: Duration,
    /// Maximum embedding attempts before surfacing a retryable failure.
    pub max_embed_attempts: u32,
    /// Base delay for exponential backoff between attempts.
    pub backoff_base: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            snippet_char_budget: 600,
            total_char_budget: 2400,
            embed_timeout: Duration::from_secs(30),
            max_embed_attempts: 3,
            backoff_base: Duration::from_millis(100),
        }
    }
}

/// Chunking policy for the offline indexer.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters before sub-splitting.
    pub max_chunk_chars: usize,
    /// Trailing overlap carried between consecutive chunks of one document.
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 1000,
            overlap_chars: 200,
        }
    }
}

/// Namespace holding the company risk-profile corpus.
pub const COMPANY_DIRECTORY_NAMESPACE: &str = "company-directory";
