//! Query-time read path: embed, search, render bounded evidence.

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::RetrievalError;
use crate::session::EvidenceSnippet;

use super::embedder::Embedder;
use super::index::{EmbeddingIndex, QueryFilter};
use super::retry::RetryPolicy;

/// Embeds free-text queries and turns index matches into evidence
/// snippets under fixed character budgets.
pub struct RetrievalService {
    embedder: Arc<dyn Embedder>,
    index: Arc<EmbeddingIndex>,
    config: RetrievalConfig,
    retry: RetryPolicy,
}

impl RetrievalService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<EmbeddingIndex>,
        config: RetrievalConfig,
    ) -> Self {
        let retry = RetryPolicy::new(config.max_embed_attempts, config.backoff_base);
        Self {
            embedder,
            index,
            config,
            retry,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Search `namespace` for the `top_k` most relevant snippets.
    ///
    /// An index miss yields `Ok(vec![])` — "no evidence found" is a valid
    /// outcome the caller must represent, not an error. A blank query
    /// fails fast before reaching the embedding backend; backend failures
    /// are retried with backoff and surface as retryable once exhausted.
    pub async fn search(
        &self,
        query: &str,
        namespace: &str,
        top_k: usize,
        filter: Option<&QueryFilter>,
    ) -> Result<Vec<EvidenceSnippet>, RetrievalError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RetrievalError::InvalidQuery(
                "query must not be blank".to_string(),
            ));
        }

        // The embed call is the only network hop at query time; bound it
        // with the configured timeout inside each retry attempt.
        let timeout = self.config.embed_timeout;
        let embedder = Arc::clone(&self.embedder);
        let vector = self
            .retry
            .run("embed_query", move || {
                let embedder = Arc::clone(&embedder);
                async move {
                    match tokio::time::timeout(timeout, embedder.embed(query)).await {
                        Ok(result) => result,
                        Err(_) => Err(RetrievalError::Timeout(timeout)),
                    }
                }
            })
            .await?;

        if vector.iter().all(|x| *x == 0.0) {
            return Err(RetrievalError::InvalidQuery(
                "query embeds to a degenerate vector".to_string(),
            ));
        }

        let mut matches = self
            .index
            .query(
                &vector,
                namespace,
                self.embedder.model_name(),
                top_k,
                filter,
            )
            .await?;

        // The index already ranks; re-sort stably on score alone so ties
        // keep their original candidate order per the snippet contract.
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut snippets = Vec::with_capacity(matches.len());
        let mut budget_left = self.config.total_char_budget;
        for m in matches {
            if budget_left == 0 {
                break;
            }
            let excerpt = excerpt(
                &m.segment_text,
                self.config.snippet_char_budget.min(budget_left),
            );
            if excerpt.is_empty() {
                continue;
            }
            budget_left = budget_left.saturating_sub(excerpt.chars().count());
            snippets.push(EvidenceSnippet {
                source_id: m.source_id,
                text: excerpt,
                relevance_score: m.score,
            });
        }

        tracing::debug!(
            namespace,
            results = snippets.len(),
            "Retrieval search completed"
        );
        Ok(snippets)
    }
}

/// Whitespace-normalize and truncate to `max_chars` at a char boundary.
fn excerpt(text: &str, max_chars: usize) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() <= max_chars {
        return normalized;
    }
    let mut out: String = normalized.chars().take(max_chars.saturating_sub(1)).collect();
    out = out.trim_end().to_string();
    out.push('…');
    out
}
