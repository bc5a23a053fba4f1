use crate::types::{FeedType, Post, PostScores, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::HashSet;

/// Seam to the external ranking service. Returns ordered post batches;
/// ordering is assumed stable across calls within a session.
#[async_trait]
pub trait RankingProvider: Send + Sync {
    /// Fetch one page of the ranked stream starting at `offset`.
    async fn get_page(
        &self,
        feed_type: FeedType,
        viewer: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Post>>;
}

/// Seam to the relational store holding mutable per-post engagement scores.
/// Read-only from this crate's perspective; score writes happen externally.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Look up scores for a batch of post hashes. Hashes not present in the
    /// store are simply absent from the result mapping.
    async fn get_scores(&self, hashes: &HashSet<String>) -> Result<HashMap<String, PostScores>>;

    /// Look up one post's scores; `None` when the store has no row for it.
    async fn get_score(&self, hash: &str) -> Result<Option<PostScores>>;
}
