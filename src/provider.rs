use crate::traits::RankingProvider;
use crate::types::{FeedError, FeedType, Post, ProviderConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct FeedPageBody {
    posts: Vec<serde_json::Value>,
}

/// HTTP client for the ranking provider, speaking
/// `GET {base}/feeds/{type}?offset=&limit=[&viewer=]` with a JSON body of
/// `{"posts": [...]}`.
pub struct HttpRankingProvider {
    client: Client,
    base_url: Url,
}

impl HttpRankingProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .build()?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl RankingProvider for HttpRankingProvider {
    async fn get_page(
        &self,
        feed_type: FeedType,
        viewer: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Post>> {
        let mut url = self.base_url.join(&format!("feeds/{}", feed_type))?;
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        if let Some(viewer) = viewer {
            url.query_pairs_mut().append_pair("viewer", viewer);
        }

        debug!("Fetching feed page: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::ProviderFetch(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body: FeedPageBody = response
            .json()
            .await
            .map_err(|e| FeedError::ProviderFetch(format!("malformed page: {}", e)))?;

        let posts = validate_page(body.posts);
        info!(
            "Fetched {} posts from {} feed at offset {}",
            posts.len(),
            feed_type,
            offset
        );
        Ok(posts)
    }
}

/// Validate raw provider records individually, dropping malformed posts
/// instead of failing the page.
pub fn validate_page(raw_posts: Vec<serde_json::Value>) -> Vec<Post> {
    let mut posts = Vec::with_capacity(raw_posts.len());

    for value in raw_posts {
        match validate_post(value) {
            Ok(post) => posts.push(post),
            Err(e) => {
                warn!("Dropping malformed post from page: {}", e);
            }
        }
    }

    posts
}

fn validate_post(value: serde_json::Value) -> Result<Post> {
    let mut post: Post = serde_json::from_value(value)
        .map_err(|e| FeedError::MalformedPost(e.to_string()))?;

    if post.hash.is_empty() {
        return Err(FeedError::MalformedPost("missing post hash".to_string()));
    }

    // Scores are non-negative by contract; clamp anything the provider got wrong.
    post.points = post.points.max(0);
    post.degen = post.degen.max(0);

    Ok(post)
}
