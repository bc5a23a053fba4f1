use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A social post as delivered by the ranking provider, enriched with
/// engagement scores from the relational store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Stable globally-unique identifier; the dedup/merge key.
    pub hash: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub degen: i64,
    /// Provider-supplied display fields (author, text, timestamps, ...)
    /// carried through untouched.
    #[serde(flatten)]
    pub display: serde_json::Map<String, serde_json::Value>,
}

/// A piece of media or link content attached to a post. Kind and platform
/// arrive as raw strings; `embed::find_valid_embed` decides whether they
/// name anything we recognize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Closed set of media kinds a valid embed may carry. Anything else is
/// rejected, never defaulted to valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Link,
}

impl FromStr for MediaKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            "link" => Ok(MediaKind::Link),
            _ => Err(()),
        }
    }
}

/// Closed set of embed platforms the filter can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedPlatform {
    Spotify,
    Soundcloud,
    Soundxyz,
    Youtube,
    Zora,
}

impl EmbedPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedPlatform::Spotify => "spotify",
            EmbedPlatform::Soundcloud => "soundcloud",
            EmbedPlatform::Soundxyz => "soundxyz",
            EmbedPlatform::Youtube => "youtube",
            EmbedPlatform::Zora => "zora",
        }
    }
}

impl FromStr for EmbedPlatform {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "spotify" => Ok(EmbedPlatform::Spotify),
            "soundcloud" => Ok(EmbedPlatform::Soundcloud),
            "soundxyz" => Ok(EmbedPlatform::Soundxyz),
            "youtube" => Ok(EmbedPlatform::Youtube),
            "zora" => Ok(EmbedPlatform::Zora),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EmbedPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two engagement scores tracked per post, sourced from the relational
/// store rather than the ranking provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostScores {
    pub points: i64,
    pub degen: i64,
}

/// Declarative filter over the canonical feed. An absent field means no
/// constraint on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFilter {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub platform: Option<EmbedPlatform>,
}

impl FeedFilter {
    /// Overlay the `Some` fields of `change` onto this filter. Clearing a
    /// dimension requires replacing the whole filter.
    pub fn merge(&mut self, change: FeedFilter) {
        if change.channel.is_some() {
            self.channel = change.channel;
        }
        if change.platform.is_some() {
            self.platform = change.platform;
        }
    }
}

/// Named ranking mode selecting which provider stream to paginate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    #[default]
    Trending,
    Recent,
    Following,
}

impl FeedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::Trending => "trending",
            FeedType::Recent => "recent",
            FeedType::Following => "following",
        }
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Posts requested per page; also the exhaustion threshold (a shorter
    /// page means the stream ran dry).
    pub page_size: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            user_agent: "Feed-Aggregator/1.0".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Result of a `fetch_more` call, distinguishing the no-op outcomes from an
/// actual page merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and merged.
    Fetched { returned: usize, appended: usize },
    /// Another fetch for this session is already in flight; no request issued.
    AlreadyLoading,
    /// The session is exhausted; no request issued.
    Exhausted,
    /// The session was reset while the fetch was in flight; the response was
    /// discarded.
    Stale,
    /// An identity setter matched the current session identity; nothing to do.
    Unchanged,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("provider fetch error: {0}")]
    ProviderFetch(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store query error: {0}")]
    StoreQuery(#[from] sqlx::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("malformed post: {0}")]
    MalformedPost(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;
