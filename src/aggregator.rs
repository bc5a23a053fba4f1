use crate::enrich;
use crate::filter;
use crate::merge::merge_unique_by_hash;
use crate::traits::{RankingProvider, ScoreStore};
use crate::types::{
    AggregatorConfig, FeedFilter, FeedType, FetchOutcome, Post, Result,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One (feed_type, filter, viewer) session's canonical state. The epoch token
/// is regenerated on every reset so in-flight responses from a previous
/// session can be recognized and discarded on arrival.
struct Session {
    epoch: Uuid,
    feed_type: FeedType,
    viewer: Option<String>,
    filter: FeedFilter,
    feed: Vec<Post>,
    cursor: usize,
    has_more: bool,
    loading: bool,
    last_loaded_at: Option<DateTime<Utc>>,
}

impl Session {
    fn new(feed_type: FeedType, viewer: Option<String>) -> Self {
        Self {
            epoch: Uuid::new_v4(),
            feed_type,
            viewer,
            filter: FeedFilter::default(),
            feed: Vec::new(),
            cursor: 0,
            has_more: true,
            loading: false,
            last_loaded_at: None,
        }
    }

    /// Back to Empty: feed cleared, cursor 0, has_more true, fresh epoch.
    fn reset(&mut self) {
        self.epoch = Uuid::new_v4();
        self.feed.clear();
        self.cursor = 0;
        self.has_more = true;
        self.loading = false;
        self.last_loaded_at = None;
    }
}

/// Orchestrates paginated fetch-and-merge against the ranking provider,
/// enriches merged pages with engagement scores, and derives the filtered
/// feed on read.
///
/// Writes to the canonical feed are serialized through a single lock; the
/// provider and store are awaited outside it.
pub struct FeedAggregator {
    provider: Arc<dyn RankingProvider>,
    store: Arc<dyn ScoreStore>,
    config: AggregatorConfig,
    session: RwLock<Session>,
    revision: watch::Sender<u64>,
}

impl FeedAggregator {
    /// Viewer identity is an explicit input rather than ambient context; it is
    /// part of the session identity and changing it rebuilds the feed.
    pub fn new(
        provider: Arc<dyn RankingProvider>,
        store: Arc<dyn ScoreStore>,
        config: AggregatorConfig,
        viewer: Option<String>,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            provider,
            store,
            config,
            session: RwLock::new(Session::new(FeedType::default(), viewer)),
            revision,
        }
    }

    /// Fetch the next page and fold it into the canonical feed.
    ///
    /// No-ops deterministically when the session is exhausted or another
    /// fetch is already in flight. A provider failure leaves the session
    /// exactly as it was (no partial merge, has_more untouched) so the caller
    /// can retry at the same offset.
    pub async fn fetch_more(&self) -> Result<FetchOutcome> {
        let (epoch, feed_type, viewer, offset, limit) = {
            let mut session = self.session.write().await;
            if !session.has_more {
                debug!("fetch_more on exhausted {} session ignored", session.feed_type);
                return Ok(FetchOutcome::Exhausted);
            }
            if session.loading {
                debug!("fetch_more while a fetch is in flight ignored");
                return Ok(FetchOutcome::AlreadyLoading);
            }
            session.loading = true;
            (
                session.epoch,
                session.feed_type,
                session.viewer.clone(),
                session.cursor,
                self.config.page_size,
            )
        };

        let page = self
            .provider
            .get_page(feed_type, viewer.as_deref(), offset, limit)
            .await;

        let mut page = match page {
            Ok(page) => page,
            Err(e) => {
                let mut session = self.session.write().await;
                if session.epoch != epoch {
                    return Ok(FetchOutcome::Stale);
                }
                session.loading = false;
                return Err(e);
            }
        };

        // Enrich the incoming page before it joins the feed. A store failure
        // must not block the feed: keep the provider-supplied values instead.
        let hashes: HashSet<String> = page.iter().map(|post| post.hash.clone()).collect();
        match self.store.get_scores(&hashes).await {
            Ok(scores) => enrich::apply_scores(&mut page, &scores),
            Err(e) => warn!("Score enrichment failed, keeping prior values: {}", e),
        }

        let mut session = self.session.write().await;
        if session.epoch != epoch {
            debug!("Discarding page for stale session at offset {}", offset);
            return Ok(FetchOutcome::Stale);
        }

        let returned = page.len();
        let before = session.feed.len();
        session.feed = merge_unique_by_hash(std::mem::take(&mut session.feed), page);
        let appended = session.feed.len() - before;

        // Offset-based cursor: advance by the requested size regardless of
        // the returned size, to stay aligned with provider semantics.
        session.cursor += limit;
        session.has_more = returned == limit;
        session.loading = false;
        session.last_loaded_at = Some(Utc::now());

        info!(
            "Merged page at offset {}: {} returned, {} appended, has_more={}",
            offset, returned, appended, session.has_more
        );
        drop(session);
        self.notify();

        Ok(FetchOutcome::Fetched { returned, appended })
    }

    /// Switch ranking mode. A changed type rebuilds the session from Empty
    /// and immediately fetches the first page.
    pub async fn set_feed_type(&self, feed_type: FeedType) -> Result<FetchOutcome> {
        {
            let mut session = self.session.write().await;
            if session.feed_type == feed_type {
                return Ok(FetchOutcome::Unchanged);
            }
            info!("Feed type changed to {}, rebuilding session", feed_type);
            session.feed_type = feed_type;
            session.reset();
        }
        self.notify();
        self.fetch_more().await
    }

    /// Switch viewer identity; part of the session identity, so the feed is
    /// rebuilt.
    pub async fn set_viewer(&self, viewer: Option<String>) -> Result<FetchOutcome> {
        {
            let mut session = self.session.write().await;
            if session.viewer == viewer {
                return Ok(FetchOutcome::Unchanged);
            }
            info!("Viewer changed, rebuilding session");
            session.viewer = viewer;
            session.reset();
        }
        self.notify();
        self.fetch_more().await
    }

    /// Overlay the `Some` fields of `change` onto the active filter. The
    /// filter is part of the session identity, so an effective change
    /// rebuilds the feed from offset 0.
    pub async fn update_filter(&self, change: FeedFilter) -> Result<FetchOutcome> {
        {
            let mut session = self.session.write().await;
            let mut merged = session.filter.clone();
            merged.merge(change);
            if merged == session.filter {
                return Ok(FetchOutcome::Unchanged);
            }
            info!("Filter changed to {:?}, rebuilding session", merged);
            session.filter = merged;
            session.reset();
        }
        self.notify();
        self.fetch_more().await
    }

    /// Replace the whole filter, clearing any dimension absent from `filter`.
    pub async fn set_filter(&self, filter: FeedFilter) -> Result<FetchOutcome> {
        {
            let mut session = self.session.write().await;
            if session.filter == filter {
                return Ok(FetchOutcome::Unchanged);
            }
            info!("Filter replaced with {:?}, rebuilding session", filter);
            session.filter = filter;
            session.reset();
        }
        self.notify();
        self.fetch_more().await
    }

    /// Re-fetch one post's scores and patch them in place, e.g. after a
    /// user-driven score-changing action. On store failure the post is left
    /// unchanged and the error surfaced. Returns whether the post was found
    /// in the feed.
    pub async fn refresh_score(&self, hash: &str) -> Result<bool> {
        let scores = match self.store.get_score(hash).await {
            Ok(Some(scores)) => scores,
            Ok(None) => {
                debug!("No score row for post {}, leaving it unchanged", hash);
                return Ok(false);
            }
            Err(e) => {
                warn!("Score refresh for post {} failed: {}", hash, e);
                return Err(e);
            }
        };

        let patched = {
            let mut session = self.session.write().await;
            enrich::refresh_one(&mut session.feed, hash, scores)
        };
        if patched {
            self.notify();
        }
        Ok(patched)
    }

    /// The externally visible feed: the canonical feed with the active filter
    /// applied, computed fresh on every read.
    pub async fn filtered_feed(&self) -> Vec<Post> {
        let session = self.session.read().await;
        filter::apply(&session.feed, &session.filter)
    }

    /// The canonical merged feed, unfiltered.
    pub async fn feed(&self) -> Vec<Post> {
        self.session.read().await.feed.clone()
    }

    pub async fn has_more(&self) -> bool {
        self.session.read().await.has_more
    }

    pub async fn feed_type(&self) -> FeedType {
        self.session.read().await.feed_type
    }

    pub async fn filter(&self) -> FeedFilter {
        self.session.read().await.filter.clone()
    }

    pub async fn viewer(&self) -> Option<String> {
        self.session.read().await.viewer.clone()
    }

    /// When the current session last merged a page, if ever.
    pub async fn last_loaded_at(&self) -> Option<DateTime<Utc>> {
        self.session.read().await.last_loaded_at
    }

    /// Subscribe to change notifications: the revision counter bumps whenever
    /// the feed, filter or session identity mutates. Read the current feed
    /// via `filtered_feed` after each change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}
