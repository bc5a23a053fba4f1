use crate::traits::ScoreStore;
use crate::types::{PostScores, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Pool, Postgres, Row};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Postgres-backed score store. Expects a `posts` table keyed by `post_hash`
/// with integer `points` and `degen` columns; this crate only ever reads it.
pub struct PgScoreStore {
    db: Pool<Postgres>,
}

impl PgScoreStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = PgPool::connect(database_url).await?;
        Ok(Self { db })
    }

    pub fn from_pool(db: Pool<Postgres>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScoreStore for PgScoreStore {
    async fn get_scores(&self, hashes: &HashSet<String>) -> Result<HashMap<String, PostScores>> {
        if hashes.is_empty() {
            return Ok(HashMap::new());
        }

        let wanted: Vec<String> = hashes.iter().cloned().collect();
        let rows = sqlx::query(
            "SELECT post_hash, points, degen FROM posts WHERE post_hash = ANY($1)",
        )
        .bind(&wanted)
        .fetch_all(&self.db)
        .await?;

        let mut scores = HashMap::with_capacity(rows.len());
        for row in rows {
            let hash: String = row.try_get("post_hash")?;
            scores.insert(
                hash,
                PostScores {
                    points: row.try_get("points")?,
                    degen: row.try_get("degen")?,
                },
            );
        }

        debug!("Fetched scores for {}/{} posts", scores.len(), wanted.len());
        Ok(scores)
    }

    async fn get_score(&self, hash: &str) -> Result<Option<PostScores>> {
        let row = sqlx::query("SELECT points, degen FROM posts WHERE post_hash = $1")
            .bind(hash)
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some(row) => Ok(Some(PostScores {
                points: row.try_get("points")?,
                degen: row.try_get("degen")?,
            })),
            None => Ok(None),
        }
    }
}
