pub mod types;
pub mod embed;
pub mod merge;
pub mod filter;
pub mod enrich;
pub mod traits;
pub mod provider;
pub mod score_store;
pub mod aggregator;

pub use types::*;
pub use traits::{RankingProvider, ScoreStore};
pub use provider::HttpRankingProvider;
pub use score_store::PgScoreStore;
pub use aggregator::FeedAggregator;
