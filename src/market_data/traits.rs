use async_trait::async_trait;

use crate::market_data::error::FetchResult;
use crate::market_data::normalize::FetchedSnapshot;

/// A source of ticker snapshots.
///
/// One call is one retrieval: no retries, no partial results.
#[async_trait]
pub trait TickerSource: Send + Sync {
    /// Where the ticks come from, for diagnostics.
    fn endpoint(&self) -> &str;

    async fn fetch_snapshot(&self) -> FetchResult<FetchedSnapshot>;
}
