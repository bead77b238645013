use async_trait::async_trait;
use crate::{Fundamentals, PriceQuote, ValuationError};

/// Supplier of fundamentals and price snapshots.
///
/// Implementations may return a subset of the requested tickers, or nothing
/// at all; the pipeline treats partial and empty batches as ordinary input.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_fundamentals(&self, tickers: &[String]) -> Result<Vec<Fundamentals>, ValuationError>;

    async fn fetch_prices(&self, tickers: &[String]) -> Result<Vec<PriceQuote>, ValuationError>;
}
