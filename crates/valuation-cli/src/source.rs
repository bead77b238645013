use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use valuation_core::{Fundamentals, MarketDataSource, PriceQuote, ValuationError};

/// Market data read from two JSON array files.
///
/// An empty ticker request returns every record in the file.
pub struct JsonFileSource {
    fundamentals_path: PathBuf,
    prices_path: PathBuf,
}

impl JsonFileSource {
    pub fn new(fundamentals_path: impl Into<PathBuf>, prices_path: impl Into<PathBuf>) -> Self {
        Self {
            fundamentals_path: fundamentals_path.into(),
            prices_path: prices_path.into(),
        }
    }
}

async fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ValuationError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ValuationError::DataSource(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| ValuationError::DataSource(format!("{}: {e}", path.display())))
}

fn requested(tickers: &[String], ticker: &str) -> bool {
    tickers.is_empty() || tickers.iter().any(|t| t.eq_ignore_ascii_case(ticker))
}

#[async_trait]
impl MarketDataSource for JsonFileSource {
    async fn fetch_fundamentals(&self, tickers: &[String]) -> Result<Vec<Fundamentals>, ValuationError> {
        let records: Vec<Fundamentals> = read_records(&self.fundamentals_path).await?;
        Ok(records.into_iter().filter(|f| requested(tickers, &f.ticker)).collect())
    }

    async fn fetch_prices(&self, tickers: &[String]) -> Result<Vec<PriceQuote>, ValuationError> {
        let records: Vec<PriceQuote> = read_records(&self.prices_path).await?;
        Ok(records.into_iter().filter(|p| requested(tickers, &p.ticker)).collect())
    }
}
