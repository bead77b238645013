use std::collections::HashMap;

use valuation_core::{Fundamentals, PriceQuote, Result, ValuationConfig, ValuationResult};

use crate::builder::ValuationResultBuilder;
use crate::dcf::discounted_value;

/// Joins fundamentals with prices and ranks the scored results.
#[derive(Debug, Clone)]
pub struct ValuationPipeline {
    config: ValuationConfig,
}

impl Default for ValuationPipeline {
    fn default() -> Self {
        Self {
            config: ValuationConfig::default(),
        }
    }
}

impl ValuationPipeline {
    /// Create a pipeline, rejecting an invalid configuration up front
    pub fn new(config: ValuationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Score every fundamentals record that has a matching price.
    ///
    /// Records without a price are skipped. When several quotes share a
    /// ticker the last one wins. Results are sorted by composite score,
    /// highest first; the sort is stable, so equal scores keep the order of
    /// `fundamentals`.
    pub fn run(&self, fundamentals: &[Fundamentals], prices: &[PriceQuote]) -> Vec<ValuationResult> {
        let price_map: HashMap<&str, &PriceQuote> =
            prices.iter().map(|p| (p.ticker.as_str(), p)).collect();

        let builder = ValuationResultBuilder::new(&self.config);
        let mut results = Vec::with_capacity(fundamentals.len().min(price_map.len()));
        let mut unmatched = 0usize;
        let mut dcf_unavailable = 0usize;

        for fund in fundamentals {
            let Some(price) = price_map.get(fund.ticker.as_str()) else {
                tracing::debug!(ticker = %fund.ticker, "no price for ticker, skipping");
                unmatched += 1;
                continue;
            };
            let dcf = discounted_value(fund, price, &self.config.dcf);
            if !dcf.is_available() {
                tracing::debug!(ticker = %fund.ticker, "dcf unavailable");
                dcf_unavailable += 1;
            }
            results.push(builder.build(fund, price, dcf));
        }

        results.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));

        tracing::info!(
            scored = results.len(),
            unmatched,
            dcf_unavailable,
            prices = prices.len(),
            "valuation run complete"
        );

        results
    }
}

/// Score and rank with default thresholds and weights, overriding the DCF
/// rates and horizon.
///
/// Fails only when `wacc` does not exceed `terminal_growth` or the horizon is
/// out of range.
pub fn run_valuation(
    fundamentals: &[Fundamentals],
    prices: &[PriceQuote],
    wacc: f64,
    terminal_growth: f64,
    projection_years: u32,
) -> Result<Vec<ValuationResult>> {
    let config = ValuationConfig::with_dcf_rates(wacc, terminal_growth, projection_years);
    let pipeline = ValuationPipeline::new(config)?;
    Ok(pipeline.run(fundamentals, prices))
}
