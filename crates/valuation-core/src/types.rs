use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time fundamentals snapshot for one ticker.
///
/// Every numeric field is optional: `None` means "unknown", never zero.
/// Ratios and growth rates are fractions (0.15 = 15%), and `debt_to_equity`
/// is a plain ratio rather than a percentage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub ticker: String,
    pub company_name: String,
    pub sector: String,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    #[serde(default)]
    pub ttm_fcf: Option<f64>,
    #[serde(default)]
    pub fcf_growth_rate: Option<f64>,
    #[serde(default)]
    pub total_debt: Option<f64>,
    #[serde(default)]
    pub total_cash: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub forward_pe: Option<f64>,
    #[serde(default)]
    pub pb_ratio: Option<f64>,
    #[serde(default)]
    pub peg_ratio: Option<f64>,
    #[serde(default)]
    pub ev_ebitda: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub operating_margins: Option<f64>,
    #[serde(default)]
    pub profit_margins: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub revenue_growth: Option<f64>,
    #[serde(default)]
    pub earnings_growth: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub analyst_target: Option<f64>,
    #[serde(default)]
    pub fetched_at: DateTime<Utc>,
}

/// Latest trade price for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub ticker: String,
    pub price: f64,
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl PriceQuote {
    /// Returns the price when it is finite and strictly positive.
    pub fn usable_price(&self) -> Option<f64> {
        (self.price.is_finite() && self.price > 0.0).then_some(self.price)
    }
}

/// Growth / value / blend classification used to pick thresholds and weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthProfile {
    Growth,
    Value,
    Blend,
}

impl GrowthProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthProfile::Growth => "growth",
            GrowthProfile::Value => "value",
            GrowthProfile::Blend => "blend",
        }
    }

    pub fn is_growth(&self) -> bool {
        matches!(self, GrowthProfile::Growth)
    }
}

impl fmt::Display for GrowthProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-level traffic light for a single metric, plus "na" when the
/// metric could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricSignal {
    Green,
    Yellow,
    Red,
    Na,
}

impl MetricSignal {
    /// Pillar contribution: green 1.0, yellow 0.5, red 0.0, na excluded.
    pub fn score(&self) -> Option<f64> {
        match self {
            MetricSignal::Green => Some(1.0),
            MetricSignal::Yellow => Some(0.5),
            MetricSignal::Red => Some(0.0),
            MetricSignal::Na => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        !matches!(self, MetricSignal::Na)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricSignal::Green => "green",
            MetricSignal::Yellow => "yellow",
            MetricSignal::Red => "red",
            MetricSignal::Na => "na",
        }
    }
}

impl fmt::Display for MetricSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall qualitative verdict for a ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallSignal {
    Undervalued,
    Fair,
    Overvalued,
    InsufficientData,
}

impl OverallSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallSignal::Undervalued => "undervalued",
            OverallSignal::Fair => "fair",
            OverallSignal::Overvalued => "overvalued",
            OverallSignal::InsufficientData => "insufficient_data",
        }
    }
}

impl fmt::Display for OverallSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scorable metrics. Declaration order is the order used in serialized
/// signal maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "pe")]
    Pe,
    #[serde(rename = "forward_pe")]
    ForwardPe,
    #[serde(rename = "p_fcf")]
    PriceToFcf,
    #[serde(rename = "ev_ebitda")]
    EvEbitda,
    #[serde(rename = "peg")]
    Peg,
    #[serde(rename = "mos")]
    MarginOfSafety,
    #[serde(rename = "analyst_upside")]
    AnalystUpside,
    #[serde(rename = "roe")]
    Roe,
    #[serde(rename = "debt_equity")]
    DebtToEquity,
    #[serde(rename = "revenue_growth")]
    RevenueGrowth,
    #[serde(rename = "earnings_growth")]
    EarningsGrowth,
}

impl Metric {
    pub const ALL: [Metric; 11] = [
        Metric::Pe,
        Metric::ForwardPe,
        Metric::PriceToFcf,
        Metric::EvEbitda,
        Metric::Peg,
        Metric::MarginOfSafety,
        Metric::AnalystUpside,
        Metric::Roe,
        Metric::DebtToEquity,
        Metric::RevenueGrowth,
        Metric::EarningsGrowth,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Metric::Pe => "pe",
            Metric::ForwardPe => "forward_pe",
            Metric::PriceToFcf => "p_fcf",
            Metric::EvEbitda => "ev_ebitda",
            Metric::Peg => "peg",
            Metric::MarginOfSafety => "mos",
            Metric::AnalystUpside => "analyst_upside",
            Metric::Roe => "roe",
            Metric::DebtToEquity => "debt_equity",
            Metric::RevenueGrowth => "revenue_growth",
            Metric::EarningsGrowth => "earnings_growth",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Composite score pillars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Dcf,
    Fundamentals,
    Quality,
}

/// Per-pillar scores (each 0.0 to 1.0) that feed the composite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PillarScores {
    pub dcf: f64,
    pub fundamentals: f64,
    pub quality: f64,
}

/// Output of the DCF calculator. Both fields are `None` together when the
/// DCF is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub intrinsic_value: Option<f64>,
    pub margin_of_safety: Option<f64>,
}

impl DcfValuation {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.intrinsic_value.is_some()
    }
}

/// Output of the five-year EPS projection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FiveYearEstimate {
    pub price: Option<f64>,
    pub cagr: Option<f64>,
    pub growth_used: Option<f64>,
}

/// Fully scored valuation for one ticker. Built once per run, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub ticker: String,
    pub company_name: String,
    pub sector: String,
    pub price: f64,
    pub market_cap: Option<f64>,

    pub dcf_value: Option<f64>,
    pub margin_of_safety: Option<f64>,
    pub p_fcf: Option<f64>,

    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub ev_ebitda: Option<f64>,
    pub analyst_upside: Option<f64>,

    pub roe: Option<f64>,
    pub operating_margins: Option<f64>,
    pub profit_margins: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub beta: Option<f64>,

    /// Projected price five years out
    pub five_yr_price: Option<f64>,
    /// Annualized return implied by `five_yr_price`
    pub five_yr_cagr: Option<f64>,
    /// Growth rate applied to the projection
    pub five_yr_growth_used: Option<f64>,

    pub growth_profile: GrowthProfile,
    pub metric_signals: BTreeMap<Metric, MetricSignal>,
    pub pillar_scores: PillarScores,
    /// Weighted blend of the pillar scores, 0.0 to 1.0
    pub composite_score: f64,
    pub signal: OverallSignal,

    pub fetched_at: DateTime<Utc>,
    pub priced_at: DateTime<Utc>,
}

impl ValuationResult {
    pub fn signal_for(&self, metric: Metric) -> MetricSignal {
        self.metric_signals
            .get(&metric)
            .copied()
            .unwrap_or(MetricSignal::Na)
    }
}
