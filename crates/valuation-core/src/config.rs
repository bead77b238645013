//! Valuation configuration.
//!
//! All thresholds, weights and model parameters live in one immutable
//! [`ValuationConfig`] that is passed into the engine, so concurrent runs can
//! use different settings without interfering with each other.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{GrowthProfile, Metric, Pillar, Result, ValuationError};

/// Discounted-cash-flow model parameters.
///
/// `wacc` must exceed `terminal_growth`; the Gordon growth terminal value
/// divides by their difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcfParams {
    /// Discount rate applied to projected cash flows
    pub wacc: f64,
    /// Perpetual growth rate after the projection horizon
    pub terminal_growth: f64,
    /// Number of explicitly projected years
    pub projection_years: u32,
    /// FCF growth used when the historical rate is unknown
    pub default_fcf_growth: f64,
    pub min_fcf_growth: f64,
    pub max_fcf_growth: f64,
}

impl Default for DcfParams {
    fn default() -> Self {
        Self {
            wacc: 0.10,
            terminal_growth: 0.03,
            projection_years: 5,
            default_fcf_growth: 0.05,
            min_fcf_growth: -0.05,
            max_fcf_growth: 0.25,
        }
    }
}

impl DcfParams {
    /// Default clamp settings with caller-supplied rates and horizon
    pub fn with_rates(wacc: f64, terminal_growth: f64, projection_years: u32) -> Self {
        Self {
            wacc,
            terminal_growth,
            projection_years,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_finite("dcf.wacc", self.wacc)?;
        ensure_finite("dcf.terminal_growth", self.terminal_growth)?;
        ensure_finite("dcf.default_fcf_growth", self.default_fcf_growth)?;
        ensure_finite("dcf.min_fcf_growth", self.min_fcf_growth)?;
        ensure_finite("dcf.max_fcf_growth", self.max_fcf_growth)?;

        if self.wacc <= self.terminal_growth {
            return Err(ValuationError::InvalidConfig(format!(
                "wacc ({}) must exceed terminal growth ({})",
                self.wacc, self.terminal_growth
            )));
        }
        if self.wacc <= -1.0 || self.terminal_growth <= -1.0 {
            return Err(ValuationError::InvalidConfig(
                "wacc and terminal growth must be greater than -100%".to_string(),
            ));
        }
        if self.projection_years == 0 || self.projection_years > 100 {
            return Err(ValuationError::InvalidConfig(format!(
                "projection years must be between 1 and 100, got {}",
                self.projection_years
            )));
        }
        if self.min_fcf_growth > self.max_fcf_growth {
            return Err(ValuationError::InvalidConfig(format!(
                "fcf growth clamp is inverted: min {} > max {}",
                self.min_fcf_growth, self.max_fcf_growth
            )));
        }
        Ok(())
    }
}

/// Five-year EPS projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    /// Growth used when earnings, revenue and FCF growth are all unknown
    pub default_growth: f64,
    pub growth_floor: f64,
    pub growth_cap: f64,
    /// Forward P/E must exceed this to be used as the exit multiple
    pub exit_multiple_floor: f64,
    pub exit_multiple_cap: f64,
    /// Upper bound on the trailing P/E fallback multiple
    pub fallback_exit_multiple: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            default_growth: 0.07,
            growth_floor: -0.05,
            growth_cap: 0.25,
            exit_multiple_floor: 5.0,
            exit_multiple_cap: 40.0,
            fallback_exit_multiple: 20.0,
        }
    }
}

impl ProjectionParams {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("projection.default_growth", self.default_growth)?;
        ensure_finite("projection.growth_floor", self.growth_floor)?;
        ensure_finite("projection.growth_cap", self.growth_cap)?;
        ensure_finite("projection.exit_multiple_floor", self.exit_multiple_floor)?;
        ensure_finite("projection.exit_multiple_cap", self.exit_multiple_cap)?;
        ensure_finite("projection.fallback_exit_multiple", self.fallback_exit_multiple)?;

        if self.growth_floor > self.growth_cap {
            return Err(ValuationError::InvalidConfig(format!(
                "projection growth band is inverted: floor {} > cap {}",
                self.growth_floor, self.growth_cap
            )));
        }
        if self.growth_floor <= -1.0 {
            return Err(ValuationError::InvalidConfig(
                "projection growth floor must be greater than -100%".to_string(),
            ));
        }
        if self.exit_multiple_cap <= self.exit_multiple_floor || self.fallback_exit_multiple <= 0.0 {
            return Err(ValuationError::InvalidConfig(
                "exit multiple cap must exceed its floor and the fallback must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cut-offs for the growth / value / blend classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    /// Revenue growth at or above this earns a growth point
    pub growth_revenue: f64,
    pub growth_earnings: f64,
    pub growth_pe: f64,
    /// Revenue growth below this earns a value point
    pub value_revenue: f64,
    pub value_earnings: f64,
    pub value_pe: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            growth_revenue: 0.15,
            growth_earnings: 0.15,
            growth_pe: 30.0,
            value_revenue: 0.08,
            value_earnings: 0.08,
            value_pe: 18.0,
        }
    }
}

/// Green / yellow cut-off pair for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub green: f64,
    pub yellow: f64,
}

impl Threshold {
    pub const fn new(green: f64, yellow: f64) -> Self {
        Self { green, yellow }
    }
}

/// Per-metric thresholds for one growth profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub pe: Threshold,
    pub forward_pe: Threshold,
    pub p_fcf: Threshold,
    pub ev_ebitda: Threshold,
    pub peg: Threshold,
    pub margin_of_safety: Threshold,
    pub analyst_upside: Threshold,
    pub roe: Threshold,
    pub debt_to_equity: Threshold,
    pub revenue_growth: Threshold,
    pub earnings_growth: Threshold,
}

impl ThresholdTable {
    /// Thresholds for value and blend companies
    pub fn standard() -> Self {
        Self {
            pe: Threshold::new(20.0, 35.0),
            forward_pe: Threshold::new(18.0, 30.0),
            p_fcf: Threshold::new(20.0, 40.0),
            ev_ebitda: Threshold::new(15.0, 25.0),
            peg: Threshold::new(1.5, 2.5),
            margin_of_safety: Threshold::new(0.25, -0.10),
            analyst_upside: Threshold::new(0.15, 0.0),
            roe: Threshold::new(0.15, 0.08),
            debt_to_equity: Threshold::new(0.50, 2.00),
            revenue_growth: Threshold::new(0.15, 0.05),
            earnings_growth: Threshold::new(0.15, 0.05),
        }
    }

    /// Thresholds for growth companies: looser on multiples, tighter on PEG
    pub fn growth_adjusted() -> Self {
        Self {
            pe: Threshold::new(35.0, 60.0),
            forward_pe: Threshold::new(30.0, 45.0),
            p_fcf: Threshold::new(35.0, 60.0),
            ev_ebitda: Threshold::new(25.0, 40.0),
            peg: Threshold::new(1.0, 2.0),
            revenue_growth: Threshold::new(0.20, 0.10),
            earnings_growth: Threshold::new(0.20, 0.10),
            ..Self::standard()
        }
    }

    pub fn get(&self, metric: Metric) -> Threshold {
        match metric {
            Metric::Pe => self.pe,
            Metric::ForwardPe => self.forward_pe,
            Metric::PriceToFcf => self.p_fcf,
            Metric::EvEbitda => self.ev_ebitda,
            Metric::Peg => self.peg,
            Metric::MarginOfSafety => self.margin_of_safety,
            Metric::AnalystUpside => self.analyst_upside,
            Metric::Roe => self.roe,
            Metric::DebtToEquity => self.debt_to_equity,
            Metric::RevenueGrowth => self.revenue_growth,
            Metric::EarningsGrowth => self.earnings_growth,
        }
    }

    fn validate(&self, table: &str) -> Result<()> {
        for metric in Metric::ALL {
            let t = self.get(metric);
            if !t.green.is_finite() || !t.yellow.is_finite() {
                return Err(ValuationError::InvalidConfig(format!(
                    "{table} threshold for {metric} must be finite"
                )));
            }
        }
        Ok(())
    }
}

/// Composite weights across the three pillars. Must be non-negative and sum
/// to 1 so the composite stays within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub dcf: f64,
    pub fundamentals: f64,
    pub quality: f64,
}

impl ScoreWeights {
    pub fn standard() -> Self {
        Self {
            dcf: 0.40,
            fundamentals: 0.35,
            quality: 0.25,
        }
    }

    pub fn growth_adjusted() -> Self {
        Self {
            dcf: 0.25,
            fundamentals: 0.35,
            quality: 0.40,
        }
    }

    pub fn get(&self, pillar: Pillar) -> f64 {
        match pillar {
            Pillar::Dcf => self.dcf,
            Pillar::Fundamentals => self.fundamentals,
            Pillar::Quality => self.quality,
        }
    }

    fn validate(&self, table: &str) -> Result<()> {
        let weights = [self.dcf, self.fundamentals, self.quality];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ValuationError::InvalidConfig(format!(
                "{table} weights must be finite and non-negative"
            )));
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(ValuationError::InvalidConfig(format!(
                "{table} weights must sum to 1.0, got {total}"
            )));
        }
        Ok(())
    }
}

/// A pair of tables selected by growth profile. Value and blend share the
/// standard entry.
///
/// When deserialized, an absent side keeps its default table, and a
/// threshold table only replaces the metrics it names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileTables<T> {
    pub standard: T,
    pub growth: T,
}

impl<T> ProfileTables<T> {
    pub fn for_profile(&self, profile: GrowthProfile) -> &T {
        match profile {
            GrowthProfile::Growth => &self.growth,
            GrowthProfile::Value | GrowthProfile::Blend => &self.standard,
        }
    }
}

impl Default for ProfileTables<ThresholdTable> {
    fn default() -> Self {
        Self {
            standard: ThresholdTable::standard(),
            growth: ThresholdTable::growth_adjusted(),
        }
    }
}

impl Default for ProfileTables<ScoreWeights> {
    fn default() -> Self {
        Self {
            standard: ScoreWeights::standard(),
            growth: ScoreWeights::growth_adjusted(),
        }
    }
}

/// Sides of a [`ProfileTables`] present in a config file
#[derive(Deserialize)]
struct ProfileOverrides<O> {
    standard: Option<O>,
    growth: Option<O>,
}

impl<O> ProfileOverrides<O> {
    fn merge_into<T>(self, defaults: ProfileTables<T>, apply: impl Fn(O, T) -> T) -> ProfileTables<T> {
        let ProfileTables { standard, growth } = defaults;
        ProfileTables {
            standard: match self.standard {
                Some(o) => apply(o, standard),
                None => standard,
            },
            growth: match self.growth {
                Some(o) => apply(o, growth),
                None => growth,
            },
        }
    }
}

/// Metrics named in a partial threshold table
#[derive(Debug, Deserialize)]
struct ThresholdOverrides {
    pe: Option<Threshold>,
    forward_pe: Option<Threshold>,
    p_fcf: Option<Threshold>,
    ev_ebitda: Option<Threshold>,
    peg: Option<Threshold>,
    margin_of_safety: Option<Threshold>,
    analyst_upside: Option<Threshold>,
    roe: Option<Threshold>,
    debt_to_equity: Option<Threshold>,
    revenue_growth: Option<Threshold>,
    earnings_growth: Option<Threshold>,
}

impl ThresholdOverrides {
    fn apply(self, base: ThresholdTable) -> ThresholdTable {
        ThresholdTable {
            pe: self.pe.unwrap_or(base.pe),
            forward_pe: self.forward_pe.unwrap_or(base.forward_pe),
            p_fcf: self.p_fcf.unwrap_or(base.p_fcf),
            ev_ebitda: self.ev_ebitda.unwrap_or(base.ev_ebitda),
            peg: self.peg.unwrap_or(base.peg),
            margin_of_safety: self.margin_of_safety.unwrap_or(base.margin_of_safety),
            analyst_upside: self.analyst_upside.unwrap_or(base.analyst_upside),
            roe: self.roe.unwrap_or(base.roe),
            debt_to_equity: self.debt_to_equity.unwrap_or(base.debt_to_equity),
            revenue_growth: self.revenue_growth.unwrap_or(base.revenue_growth),
            earnings_growth: self.earnings_growth.unwrap_or(base.earnings_growth),
        }
    }
}

impl<'de> Deserialize<'de> for ProfileTables<ThresholdTable> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let overrides = ProfileOverrides::<ThresholdOverrides>::deserialize(deserializer)?;
        Ok(overrides.merge_into(Self::default(), ThresholdOverrides::apply))
    }
}

// A weight triple must sum to 1, so it is replaced whole rather than merged.
impl<'de> Deserialize<'de> for ProfileTables<ScoreWeights> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let overrides = ProfileOverrides::<ScoreWeights>::deserialize(deserializer)?;
        Ok(overrides.merge_into(Self::default(), |weights, _| weights))
    }
}

/// Rules turning the per-metric signal mix into an overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalRules {
    /// Fewer scored (non-"na") signals than this yields insufficient data
    pub min_scored_signals: usize,
    /// Green share at or above this is undervalued
    pub undervalued_green_ratio: f64,
    /// Green share below this is overvalued
    pub overvalued_green_ratio: f64,
}

impl Default for SignalRules {
    fn default() -> Self {
        Self {
            min_scored_signals: 3,
            undervalued_green_ratio: 0.55,
            overvalued_green_ratio: 0.25,
        }
    }
}

impl SignalRules {
    fn validate(&self) -> Result<()> {
        let (over, under) = (self.overvalued_green_ratio, self.undervalued_green_ratio);
        if !(0.0..=1.0).contains(&over) || !(0.0..=1.0).contains(&under) || over > under {
            return Err(ValuationError::InvalidConfig(format!(
                "green ratio cut-offs must satisfy 0 <= overvalued ({over}) <= undervalued ({under}) <= 1"
            )));
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    pub dcf: DcfParams,
    pub projection: ProjectionParams,
    pub classification: ClassificationThresholds,
    pub thresholds: ProfileTables<ThresholdTable>,
    pub weights: ProfileTables<ScoreWeights>,
    pub signal_rules: SignalRules,
}

impl ValuationConfig {
    /// Default configuration with the DCF rates and horizon overridden
    pub fn with_dcf_rates(wacc: f64, terminal_growth: f64, projection_years: u32) -> Self {
        Self {
            dcf: DcfParams::with_rates(wacc, terminal_growth, projection_years),
            ..Self::default()
        }
    }

    /// Reject configurations that would produce meaningless valuations
    pub fn validate(&self) -> Result<()> {
        self.dcf.validate()?;
        self.projection.validate()?;
        self.thresholds.standard.validate("standard")?;
        self.thresholds.growth.validate("growth")?;
        self.weights.standard.validate("standard")?;
        self.weights.growth.validate("growth")?;
        self.signal_rules.validate()?;

        let c = &self.classification;
        for (name, value) in [
            ("growth_revenue", c.growth_revenue),
            ("growth_earnings", c.growth_earnings),
            ("growth_pe", c.growth_pe),
            ("value_revenue", c.value_revenue),
            ("value_earnings", c.value_earnings),
            ("value_pe", c.value_pe),
        ] {
            ensure_finite(&format!("classification.{name}"), value)?;
        }
        Ok(())
    }
}

fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValuationError::InvalidConfig(format!("{name} must be finite, got {value}")))
    }
}
