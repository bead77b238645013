//! Assembles a scored [`ValuationResult`] for one ticker.
//!
//! Scoring is table-driven: [`METRIC_RULES`] lists every scorable metric with
//! its direction and pillar, and the growth profile picks the threshold table
//! and weight triple once, up front.

use std::collections::BTreeMap;

use valuation_core::{
    DcfValuation, Fundamentals, GrowthProfile, Metric, MetricSignal, OverallSignal, Pillar,
    PillarScores, PriceQuote, ScoreWeights, SignalRules, ValuationConfig, ValuationResult,
};

use crate::numeric::{finite, positive, round_to};
use crate::profile::classify_growth_profile;
use crate::projection::compute_five_year_estimate;
use crate::signal::classify;

/// Score used for a pillar with no scored signals
const NEUTRAL_PILLAR_SCORE: f64 = 0.5;

/// How one metric is scored
#[derive(Debug, Clone, Copy)]
pub struct MetricRule {
    pub metric: Metric,
    pub pillar: Pillar,
    pub higher_is_better: bool,
    /// Only scored for growth-profile companies
    pub growth_only: bool,
}

impl MetricRule {
    const fn new(metric: Metric, pillar: Pillar, higher_is_better: bool, growth_only: bool) -> Self {
        Self {
            metric,
            pillar,
            higher_is_better,
            growth_only,
        }
    }

    fn applies_to(&self, profile: GrowthProfile) -> bool {
        !self.growth_only || profile.is_growth()
    }
}

pub const METRIC_RULES: [MetricRule; 11] = [
    MetricRule::new(Metric::Pe, Pillar::Fundamentals, false, false),
    MetricRule::new(Metric::ForwardPe, Pillar::Fundamentals, false, false),
    MetricRule::new(Metric::PriceToFcf, Pillar::Fundamentals, false, false),
    MetricRule::new(Metric::EvEbitda, Pillar::Fundamentals, false, false),
    MetricRule::new(Metric::Peg, Pillar::Fundamentals, false, false),
    MetricRule::new(Metric::MarginOfSafety, Pillar::Dcf, true, false),
    MetricRule::new(Metric::AnalystUpside, Pillar::Quality, true, false),
    MetricRule::new(Metric::Roe, Pillar::Quality, true, false),
    MetricRule::new(Metric::DebtToEquity, Pillar::Quality, false, false),
    MetricRule::new(Metric::RevenueGrowth, Pillar::Quality, true, true),
    MetricRule::new(Metric::EarningsGrowth, Pillar::Quality, true, true),
];

/// Metric values after derivation, keyed the way the rule table reads them
#[derive(Debug, Clone, Copy, Default)]
struct MetricInputs {
    pe: Option<f64>,
    forward_pe: Option<f64>,
    p_fcf: Option<f64>,
    ev_ebitda: Option<f64>,
    peg: Option<f64>,
    margin_of_safety: Option<f64>,
    analyst_upside: Option<f64>,
    roe: Option<f64>,
    debt_to_equity: Option<f64>,
    revenue_growth: Option<f64>,
    earnings_growth: Option<f64>,
}

impl MetricInputs {
    fn value(&self, metric: Metric) -> Option<f64> {
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
}

/// Builds results against one configuration.
///
/// The configuration is assumed valid; the pipeline validates it once before
/// building anything.
#[derive(Debug, Clone, Copy)]
pub struct ValuationResultBuilder<'a> {
    config: &'a ValuationConfig,
}

impl<'a> ValuationResultBuilder<'a> {
    pub fn new(config: &'a ValuationConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, fund: &Fundamentals, price: &PriceQuote, dcf: DcfValuation) -> ValuationResult {
        let profile = classify_growth_profile(fund, &self.config.classification);
        let thresholds = self.config.thresholds.for_profile(profile);
        let weights = self.config.weights.for_profile(profile);

        let current_price = price.usable_price();
        let margin_of_safety = finite(dcf.margin_of_safety);
        let dcf_value = finite(dcf.intrinsic_value);

        let p_fcf = price_to_fcf(fund, current_price);
        let analyst_upside = match (finite(fund.analyst_target), current_price) {
            (Some(target), Some(p)) => Some((target - p) / p),
            _ => None,
        };

        let inputs = MetricInputs {
            pe: finite(fund.pe_ratio),
            forward_pe: finite(fund.forward_pe),
            p_fcf,
            ev_ebitda: finite(fund.ev_ebitda),
            peg: finite(fund.peg_ratio),
            margin_of_safety,
            analyst_upside,
            roe: finite(fund.roe),
            debt_to_equity: finite(fund.debt_to_equity),
            revenue_growth: finite(fund.revenue_growth),
            earnings_growth: finite(fund.earnings_growth),
        };

        let metric_signals: BTreeMap<Metric, MetricSignal> = METRIC_RULES
            .iter()
            .filter(|rule| rule.applies_to(profile))
            .map(|rule| {
                let signal = classify(
                    inputs.value(rule.metric),
                    thresholds.get(rule.metric),
                    rule.higher_is_better,
                );
                (rule.metric, signal)
            })
            .collect();

        let pillar_scores = PillarScores {
            dcf: pillar_score(&metric_signals, Pillar::Dcf),
            fundamentals: pillar_score(&metric_signals, Pillar::Fundamentals),
            quality: pillar_score(&metric_signals, Pillar::Quality),
        };
        let composite_score = composite(&pillar_scores, weights);
        let signal = overall_signal(&metric_signals, &self.config.signal_rules);

        let five_year = compute_five_year_estimate(fund, price, &self.config.projection);

        tracing::trace!(
            ticker = %fund.ticker,
            profile = %profile,
            composite_score,
            signal = %signal,
            "built valuation result"
        );

        ValuationResult {
            ticker: fund.ticker.clone(),
            company_name: fund.company_name.clone(),
            sector: fund.sector.clone(),
            price: price.price,
            market_cap: finite(price.market_cap),
            dcf_value,
            margin_of_safety,
            p_fcf,
            pe_ratio: inputs.pe,
            forward_pe: inputs.forward_pe,
            pb_ratio: finite(fund.pb_ratio),
            peg_ratio: inputs.peg,
            ev_ebitda: inputs.ev_ebitda,
            analyst_upside,
            roe: inputs.roe,
            operating_margins: finite(fund.operating_margins),
            profit_margins: finite(fund.profit_margins),
            debt_to_equity: inputs.debt_to_equity,
            revenue_growth: inputs.revenue_growth,
            earnings_growth: inputs.earnings_growth,
            beta: finite(fund.beta),
            five_yr_price: five_year.price,
            five_yr_cagr: five_year.cagr,
            five_yr_growth_used: five_year.growth_used,
            growth_profile: profile,
            metric_signals,
            pillar_scores,
            composite_score,
            signal,
            fetched_at: fund.fetched_at,
            priced_at: price.updated_at,
        }
    }
}

/// Build a result with the default configuration.
pub fn build_valuation_result(
    fund: &Fundamentals,
    price: &PriceQuote,
    dcf_value: Option<f64>,
    margin_of_safety: Option<f64>,
) -> ValuationResult {
    let config = ValuationConfig::default();
    ValuationResultBuilder::new(&config).build(
        fund,
        price,
        DcfValuation {
            intrinsic_value: dcf_value,
            margin_of_safety,
        },
    )
}

/// Market cap over trailing FCF, when shares, price and FCF are all positive
fn price_to_fcf(fund: &Fundamentals, current_price: Option<f64>) -> Option<f64> {
    let shares = positive(fund.shares_outstanding)?;
    let fcf = positive(fund.ttm_fcf)?;
    let p = current_price?;
    Some(shares * p / fcf)
}

fn pillar_score(signals: &BTreeMap<Metric, MetricSignal>, pillar: Pillar) -> f64 {
    let scores: Vec<f64> = METRIC_RULES
        .iter()
        .filter(|rule| rule.pillar == pillar)
        .filter_map(|rule| signals.get(&rule.metric))
        .filter_map(MetricSignal::score)
        .collect();

    if scores.is_empty() {
        NEUTRAL_PILLAR_SCORE
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

fn composite(pillars: &PillarScores, weights: &ScoreWeights) -> f64 {
    let raw = weights.get(Pillar::Dcf) * pillars.dcf
        + weights.get(Pillar::Fundamentals) * pillars.fundamentals
        + weights.get(Pillar::Quality) * pillars.quality;
    round_to(raw, 4).clamp(0.0, 1.0)
}

fn overall_signal(signals: &BTreeMap<Metric, MetricSignal>, rules: &SignalRules) -> OverallSignal {
    let scored = signals.values().filter(|s| s.is_scored()).count();
    if scored < rules.min_scored_signals || scored == 0 {
        return OverallSignal::InsufficientData;
    }

    let green = signals.values().filter(|s| **s == MetricSignal::Green).count();
    let green_ratio = green as f64 / scored as f64;

    if green_ratio >= rules.undervalued_green_ratio {
        OverallSignal::Undervalued
    } else if green_ratio < rules.overvalued_green_ratio {
        OverallSignal::Overvalued
    } else {
        OverallSignal::Fair
    }
}
