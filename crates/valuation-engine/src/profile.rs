use valuation_core::{ClassificationThresholds, Fundamentals, GrowthProfile};

use crate::numeric::finite;

/// Which way a single test leans
enum Lean {
    Growth,
    Value,
    Neither,
}

fn lean(value: Option<f64>, growth_at_or_above: f64, value_below: f64) -> Lean {
    match finite(value) {
        Some(v) if v >= growth_at_or_above => Lean::Growth,
        Some(v) if v < value_below => Lean::Value,
        _ => Lean::Neither,
    }
}

/// Label a company growth, value or blend.
///
/// Revenue growth, earnings growth and trailing P/E each contribute at most
/// one point to either tally; missing inputs contribute nothing. Two growth
/// points win, then two value points, otherwise blend.
pub fn classify_growth_profile(
    fund: &Fundamentals,
    thresholds: &ClassificationThresholds,
) -> GrowthProfile {
    let tests = [
        lean(fund.revenue_growth, thresholds.growth_revenue, thresholds.value_revenue),
        lean(fund.earnings_growth, thresholds.growth_earnings, thresholds.value_earnings),
        lean(fund.pe_ratio, thresholds.growth_pe, thresholds.value_pe),
    ];

    let growth_pts = tests.iter().filter(|l| matches!(l, Lean::Growth)).count();
    let value_pts = tests.iter().filter(|l| matches!(l, Lean::Value)).count();

    if growth_pts >= 2 {
        GrowthProfile::Growth
    } else if value_pts >= 2 {
        GrowthProfile::Value
    } else {
        GrowthProfile::Blend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fund(revenue_growth: Option<f64>, earnings_growth: Option<f64>, pe: Option<f64>) -> Fundamentals {
        Fundamentals {
            ticker: "TEST".to_string(),
            revenue_growth,
            earnings_growth,
            pe_ratio: pe,
            ..Default::default()
        }
    }

    fn classify(f: &Fundamentals) -> GrowthProfile {
        classify_growth_profile(f, &ClassificationThresholds::default())
    }

    #[test]
    fn test_growth_company() {
        assert_eq!(classify(&fund(Some(0.20), Some(0.20), Some(40.0))), GrowthProfile::Growth);
    }

    #[test]
    fn test_value_company() {
        assert_eq!(classify(&fund(Some(0.02), Some(0.02), Some(10.0))), GrowthProfile::Value);
    }

    #[test]
    fn test_two_of_three_is_enough() {
        assert_eq!(classify(&fund(Some(0.20), Some(0.18), Some(12.0))), GrowthProfile::Growth);
        assert_eq!(classify(&fund(Some(0.03), Some(0.25), Some(12.0))), GrowthProfile::Value);
    }

    #[test]
    fn test_mixed_is_blend() {
        // one growth, one value, one neutral
        assert_eq!(classify(&fund(Some(0.20), Some(0.02), Some(22.0))), GrowthProfile::Blend);
    }

    #[test]
    fn test_missing_inputs_count_for_nothing() {
        assert_eq!(classify(&fund(None, None, None)), GrowthProfile::Blend);
        assert_eq!(classify(&fund(Some(0.30), None, None)), GrowthProfile::Blend);
        assert_eq!(classify(&fund(Some(0.30), None, Some(f64::NAN))), GrowthProfile::Blend);
    }

    #[test]
    fn test_threshold_boundaries() {
        // exactly at the growth cut-off counts as growth; exactly at the value cut-off does not count as value
        assert_eq!(classify(&fund(Some(0.15), Some(0.15), None)), GrowthProfile::Growth);
        assert_eq!(classify(&fund(Some(0.08), Some(0.08), Some(18.0))), GrowthProfile::Blend);
    }
}
