use valuation_core::{DcfParams, DcfValuation, Fundamentals, PriceQuote, Result};

use crate::numeric::{finite, positive, round_to};

/// Discounted-cash-flow intrinsic value and margin of safety.
///
/// Projects trailing free cash flow for `params.projection_years` at the
/// clamped historical growth rate, adds a Gordon growth terminal value, then
/// adjusts for cash and debt. Returns an unavailable valuation (both fields
/// `None`) when FCF, shares or price are missing or non-positive, or when the
/// resulting equity value is not positive.
///
/// Errors only when `params` is invalid, most notably when `wacc` does not
/// exceed `terminal_growth`.
pub fn compute_dcf(fund: &Fundamentals, price: &PriceQuote, params: &DcfParams) -> Result<DcfValuation> {
    params.validate()?;
    Ok(discounted_value(fund, price, params))
}

/// Same as [`compute_dcf`] for parameters that were already validated
pub(crate) fn discounted_value(fund: &Fundamentals, price: &PriceQuote, params: &DcfParams) -> DcfValuation {
    let (Some(fcf), Some(shares), Some(current_price)) = (
        positive(fund.ttm_fcf),
        positive(fund.shares_outstanding),
        price.usable_price(),
    ) else {
        return DcfValuation::unavailable();
    };

    let cash = finite(fund.total_cash).unwrap_or(0.0);
    let debt = finite(fund.total_debt).unwrap_or(0.0);

    let growth = finite(fund.fcf_growth_rate)
        .unwrap_or(params.default_fcf_growth)
        .clamp(params.min_fcf_growth, params.max_fcf_growth);

    let wacc = params.wacc;
    let years = params.projection_years as i32;

    let projected_pv: f64 = (1..=years)
        .map(|year| fcf * (1.0 + growth).powi(year) / (1.0 + wacc).powi(year))
        .sum();
    let terminal_value =
        fcf * (1.0 + growth).powi(years) * (1.0 + params.terminal_growth) / (wacc - params.terminal_growth);
    let terminal_pv = terminal_value / (1.0 + wacc).powi(years);

    let equity = projected_pv + terminal_pv + cash - debt;
    if !equity.is_finite() || equity <= 0.0 {
        tracing::debug!(ticker = %fund.ticker, equity, "DCF unavailable: non-positive equity value");
        return DcfValuation::unavailable();
    }

    let intrinsic_value = round_to(equity / shares, 2);
    if intrinsic_value <= 0.0 {
        return DcfValuation::unavailable();
    }
    let margin_of_safety = round_to((intrinsic_value - current_price) / intrinsic_value, 4);

    DcfValuation {
        intrinsic_value: Some(intrinsic_value),
        margin_of_safety: Some(margin_of_safety),
    }
}
