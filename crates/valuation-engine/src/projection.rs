use valuation_core::{FiveYearEstimate, Fundamentals, PriceQuote, ProjectionParams};

use crate::numeric::{finite, positive, round_to};

const YEARS: i32 = 5;

/// Five-year price target from a forward EPS projection.
///
/// Backs out trailing EPS from price and trailing P/E, compounds it for five
/// years at the first known of earnings growth, revenue growth and FCF growth
/// (falling back to `params.default_growth`), clamped to the configured band,
/// and applies an exit multiple. Requires a positive trailing P/E and price.
pub fn compute_five_year_estimate(
    fund: &Fundamentals,
    price: &PriceQuote,
    params: &ProjectionParams,
) -> FiveYearEstimate {
    let (Some(pe), Some(current_price)) = (positive(fund.pe_ratio), price.usable_price()) else {
        return FiveYearEstimate::default();
    };

    let eps = current_price / pe;

    let growth = finite(fund.earnings_growth)
        .or(finite(fund.revenue_growth))
        .or(finite(fund.fcf_growth_rate))
        .unwrap_or(params.default_growth)
        .clamp(params.growth_floor, params.growth_cap);

    let exit_multiple = exit_multiple(finite(fund.forward_pe), pe, params);

    let projected_eps = eps * (1.0 + growth).powi(YEARS);
    let five_yr_price = round_to(projected_eps * exit_multiple, 2);
    let growth_used = Some(round_to(growth, 4));

    if five_yr_price <= 0.0 {
        return FiveYearEstimate {
            price: None,
            cagr: None,
            growth_used,
        };
    }

    let cagr = (five_yr_price / current_price).powf(1.0 / f64::from(YEARS)) - 1.0;

    FiveYearEstimate {
        price: Some(five_yr_price),
        cagr: Some(round_to(cagr, 4)),
        growth_used,
    }
}

/// Forward P/E inside (floor, cap], the cap when forward P/E runs above it,
/// otherwise trailing P/E bounded by the fallback multiple.
fn exit_multiple(forward_pe: Option<f64>, trailing_pe: f64, params: &ProjectionParams) -> f64 {
    match forward_pe {
        Some(fpe) if fpe > params.exit_multiple_floor && fpe <= params.exit_multiple_cap => fpe,
        Some(fpe) if fpe > params.exit_multiple_cap => params.exit_multiple_cap,
        _ => trailing_pe.min(params.fallback_exit_multiple),
    }
}
