//! Deterministic equity valuation engine.
//!
//! Blends a discounted-cash-flow estimate, valuation-multiple comparisons and
//! quality/growth signals into a composite score per ticker. Every function
//! here is a pure transformation of its inputs and the supplied
//! [`ValuationConfig`]; nothing fetches, caches or mutates shared state, so
//! runs can be fanned out across threads freely.

pub mod builder;
pub mod dcf;
mod numeric;
pub mod pipeline;
pub mod profile;
pub mod projection;
pub mod signal;

pub use builder::{build_valuation_result, ValuationResultBuilder};
pub use dcf::compute_dcf;
pub use pipeline::{run_valuation, ValuationPipeline};
pub use profile::classify_growth_profile;
pub use projection::compute_five_year_estimate;
pub use signal::signal_for_metric;

pub use valuation_core::*;
