use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use valuation_core::ValuationConfig;

/// Load the engine configuration.
///
/// Layers, later wins: built-in defaults, the optional JSON file, then the
/// `VALUATION_WACC`, `VALUATION_TERMINAL_GROWTH` and
/// `VALUATION_PROJECTION_YEARS` environment variables.
pub fn load(path: Option<&Path>) -> Result<ValuationConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => ValuationConfig::default(),
    };

    apply_env(&mut config)?;
    Ok(config)
}

fn apply_env(config: &mut ValuationConfig) -> Result<()> {
    if let Ok(v) = env::var("VALUATION_WACC") {
        config.dcf.wacc = v.parse().context("VALUATION_WACC is not a number")?;
    }
    if let Ok(v) = env::var("VALUATION_TERMINAL_GROWTH") {
        config.dcf.terminal_growth = v.parse().context("VALUATION_TERMINAL_GROWTH is not a number")?;
    }
    if let Ok(v) = env::var("VALUATION_PROJECTION_YEARS") {
        config.dcf.projection_years = v
            .parse()
            .context("VALUATION_PROJECTION_YEARS is not a whole number")?;
    }
    Ok(())
}
