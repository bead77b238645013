use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use valuation_core::MarketDataSource;
use valuation_engine::ValuationPipeline;

mod config;
mod source;

use source::JsonFileSource;

/// Score and rank equities from fundamentals and price snapshots
#[derive(Debug, Parser)]
#[command(name = "valuation-cli", version)]
struct Args {
    /// JSON array of fundamentals records
    #[arg(long)]
    fundamentals: PathBuf,

    /// JSON array of price quotes
    #[arg(long)]
    prices: PathBuf,

    /// Optional JSON engine configuration (partial files are merged over defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Restrict the run to these tickers (comma separated)
    #[arg(long, value_delimiter = ',')]
    tickers: Vec<String>,

    /// Discount rate override
    #[arg(long)]
    wacc: Option<f64>,

    /// Terminal growth override
    #[arg(long)]
    terminal_growth: Option<f64>,

    /// Projection horizon override, in years
    #[arg(long)]
    years: Option<u32>,

    /// Only emit the top N results
    #[arg(long)]
    top: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let mut config = config::load(args.config.as_deref())?;
    if let Some(wacc) = args.wacc {
        config.dcf.wacc = wacc;
    }
    if let Some(tg) = args.terminal_growth {
        config.dcf.terminal_growth = tg;
    }
    if let Some(years) = args.years {
        config.dcf.projection_years = years;
    }

    let pipeline = ValuationPipeline::new(config).context("invalid valuation configuration")?;
    tracing::info!(
        "DCF: wacc={:.2}%, terminal growth={:.2}%, {}-year horizon",
        pipeline.config().dcf.wacc * 100.0,
        pipeline.config().dcf.terminal_growth * 100.0,
        pipeline.config().dcf.projection_years
    );

    let tickers: Vec<String> = args.tickers.iter().map(|t| t.trim().to_uppercase()).collect();
    let source = JsonFileSource::new(&args.fundamentals, &args.prices);
    let (fundamentals, prices) = tokio::try_join!(
        source.fetch_fundamentals(&tickers),
        source.fetch_prices(&tickers)
    )?;
    tracing::info!(
        fundamentals = fundamentals.len(),
        prices = prices.len(),
        "loaded market data"
    );

    let mut results = pipeline.run(&fundamentals, &prices);
    if let Some(top) = args.top {
        results.truncate(top);
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("writing results")?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
