//! Folio CLI - portfolio analysis over CSV files on disk.
//!
//! `folio init` writes a starter holdings file; `folio analyze` runs the
//! full pipeline and prints a text or JSON report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_core::{
    example_holdings, export_json, load_holdings, load_price_dir, load_prices, render_text,
    AnalysisConfig, Analyzer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio performance and risk analytics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a portfolio against a benchmark index
    Analyze {
        /// Holdings CSV with Ticker,Amount rows
        #[arg(short, long)]
        portfolio: PathBuf,
        /// Directory of <TICKER>.csv price files
        #[arg(long)]
        prices: PathBuf,
        /// Benchmark ticker, resolved to <TICKER>.csv in the price directory
        #[arg(short, long, default_value = "^NSEI")]
        benchmark: String,
        /// Annual risk-free rate, in percent
        #[arg(long, default_value = "6.5")]
        risk_free: f64,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a starter holdings file
    Init {
        /// Where to write the file
        #[arg(short, long, default_value = "holdings.csv")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            portfolio,
            prices,
            benchmark,
            risk_free,
            json,
            output,
        } => analyze(&portfolio, &prices, &benchmark, risk_free, json, output),
        Commands::Init { path } => init(&path),
    }
}

fn analyze(
    portfolio_path: &Path,
    prices_dir: &Path,
    benchmark: &str,
    risk_free: f64,
    json: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let portfolio = load_holdings(portfolio_path)
        .with_context(|| format!("loading holdings from {}", portfolio_path.display()))?;
    let (prices, _failures) = load_price_dir(prices_dir, portfolio.tickers());

    let benchmark_path = prices_dir.join(format!("{benchmark}.csv"));
    let benchmark_prices = load_prices(&benchmark_path)
        .with_context(|| format!("loading benchmark prices from {}", benchmark_path.display()))?;

    let config = AnalysisConfig {
        risk_free_rate: risk_free / 100.0,
        ..AnalysisConfig::default()
    };
    let report = Analyzer::new(config).analyze(&portfolio, &prices, &benchmark_prices)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&export_json(&report))?);
    } else {
        print!("{}", render_text(&report));
    }
    if let Some(path) = output {
        fs::write(&path, serde_json::to_string_pretty(&export_json(&report))?)
            .with_context(|| format!("writing report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn init(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists, not overwriting it", path.display());
    }
    fs::write(path, example_holdings())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote starter holdings to {}", path.display());
    println!("Add one <TICKER>.csv price file per holding, then run: folio analyze");
    Ok(())
}
