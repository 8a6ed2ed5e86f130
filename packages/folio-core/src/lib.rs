//! Folio Core - portfolio performance and risk analytics.
//!
//! This crate computes risk-adjusted analytics for a fixed-weight equity
//! portfolio against a benchmark index, starting from daily closing prices:
//!
//! - **Alignment**: common trading calendar across assets and benchmark,
//!   with per-ticker coverage diagnostics and data-quality flags
//! - **Returns**: simple, cumulative, CAGR, annualized
//! - **Risk**: volatility, downside deviation, max drawdown, Sharpe, Sortino
//! - **Market-relative**: beta, tracking error, information ratio, excess return
//! - **Structure**: per-asset contribution, concentration, effective N
//! - **Behavior**: rolling CAGR, win rate, gain/loss asymmetry
//!
//! Metrics a dataset cannot support (a zero-volatility Sharpe ratio, beta
//! against a flat benchmark) are reported as skipped with a reason instead
//! of coming back as `NaN` or a silent default.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use chrono::{Days, NaiveDate};
//! use folio_core::{AnalysisConfig, Analyzer, Portfolio, PriceSeries};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let dates: Vec<NaiveDate> = (0..90).map(|i| start + Days::new(i)).collect();
//! let ramp = |step: f64| {
//!     let values = (0..90).map(|i| 100.0 + step * i as f64).collect();
//!     PriceSeries::new(dates.clone(), values).unwrap()
//! };
//!
//! let mut prices = BTreeMap::new();
//! prices.insert("RELIANCE.NS".to_string(), ramp(0.5));
//! prices.insert("TCS.NS".to_string(), ramp(0.3));
//! let benchmark = ramp(0.2);
//!
//! let portfolio = Portfolio::new(
//!     vec!["RELIANCE.NS".into(), "TCS.NS".into()],
//!     vec![0.6, 0.4],
//! )
//! .unwrap();
//!
//! let analyzer = Analyzer::new(AnalysisConfig::default());
//! let report = analyzer.analyze(&portfolio, &prices, &benchmark).unwrap();
//! assert!(report.metrics.value("annual_return").is_some());
//! ```

pub mod align;
pub mod analytics;
pub mod analyzer;
pub mod compose;
pub mod config;
pub mod loader;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use config::AnalysisConfig;
pub use report::{export_json, render_text, MetricsReport, SkippedMetric};
pub use types::{Portfolio, PriceSeries, ReturnSeries};

// Re-export main functionality
pub use align::{align_prices, AlignedPrices, AlignmentDiagnostics, QualityFlag, TickerCoverage};
pub use analytics::{
    annualized_excess_return, annualized_return, beta, cagr, concentration,
    contribution_by_asset, cumulative_returns, downside_deviation, effective_n_stocks,
    excess_returns, gain_loss_profile, information_ratio, max_drawdown, rolling_cagr,
    sharpe_ratio, simple_returns, sortino_ratio, tracking_error, volatility, win_rate,
    AssetContribution, ContributionSummary, GainLossProfile, RollingSeries,
};
pub use analyzer::{AnalysisReport, Analyzer};
pub use compose::{compose, AssetReturns, ComposedReturns};
pub use loader::{example_holdings, load_holdings, load_price_dir, load_prices};

/// Error types for folio-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Undefined ratio: {0}")]
    UndefinedRatio(String),

    #[error("Invalid portfolio: {0}")]
    InvalidPortfolio(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),
}

/// Result type for folio-core operations.
pub type Result<T> = std::result::Result<T, Error>;
