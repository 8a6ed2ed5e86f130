//! Analysis configuration.

use serde::{Deserialize, Serialize};

/// Tunable constants for one analysis run.
///
/// Every annualization and data-quality threshold in the pipeline reads from
/// here, so a run is reproducible from its config alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Trading days per year used for annualization
    pub trading_days: usize,
    /// Annual risk-free rate as a fraction (0.065 = 6.5%)
    pub risk_free_rate: f64,
    /// Minimum aligned trading days for a meaningful analysis
    pub min_aligned_days: usize,
    /// Per-ticker coverage below this fraction of the union calendar is
    /// flagged as low overlap
    pub low_coverage_threshold: f64,
    /// Dropped-date fraction above this raises a data-quality warning
    pub max_dropped_fraction: f64,
    /// Share of zero day-over-day price changes above which a series is
    /// flagged as stale
    pub stale_price_threshold: f64,
    /// Window length (in trading days) for rolling annualized returns
    pub rolling_window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trading_days: 252,
            risk_free_rate: 0.065,
            min_aligned_days: 60,
            low_coverage_threshold: 0.8,
            max_dropped_fraction: 0.2,
            stale_price_threshold: 0.3,
            rolling_window: 252,
        }
    }
}
