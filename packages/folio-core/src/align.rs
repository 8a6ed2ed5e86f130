//! Trading-calendar alignment across assets and benchmark.
//!
//! Alignment runs in two stages. Asset series are inner-joined on dates
//! first, with coverage accounting over their union calendar; the surviving
//! calendar is then intersected with the benchmark separately. Asset-to-asset
//! gaps and benchmark gaps have different causes (listing dates and data
//! holes vs exchange calendar mismatches) and are reported apart.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::types::{Portfolio, PriceSeries};
use crate::{Error, Result};

/// Data-quality verdict for one ticker's price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    /// Every observed price is identical
    ConstantPrice,
    /// More than the configured share of day-over-day changes is exactly zero
    StalePrices,
}

/// Coverage of one ticker across the union calendar.
#[derive(Debug, Clone, Serialize)]
pub struct TickerCoverage {
    pub ticker: String,
    /// Dates this ticker has data for
    pub available: usize,
    /// `available` over the union calendar size
    pub coverage: f64,
    /// Coverage fell below the configured threshold
    pub low_overlap: bool,
    /// Quality flags raised while validating the raw series
    pub flags: Vec<QualityFlag>,
}

/// Observability output of the alignment stage. Nothing in here is fatal by
/// itself; alignment fails separately when too few dates survive.
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentDiagnostics {
    /// Union of all asset dates
    pub total_dates: usize,
    /// Dates where every present ticker has data
    pub fully_aligned_dates: usize,
    /// Per-ticker coverage, in portfolio order
    pub per_ticker_coverage: Vec<TickerCoverage>,
    /// Share of the union calendar lost to the inner join
    pub dropped_fraction: f64,
    /// Portfolio tickers with no usable price series
    pub missing_tickers: Vec<String>,
    /// Dates shared by the aligned asset calendar and the benchmark
    pub benchmark_common_dates: usize,
}

/// Prices restricted to the dates every surviving series shares.
///
/// Columns run parallel to `tickers`; the benchmark column sits on the same
/// final calendar as the assets.
#[derive(Debug, Clone)]
pub struct AlignedPrices {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    columns: Vec<Vec<f64>>,
    benchmark: Vec<f64>,
}

impl AlignedPrices {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Tickers that survived alignment, in portfolio order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Price column for one asset, parallel to `dates`.
    pub fn column(&self, idx: usize) -> &[f64] {
        &self.columns[idx]
    }

    pub fn benchmark(&self) -> &[f64] {
        &self.benchmark
    }

    pub(crate) fn asset_prices(&self, idx: usize) -> PriceSeries {
        PriceSeries::from_parts(self.dates.clone(), self.columns[idx].clone())
    }

    pub(crate) fn benchmark_prices(&self) -> PriceSeries {
        PriceSeries::from_parts(self.dates.clone(), self.benchmark.clone())
    }
}

/// Align asset price series onto a common calendar, then intersect the
/// survivors with the benchmark.
///
/// Tickers without a usable series are reported in the diagnostics and left
/// out; their weights stay untouched so the result reflects the intended
/// allocation. An empty final calendar is not an error here: downstream
/// return derivation rejects it with the better message.
///
/// # Errors
///
/// `InsufficientData` when no portfolio ticker has any data, or when fewer
/// than `config.min_aligned_days` dates survive the asset inner join.
pub fn align_prices(
    portfolio: &Portfolio,
    prices: &BTreeMap<String, PriceSeries>,
    benchmark: &PriceSeries,
    config: &AnalysisConfig,
) -> Result<(AlignedPrices, AlignmentDiagnostics)> {
    let mut missing_tickers = Vec::new();
    let mut present: Vec<(&String, &PriceSeries)> = Vec::new();
    for ticker in portfolio.tickers() {
        match prices.get(ticker) {
            Some(series) if !series.is_empty() => present.push((ticker, series)),
            _ => {
                warn!("{}: no price data, analyzing the remaining holdings", ticker);
                missing_tickers.push(ticker.clone());
            }
        }
    }
    if present.is_empty() {
        return Err(Error::InsufficientData(
            "No price data for any portfolio ticker".to_string(),
        ));
    }

    let maps: Vec<BTreeMap<NaiveDate, f64>> = present
        .iter()
        .map(|(_, series)| {
            series
                .dates()
                .iter()
                .copied()
                .zip(series.values().iter().copied())
                .collect()
        })
        .collect();

    let mut union: BTreeSet<NaiveDate> = BTreeSet::new();
    for (_, series) in &present {
        union.extend(series.dates().iter().copied());
    }
    let total_dates = union.len();

    let kept: Vec<NaiveDate> = union
        .iter()
        .copied()
        .filter(|date| maps.iter().all(|map| map.contains_key(date)))
        .collect();
    let fully_aligned_dates = kept.len();
    let dropped_fraction = (total_dates - fully_aligned_dates) as f64 / total_dates as f64;

    let per_ticker_coverage: Vec<TickerCoverage> = present
        .iter()
        .map(|(ticker, series)| {
            let available = series.len();
            let coverage = available as f64 / total_dates as f64;
            let low_overlap = coverage < config.low_coverage_threshold;
            if low_overlap {
                warn!(
                    "{}: {}/{} days ({:.1}%) - low overlap may skew results",
                    ticker,
                    available,
                    total_dates,
                    coverage * 100.0
                );
            }
            TickerCoverage {
                ticker: (*ticker).clone(),
                available,
                coverage,
                low_overlap,
                flags: quality_flags(ticker, series, config),
            }
        })
        .collect();

    info!(
        "Alignment: {}/{} dates fully aligned across {} tickers ({:.1}% dropped)",
        fully_aligned_dates,
        total_dates,
        present.len(),
        dropped_fraction * 100.0
    );
    if dropped_fraction > config.max_dropped_fraction {
        warn!(
            "Dropped {:.1}% of trading dates during alignment; asset calendars overlap poorly",
            dropped_fraction * 100.0
        );
    }
    if fully_aligned_dates < config.min_aligned_days {
        return Err(Error::InsufficientData(format!(
            "Only {} aligned trading days, need at least {}",
            fully_aligned_dates, config.min_aligned_days
        )));
    }

    // second stage: the benchmark restricts the calendar but never feeds
    // back into the asset coverage numbers above
    let benchmark_map: BTreeMap<NaiveDate, f64> = benchmark
        .dates()
        .iter()
        .copied()
        .zip(benchmark.values().iter().copied())
        .collect();
    let final_dates: Vec<NaiveDate> = kept
        .iter()
        .copied()
        .filter(|date| benchmark_map.contains_key(date))
        .collect();
    let benchmark_common_dates = final_dates.len();
    info!(
        "Benchmark shares {} of {} aligned dates",
        benchmark_common_dates, fully_aligned_dates
    );

    let tickers: Vec<String> = present.iter().map(|(ticker, _)| (*ticker).clone()).collect();
    let columns: Vec<Vec<f64>> = maps
        .iter()
        .map(|map| final_dates.iter().map(|date| map[date]).collect())
        .collect();
    let benchmark_column: Vec<f64> = final_dates.iter().map(|date| benchmark_map[date]).collect();

    Ok((
        AlignedPrices {
            dates: final_dates,
            tickers,
            columns,
            benchmark: benchmark_column,
        },
        AlignmentDiagnostics {
            total_dates,
            fully_aligned_dates,
            per_ticker_coverage,
            dropped_fraction,
            missing_tickers,
            benchmark_common_dates,
        },
    ))
}

fn quality_flags(ticker: &str, series: &PriceSeries, config: &AnalysisConfig) -> Vec<QualityFlag> {
    let values = series.values();
    if values.iter().all(|v| *v == values[0]) {
        warn!("{}: price never changes over {} days", ticker, values.len());
        return vec![QualityFlag::ConstantPrice];
    }
    // the first day has no prior close and counts as an unchanged day
    let unchanged = 1 + values.windows(2).filter(|pair| pair[1] == pair[0]).count();
    if unchanged as f64 > config.stale_price_threshold * values.len() as f64 {
        warn!(
            "{}: {} of {} closes unchanged, prices look stale",
            ticker,
            unchanged,
            values.len()
        );
        return vec![QualityFlag::StalePrices];
    }
    Vec::new()
}
