//! Weighted composition of aligned returns.

use serde::Serialize;

use crate::align::AlignedPrices;
use crate::analytics::simple_returns;
use crate::types::{Portfolio, ReturnSeries};
use crate::{Error, Result};

/// One asset's return series with the weight it carries in the portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct AssetReturns {
    pub ticker: String,
    pub weight: f64,
    pub returns: ReturnSeries,
}

/// Portfolio and benchmark return series on one shared calendar.
#[derive(Debug, Clone, Serialize)]
pub struct ComposedReturns {
    pub portfolio: ReturnSeries,
    pub benchmark: ReturnSeries,
    /// Per-asset returns feeding the composite, in portfolio order
    pub assets: Vec<AssetReturns>,
}

/// Compose aligned prices into portfolio and benchmark return series.
///
/// The portfolio return at each date is the weight-dot-product of the
/// per-asset returns. Weights are applied exactly as held in the portfolio:
/// when a ticker was dropped during alignment its weight simply never
/// contributes, and the remaining weights are not renormalized.
///
/// # Errors
///
/// `InsufficientData` when the shared calendar has fewer than two dates, so
/// no return can be derived. After a successful asset alignment this only
/// happens when the benchmark calendar barely overlaps the assets.
pub fn compose(aligned: &AlignedPrices, portfolio: &Portfolio) -> Result<ComposedReturns> {
    if aligned.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "Portfolio and benchmark calendars share only {} date(s), need at least 2 to derive returns",
            aligned.len()
        )));
    }

    let mut assets = Vec::with_capacity(aligned.tickers().len());
    for (idx, ticker) in aligned.tickers().iter().enumerate() {
        let weight = portfolio.weight_of(ticker).ok_or_else(|| {
            Error::DegenerateInput(format!("Aligned ticker {ticker} is not in the portfolio"))
        })?;
        let returns = simple_returns(&aligned.asset_prices(idx))?;
        assets.push(AssetReturns {
            ticker: ticker.clone(),
            weight,
            returns,
        });
    }

    let benchmark = simple_returns(&aligned.benchmark_prices())?;

    let mut values = vec![0.0; aligned.len() - 1];
    for asset in &assets {
        for (acc, r) in values.iter_mut().zip(asset.returns.values()) {
            *acc += asset.weight * r;
        }
    }
    let portfolio_returns = ReturnSeries::from_parts(aligned.dates()[1..].to_vec(), values);

    Ok(ComposedReturns {
        portfolio: portfolio_returns,
        benchmark,
        assets,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Days, NaiveDate};

    use crate::align::align_prices;
    use crate::config::AnalysisConfig;
    use crate::types::PriceSeries;

    use super::*;

    fn prices(values: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start + Days::new(i as u64))
            .collect();
        PriceSeries::new(dates, values.to_vec()).unwrap()
    }

    fn test_config() -> AnalysisConfig {
        AnalysisConfig {
            min_aligned_days: 3,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_compose_weighted_sum() {
        let portfolio = Portfolio::new(
            vec!["A".to_string(), "B".to_string()],
            vec![0.75, 0.25],
        )
        .unwrap();
        let mut map = BTreeMap::new();
        // A: +10% then -10%; B: +20% then +5%
        map.insert("A".to_string(), prices(&[100.0, 110.0, 99.0]));
        map.insert("B".to_string(), prices(&[200.0, 240.0, 252.0]));
        let benchmark = prices(&[1000.0, 1010.0, 1020.0]);

        let (aligned, _) = align_prices(&portfolio, &map, &benchmark, &test_config()).unwrap();
        let composed = compose(&aligned, &portfolio).unwrap();

        assert_eq!(composed.portfolio.len(), 2);
        let day1 = 0.75 * 0.10 + 0.25 * 0.20;
        let day2 = 0.75 * (-0.10) + 0.25 * 0.05;
        assert!((composed.portfolio.values()[0] - day1).abs() < 1e-9);
        assert!((composed.portfolio.values()[1] - day2).abs() < 1e-9);

        assert_eq!(composed.assets.len(), 2);
        assert_eq!(composed.assets[0].ticker, "A");
        assert!((composed.assets[0].weight - 0.75).abs() < 1e-12);
        assert!((composed.benchmark.values()[0] - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_compose_keeps_static_weights_for_missing_ticker() {
        let portfolio = Portfolio::new(
            vec!["A".to_string(), "B".to_string(), "GONE".to_string()],
            vec![0.5, 0.3, 0.2],
        )
        .unwrap();
        let mut map = BTreeMap::new();
        map.insert("A".to_string(), prices(&[100.0, 110.0, 121.0]));
        map.insert("B".to_string(), prices(&[100.0, 105.0, 110.25]));
        let benchmark = prices(&[1000.0, 1010.0, 1020.0]);

        let (aligned, diag) = align_prices(&portfolio, &map, &benchmark, &test_config()).unwrap();
        assert_eq!(diag.missing_tickers, vec!["GONE".to_string()]);

        let composed = compose(&aligned, &portfolio).unwrap();
        // GONE's 0.2 weight stays idle rather than being redistributed
        let expected = 0.5 * 0.10 + 0.3 * 0.05;
        assert!((composed.portfolio.values()[0] - expected).abs() < 1e-9);
        let weight_sum: f64 = composed.assets.iter().map(|a| a.weight).sum();
        assert!((weight_sum - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_compose_empty_benchmark_overlap_errors() {
        let portfolio = Portfolio::new(
            vec!["A".to_string(), "B".to_string()],
            vec![0.5, 0.5],
        )
        .unwrap();
        let mut map = BTreeMap::new();
        map.insert("A".to_string(), prices(&[100.0, 110.0, 99.0]));
        map.insert("B".to_string(), prices(&[200.0, 240.0, 252.0]));
        // benchmark trades on entirely different dates
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let dates = (0..3).map(|i| start + Days::new(i)).collect();
        let benchmark = PriceSeries::new(dates, vec![1.0, 2.0, 3.0]).unwrap();

        let (aligned, _) = align_prices(&portfolio, &map, &benchmark, &test_config()).unwrap();
        assert!(matches!(
            compose(&aligned, &portfolio),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_composed_series_share_dates() {
        let portfolio = Portfolio::new(vec!["A".to_string()], vec![1.0]).unwrap();
        let mut map = BTreeMap::new();
        map.insert("A".to_string(), prices(&[100.0, 101.0, 102.0, 103.0]));
        let benchmark = prices(&[50.0, 51.0, 52.0, 53.0]);

        let (aligned, _) = align_prices(&portfolio, &map, &benchmark, &test_config()).unwrap();
        let composed = compose(&aligned, &portfolio).unwrap();
        assert_eq!(composed.portfolio.dates(), composed.benchmark.dates());
        for asset in &composed.assets {
            assert_eq!(asset.returns.dates(), composed.portfolio.dates());
        }
    }
}
