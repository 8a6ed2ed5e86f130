//! Core data types: price series, return series, portfolio.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{Error, Result};

/// Weight sums may drift from 1.0 by at most this much.
const WEIGHT_TOLERANCE: f64 = 1e-3;

/// Daily closing prices for one instrument.
///
/// Invariants are enforced at construction and hold for the lifetime of the
/// value: dates are strictly increasing and every price is positive and
/// finite. An empty series is valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl PriceSeries {
    /// Build a validated price series from parallel date and price vectors.
    ///
    /// # Errors
    ///
    /// `DegenerateInput` when the vectors differ in length, a date does not
    /// strictly follow its predecessor, or a price is not a positive finite
    /// number.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(Error::DegenerateInput(format!(
                "{} dates but {} prices",
                dates.len(),
                values.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(Error::DegenerateInput(format!(
                "dates must be strictly increasing: {} is not after {}",
                pair[1], pair[0]
            )));
        }
        if let Some(price) = values.iter().find(|p| !p.is_finite() || **p <= 0.0) {
            return Err(Error::DegenerateInput(format!(
                "prices must be positive, got {price}"
            )));
        }
        Ok(Self { dates, values })
    }

    /// Construct from components already known to satisfy the invariants.
    pub(crate) fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        debug_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
        Self { dates, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First price, if any.
    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    /// Last price, if any.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Daily simple returns derived from a price series.
///
/// Always one element shorter than the prices it came from; only this crate
/// constructs one, so the date/value pairing is trusted downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ReturnSeries {
    pub(crate) fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Last return, if any.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// A fixed-weight portfolio: tickers with their target allocations.
///
/// Weights are static for the whole analysis window. They stay as given even
/// when some tickers turn out to have no price data, so the reported metrics
/// reflect the intended allocation rather than a silently renormalized one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portfolio {
    tickers: Vec<String>,
    weights: Vec<f64>,
}

impl Portfolio {
    /// Build a portfolio from parallel ticker and weight vectors.
    ///
    /// Each weight must lie in `[0, 1]` and the sum must be within 0.001 of
    /// 1.0.
    ///
    /// # Errors
    ///
    /// `InvalidPortfolio` when the vectors differ in length, the portfolio is
    /// empty, a ticker repeats, a weight is out of range, or the sum is off.
    pub fn new(tickers: Vec<String>, weights: Vec<f64>) -> Result<Self> {
        if tickers.len() != weights.len() {
            return Err(Error::InvalidPortfolio(format!(
                "{} tickers but {} weights",
                tickers.len(),
                weights.len()
            )));
        }
        if tickers.is_empty() {
            return Err(Error::InvalidPortfolio(
                "at least one holding is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for ticker in &tickers {
            if !seen.insert(ticker.as_str()) {
                return Err(Error::InvalidPortfolio(format!("duplicate ticker {ticker}")));
            }
        }
        if let Some(weight) = weights
            .iter()
            .find(|w| !w.is_finite() || **w < 0.0 || **w > 1.0)
        {
            return Err(Error::InvalidPortfolio(format!(
                "weights must lie in [0, 1], got {weight}"
            )));
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::InvalidPortfolio(format!(
                "weights sum to {total:.4}, expected 1.0"
            )));
        }
        Ok(Self { tickers, weights })
    }

    /// Build a portfolio from invested amounts; each weight becomes the
    /// amount's share of the total.
    ///
    /// # Errors
    ///
    /// `InvalidPortfolio` when an amount is not a positive finite number, or
    /// when the resulting weights fail [`Portfolio::new`] validation.
    pub fn from_amounts(tickers: Vec<String>, amounts: Vec<f64>) -> Result<Self> {
        if let Some(amount) = amounts.iter().find(|a| !a.is_finite() || **a <= 0.0) {
            return Err(Error::InvalidPortfolio(format!(
                "amounts must be positive, got {amount}"
            )));
        }
        let total: f64 = amounts.iter().sum();
        let weights = amounts.iter().map(|a| a / total).collect();
        Self::new(tickers, weights)
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Weight of one ticker, if held.
    pub fn weight_of(&self, ticker: &str) -> Option<f64> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|i| self.weights[i])
    }
}
