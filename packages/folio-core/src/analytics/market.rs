//! Market-relative metrics: beta, tracking error, information ratio.
//!
//! Every function here takes portfolio and benchmark return series that
//! share one date index; mismatched calendars are rejected rather than
//! silently truncated.

use crate::analytics::returns::annualized_return;
use crate::analytics::risk::{mean, volatility};
use crate::types::ReturnSeries;
use crate::{Error, Result};

fn ensure_aligned(portfolio: &ReturnSeries, benchmark: &ReturnSeries) -> Result<()> {
    if portfolio.dates() != benchmark.dates() {
        return Err(Error::DegenerateInput(
            "portfolio and benchmark return series are not date-aligned".to_string(),
        ));
    }
    Ok(())
}

/// Elementwise portfolio-minus-benchmark returns.
///
/// # Errors
///
/// `DegenerateInput` when the two series do not share the same date index.
pub fn excess_returns(portfolio: &ReturnSeries, benchmark: &ReturnSeries) -> Result<ReturnSeries> {
    ensure_aligned(portfolio, benchmark)?;
    let values = portfolio
        .values()
        .iter()
        .zip(benchmark.values())
        .map(|(p, b)| p - b)
        .collect();
    Ok(ReturnSeries::from_parts(portfolio.dates().to_vec(), values))
}

/// Annualized portfolio return minus annualized benchmark return.
pub fn annualized_excess_return(
    portfolio: &ReturnSeries,
    benchmark: &ReturnSeries,
    trading_days: usize,
) -> Result<f64> {
    ensure_aligned(portfolio, benchmark)?;
    Ok(annualized_return(portfolio, trading_days)? - annualized_return(benchmark, trading_days)?)
}

/// Annualized standard deviation of the excess-return series.
///
/// Exactly 0.0 when the portfolio tracks the benchmark with a constant
/// offset; [`information_ratio`] treats that as undefined rather than
/// dividing by it.
pub fn tracking_error(
    portfolio: &ReturnSeries,
    benchmark: &ReturnSeries,
    trading_days: usize,
) -> Result<f64> {
    let excess = excess_returns(portfolio, benchmark)?;
    volatility(&excess, true, trading_days)
}

/// Information ratio: annualized excess return per unit of tracking error.
///
/// The numerator is the annualized return of the excess series itself, not
/// the difference of the two annualized returns.
///
/// # Errors
///
/// `UndefinedRatio` when the tracking error is zero.
pub fn information_ratio(
    portfolio: &ReturnSeries,
    benchmark: &ReturnSeries,
    trading_days: usize,
) -> Result<f64> {
    let excess = excess_returns(portfolio, benchmark)?;
    let te = volatility(&excess, true, trading_days)?;
    if te == 0.0 {
        return Err(Error::UndefinedRatio(
            "Information ratio with zero tracking error".to_string(),
        ));
    }
    Ok(annualized_return(&excess, trading_days)? / te)
}

/// Beta of the portfolio to the benchmark.
///
/// `cov(portfolio, benchmark) / var(benchmark)`; the sample covariance and
/// variance share the same `n - 1` divisor, which cancels in the ratio.
///
/// # Errors
///
/// `UndefinedRatio` when the benchmark has zero variance; `DegenerateInput`
/// when fewer than two aligned observations exist.
pub fn beta(portfolio: &ReturnSeries, benchmark: &ReturnSeries) -> Result<f64> {
    ensure_aligned(portfolio, benchmark)?;
    if portfolio.len() < 2 {
        return Err(Error::DegenerateInput(format!(
            "Need at least 2 returns for beta, got {}",
            portfolio.len()
        )));
    }
    let pm = mean(portfolio.values());
    let bm = mean(benchmark.values());
    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (p, b) in portfolio.values().iter().zip(benchmark.values()) {
        covariance += (p - pm) * (b - bm);
        variance += (b - bm).powi(2);
    }
    if variance == 0.0 {
        return Err(Error::UndefinedRatio(
            "Beta against a zero-variance benchmark".to_string(),
        ));
    }
    Ok(covariance / variance)
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;

    fn series_from(start: NaiveDate, values: &[f64]) -> ReturnSeries {
        let dates = (0..values.len())
            .map(|i| start + Days::new(i as u64))
            .collect();
        ReturnSeries::from_parts(dates, values.to_vec())
    }

    fn return_series(values: &[f64]) -> ReturnSeries {
        series_from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values)
    }

    #[test]
    fn test_excess_returns_elementwise() {
        let portfolio = return_series(&[0.02, -0.01, 0.03]);
        let benchmark = return_series(&[0.01, 0.01, 0.01]);
        let excess = excess_returns(&portfolio, &benchmark).unwrap();
        assert!((excess.values()[0] - 0.01).abs() < 1e-12);
        assert!((excess.values()[1] + 0.02).abs() < 1e-12);
        assert!((excess.values()[2] - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_excess_returns_rejects_mismatched_dates() {
        let portfolio = return_series(&[0.01, 0.02]);
        let shifted = series_from(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), &[0.01, 0.02]);
        assert!(matches!(
            excess_returns(&portfolio, &shifted),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_tracking_error_zero_for_constant_offset() {
        // dyadic values keep the excess exactly constant
        let benchmark = return_series(&[0.25, 0.5, 0.25, 0.5]);
        let portfolio = return_series(&[0.5, 0.75, 0.5, 0.75]);
        assert_eq!(tracking_error(&portfolio, &benchmark, 252).unwrap(), 0.0);
        assert!(matches!(
            information_ratio(&portfolio, &benchmark, 252),
            Err(Error::UndefinedRatio(_))
        ));
    }

    #[test]
    fn test_information_ratio_positive_when_beating() {
        let portfolio = return_series(&[0.03, 0.0, 0.025, 0.01, 0.0]);
        let benchmark = return_series(&[0.01, -0.01, 0.02, 0.0, -0.005]);
        let ir = information_ratio(&portfolio, &benchmark, 252).unwrap();
        assert!(ir > 0.0);
        assert!(ir.is_finite());
    }

    #[test]
    fn test_beta_of_benchmark_against_itself() {
        let benchmark = return_series(&[0.01, -0.02, 0.015, 0.005, -0.01]);
        assert_eq!(beta(&benchmark, &benchmark).unwrap(), 1.0);
    }

    #[test]
    fn test_beta_doubles_with_leverage() {
        let benchmark = return_series(&[0.01, -0.02, 0.015, 0.005, -0.01]);
        let doubled: Vec<f64> = benchmark.values().iter().map(|b| 2.0 * b).collect();
        let portfolio = return_series(&doubled);
        assert_eq!(beta(&portfolio, &benchmark).unwrap(), 2.0);
    }

    #[test]
    fn test_beta_flat_benchmark_undefined() {
        let portfolio = return_series(&[0.01, -0.02, 0.015, 0.005, -0.01, 0.25]);
        let benchmark = return_series(&[0.25; 6]);
        assert!(matches!(
            beta(&portfolio, &benchmark),
            Err(Error::UndefinedRatio(_))
        ));
    }

    #[test]
    fn test_annualized_excess_matches_components() {
        let portfolio = return_series(&[0.02, 0.01, -0.005, 0.015]);
        let benchmark = return_series(&[0.01, 0.005, -0.01, 0.01]);
        let excess = annualized_excess_return(&portfolio, &benchmark, 252).unwrap();
        let expected = annualized_return(&portfolio, 252).unwrap()
            - annualized_return(&benchmark, 252).unwrap();
        assert!((excess - expected).abs() < 1e-12);
        assert!(excess > 0.0);
    }
}
