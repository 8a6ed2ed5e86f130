//! Risk metrics: volatility, downside deviation, drawdown, risk-adjusted ratios.

use crate::analytics::returns::{annualized_return, cumulative_returns};
use crate::types::ReturnSeries;
use crate::{Error, Result};

/// Arithmetic mean of a slice. Callers guarantee it is non-empty.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). Callers guarantee at
/// least two values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Calculate the volatility of a return series.
///
/// Sample standard deviation of daily returns, scaled by
/// `sqrt(trading_days)` when `annualize` is set. A constant series has a
/// volatility of exactly 0.0; the ratios that divide by it fail at their own
/// call site rather than here.
///
/// # Errors
///
/// `DegenerateInput` when there are fewer than two observations.
pub fn volatility(returns: &ReturnSeries, annualize: bool, trading_days: usize) -> Result<f64> {
    if returns.len() < 2 {
        return Err(Error::DegenerateInput(format!(
            "Need at least 2 returns for a standard deviation, got {}",
            returns.len()
        )));
    }
    let std = sample_std(returns.values());
    Ok(if annualize {
        std * (trading_days as f64).sqrt()
    } else {
        std
    })
}

/// Calculate the downside deviation of a return series.
///
/// Standard deviation over the strictly negative returns only; days at or
/// above zero are excluded entirely. Fewer than two losing days leave no
/// measurable downside dispersion and produce `0.0`.
///
/// # Errors
///
/// `DegenerateInput` when the full series has fewer than two observations.
pub fn downside_deviation(
    returns: &ReturnSeries,
    annualize: bool,
    trading_days: usize,
) -> Result<f64> {
    if returns.len() < 2 {
        return Err(Error::DegenerateInput(format!(
            "Need at least 2 returns for a standard deviation, got {}",
            returns.len()
        )));
    }
    let downside: Vec<f64> = returns
        .values()
        .iter()
        .copied()
        .filter(|r| *r < 0.0)
        .collect();
    if downside.len() < 2 {
        return Ok(0.0);
    }
    let std = sample_std(&downside);
    Ok(if annualize {
        std * (trading_days as f64).sqrt()
    } else {
        std
    })
}

/// Calculate the maximum drawdown of a return series.
///
/// Walks the cumulative return path once, tracking the running peak; the
/// drawdown at `t` is `(C_t - peak) / (1 + peak)`. The result is never
/// positive, and is exactly 0.0 when the path never falls below a prior
/// peak.
///
/// # Errors
///
/// `InsufficientData` when the series is empty.
pub fn max_drawdown(returns: &ReturnSeries) -> Result<f64> {
    if returns.is_empty() {
        return Err(Error::InsufficientData(
            "Cannot compute drawdown of an empty return series".to_string(),
        ));
    }
    let cumulative = cumulative_returns(returns);
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &c in cumulative.values() {
        if c > peak {
            peak = c;
        }
        let drawdown = (c - peak) / (1.0 + peak);
        if drawdown < worst {
            worst = drawdown;
        }
    }
    Ok(worst)
}

/// Calculate the annualized Sharpe ratio of a return series.
///
/// `(annualized_return - risk_free_rate) / annualized_volatility`.
///
/// # Errors
///
/// `UndefinedRatio` when the series has zero volatility; underlying
/// insufficient-data errors pass through.
pub fn sharpe_ratio(
    returns: &ReturnSeries,
    risk_free_rate: f64,
    trading_days: usize,
) -> Result<f64> {
    let annual = annualized_return(returns, trading_days)?;
    let vol = volatility(returns, true, trading_days)?;
    if vol == 0.0 {
        return Err(Error::UndefinedRatio(
            "Sharpe ratio of a zero-volatility return series".to_string(),
        ));
    }
    Ok((annual - risk_free_rate) / vol)
}

/// Calculate the annualized Sortino ratio of a return series.
///
/// Like Sharpe, but the divisor is the annualized downside deviation, so
/// upside swings are not penalized.
///
/// # Errors
///
/// `UndefinedRatio` when the downside deviation is zero (no losing days, a
/// single losing day, or identical losses).
pub fn sortino_ratio(
    returns: &ReturnSeries,
    risk_free_rate: f64,
    trading_days: usize,
) -> Result<f64> {
    let annual = annualized_return(returns, trading_days)?;
    let downside = downside_deviation(returns, true, trading_days)?;
    if downside == 0.0 {
        return Err(Error::UndefinedRatio(
            "Sortino ratio with no measurable downside deviation".to_string(),
        ));
    }
    Ok((annual - risk_free_rate) / downside)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};

    use super::*;

    fn return_series(values: &[f64]) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start + Days::new(i as u64))
            .collect();
        ReturnSeries::from_parts(dates, values.to_vec())
    }

    #[test]
    fn test_volatility_known_value() {
        // mean 0, sample variance 4e-4 / 3
        let returns = return_series(&[0.01, -0.01, 0.01, -0.01]);
        let daily = volatility(&returns, false, 252).unwrap();
        let expected = (0.0004_f64 / 3.0).sqrt();
        assert_relative_eq!(daily, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_volatility_annualization() {
        let returns = return_series(&[0.01, -0.02, 0.015, 0.005, -0.01]);
        let daily = volatility(&returns, false, 252).unwrap();
        let annual = volatility(&returns, true, 252).unwrap();
        assert!((annual - daily * 252.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_volatility_constant_series_is_zero() {
        // dyadic constant keeps the mean exact, so the deviation is exactly 0
        let returns = return_series(&[0.25; 10]);
        assert_eq!(volatility(&returns, true, 252).unwrap(), 0.0);
    }

    #[test]
    fn test_volatility_requires_two_returns() {
        let returns = return_series(&[0.01]);
        assert!(matches!(
            volatility(&returns, true, 252),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_downside_deviation_ignores_gains() {
        // only -0.01 and -0.03 count: mean -0.02, sample variance 2e-4
        let returns = return_series(&[0.02, -0.01, -0.03, 0.01]);
        let daily = downside_deviation(&returns, false, 252).unwrap();
        let expected = 0.0002_f64.sqrt();
        assert_relative_eq!(daily, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_downside_deviation_no_losses_is_zero() {
        // zero-return days are not losses
        let returns = return_series(&[0.01, 0.0, 0.02]);
        assert_eq!(downside_deviation(&returns, true, 252).unwrap(), 0.0);
    }

    #[test]
    fn test_downside_deviation_single_loss_is_zero() {
        let returns = return_series(&[0.01, -0.02, 0.03]);
        assert_eq!(downside_deviation(&returns, true, 252).unwrap(), 0.0);
    }

    #[test]
    fn test_max_drawdown_known_value() {
        // cumulative path peaks at 0.155, troughs at growth 0.883575
        let returns = return_series(&[0.10, 0.05, -0.15, -0.10, 0.05]);
        let mdd = max_drawdown(&returns).unwrap();
        assert!((mdd + 0.235).abs() < 1e-9);
        assert!(mdd <= 0.0);
    }

    #[test]
    fn test_max_drawdown_monotonic_rise_is_zero() {
        let returns = return_series(&[0.01, 0.02, 0.005]);
        assert_eq!(max_drawdown(&returns).unwrap(), 0.0);
    }

    #[test]
    fn test_max_drawdown_never_positive() {
        let returns = return_series(&[-0.05, 0.10, -0.02, 0.07, -0.01]);
        assert!(max_drawdown(&returns).unwrap() <= 0.0);
    }

    #[test]
    fn test_max_drawdown_empty_errors() {
        assert!(matches!(
            max_drawdown(&return_series(&[])),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_sharpe_positive_for_strong_returns() {
        let returns = return_series(&[0.01, 0.012, 0.008, 0.011, 0.009]);
        let sharpe = sharpe_ratio(&returns, 0.065, 252).unwrap();
        assert!(sharpe > 0.0);
        assert!(sharpe.is_finite());
    }

    #[test]
    fn test_sharpe_zero_volatility_undefined() {
        let returns = return_series(&[0.25; 10]);
        assert!(matches!(
            sharpe_ratio(&returns, 0.065, 252),
            Err(Error::UndefinedRatio(_))
        ));
    }

    #[test]
    fn test_sortino_no_downside_undefined() {
        let returns = return_series(&[0.01, 0.02, 0.0, 0.015]);
        assert!(matches!(
            sortino_ratio(&returns, 0.065, 252),
            Err(Error::UndefinedRatio(_))
        ));
    }

    #[test]
    fn test_sortino_matches_components() {
        let returns = return_series(&[0.05, -0.01, -0.03, 0.02, 0.01]);
        let sortino = sortino_ratio(&returns, 0.065, 252).unwrap();
        let expected = (annualized_return(&returns, 252).unwrap() - 0.065)
            / downside_deviation(&returns, true, 252).unwrap();
        assert!((sortino - expected).abs() < 1e-12);
        assert!(sortino > 0.0);
    }
}
