//! Return series derivation and annualization.

use crate::types::{PriceSeries, ReturnSeries};
use crate::{Error, Result};

/// Derive daily simple returns from a price series.
///
/// `r_t = p_t / p_{t-1} - 1`. The first date has no prior close and is
/// dropped, so the result is one element shorter than the input.
///
/// # Errors
///
/// `InsufficientData` when the series has fewer than two prices.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use folio_core::{simple_returns, PriceSeries};
///
/// let dates = (1..=3)
///     .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
///     .collect();
/// let prices = PriceSeries::new(dates, vec![100.0, 110.0, 99.0]).unwrap();
/// let returns = simple_returns(&prices).unwrap();
/// assert!((returns.values()[0] - 0.10).abs() < 1e-10);
/// assert!((returns.values()[1] + 0.10).abs() < 1e-10);
/// ```
pub fn simple_returns(prices: &PriceSeries) -> Result<ReturnSeries> {
    if prices.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "Need at least 2 prices to derive returns, got {}",
            prices.len()
        )));
    }
    let dates = prices.dates()[1..].to_vec();
    let values = prices
        .values()
        .windows(2)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect();
    Ok(ReturnSeries::from_parts(dates, values))
}

/// Cumulative compounded return at each date.
///
/// `C_t = (1 + r_1) * ... * (1 + r_t) - 1`. An empty input produces an
/// empty series.
pub fn cumulative_returns(returns: &ReturnSeries) -> ReturnSeries {
    let mut growth = 1.0;
    let values = returns
        .values()
        .iter()
        .map(|r| {
            growth *= 1.0 + r;
            growth - 1.0
        })
        .collect();
    ReturnSeries::from_parts(returns.dates().to_vec(), values)
}

/// Compound annual growth rate implied by the first and last price.
///
/// `(p_last / p_first)^(trading_days / n) - 1` with `n` the number of price
/// observations, consistent with [`annualized_return`].
///
/// # Errors
///
/// `InsufficientData` when the series has fewer than two prices.
/// `DegenerateInput` when the first price is not positive; a validated
/// [`PriceSeries`] never carries one, but the ratio is meaningless if the
/// guard is ever bypassed.
pub fn cagr(prices: &PriceSeries, trading_days: usize) -> Result<f64> {
    if prices.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "Need at least 2 prices to compute CAGR, got {}",
            prices.len()
        )));
    }
    let first = prices.values()[0];
    if first <= 0.0 {
        return Err(Error::DegenerateInput(format!(
            "CAGR needs a positive starting price, got {first}"
        )));
    }
    let last = prices.values()[prices.len() - 1];
    Ok((last / first).powf(trading_days as f64 / prices.len() as f64) - 1.0)
}

/// Annualized compounded return of a daily return series.
///
/// `(prod(1 + r_i))^(trading_days / n) - 1` with `n = returns.len()`.
///
/// The exponent uses the observation count, not elapsed calendar time: two
/// series with the same returns annualize identically whatever their date
/// gaps. Every ratio built on top of this (Sharpe, Sortino, information
/// ratio) assumes the same convention, so it must not change in isolation.
///
/// # Errors
///
/// `InsufficientData` when the series is empty.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use folio_core::{annualized_return, simple_returns, PriceSeries};
///
/// let dates = (1..=4)
///     .map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
///     .collect();
/// let prices = PriceSeries::new(dates, vec![100.0, 101.0, 100.5, 102.0]).unwrap();
/// let returns = simple_returns(&prices).unwrap();
/// assert!(annualized_return(&returns, 252).unwrap() > 0.0);
/// ```
pub fn annualized_return(returns: &ReturnSeries, trading_days: usize) -> Result<f64> {
    if returns.is_empty() {
        return Err(Error::InsufficientData(
            "Cannot annualize an empty return series".to_string(),
        ));
    }
    Ok(annualize_window(returns.values(), trading_days))
}

/// Annualized return of a return slice. Callers guarantee it is non-empty.
pub(crate) fn annualize_window(values: &[f64], trading_days: usize) -> f64 {
    let growth: f64 = values.iter().map(|r| 1.0 + r).product();
    growth.powf(trading_days as f64 / values.len() as f64) - 1.0
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};

    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n).map(|i| start + Days::new(i as u64)).collect()
    }

    fn return_series(values: &[f64]) -> ReturnSeries {
        ReturnSeries::from_parts(dates(values.len()), values.to_vec())
    }

    #[test]
    fn test_simple_returns_basic() {
        let prices = PriceSeries::new(dates(3), vec![100.0, 110.0, 99.0]).unwrap();
        let returns = simple_returns(&prices).unwrap();
        assert_eq!(returns.len(), 2);
        // first date dropped, remaining dates carried over
        assert_eq!(returns.dates(), &prices.dates()[1..]);
        assert!((returns.values()[0] - 0.10).abs() < 1e-10);
        assert!((returns.values()[1] + 0.10).abs() < 1e-10);
    }

    #[test]
    fn test_simple_returns_requires_two_prices() {
        let prices = PriceSeries::new(dates(1), vec![100.0]).unwrap();
        assert!(matches!(
            simple_returns(&prices),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_cumulative_returns_compound() {
        // 1.1 * 0.9 = 0.99 overall
        let returns = return_series(&[0.10, -0.10]);
        let cumulative = cumulative_returns(&returns);
        assert!((cumulative.values()[0] - 0.10).abs() < 1e-12);
        assert!((cumulative.values()[1] + 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_cumulative_returns_empty() {
        let cumulative = cumulative_returns(&return_series(&[]));
        assert!(cumulative.is_empty());
    }

    #[test]
    fn test_cumulative_reconstructs_price_path() {
        let values = vec![100.0, 102.0, 99.5, 101.0, 104.25];
        let prices = PriceSeries::new(dates(5), values.clone()).unwrap();
        let cumulative = cumulative_returns(&simple_returns(&prices).unwrap());
        for (i, c) in cumulative.values().iter().enumerate() {
            let rebuilt = values[0] * (1.0 + c);
            assert!((rebuilt - values[i + 1]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_last_cumulative_equals_total_growth() {
        // a full trading year of alternating moves
        let mut values = Vec::with_capacity(253);
        let mut price = 100.0;
        values.push(price);
        for i in 0..252 {
            price *= if i % 2 == 0 { 1.004 } else { 0.998 };
            values.push(price);
        }
        let prices = PriceSeries::new(dates(253), values).unwrap();
        let returns = simple_returns(&prices).unwrap();
        let last = cumulative_returns(&returns).last().unwrap();
        let total = prices.last().unwrap() / prices.first().unwrap() - 1.0;
        assert_relative_eq!(last, total, epsilon = 1e-9);
    }

    #[test]
    fn test_cagr_doubling_over_one_year() {
        // 252 observations, price doubles: exponent is exactly 1
        let step = 100.0 / 251.0;
        let values: Vec<f64> = (0..252).map(|i| 100.0 + step * i as f64).collect();
        let prices = PriceSeries::new(dates(252), values).unwrap();
        let growth = cagr(&prices, 252).unwrap();
        assert_relative_eq!(growth, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cagr_flat_prices_is_zero() {
        let prices = PriceSeries::new(dates(10), vec![100.0; 10]).unwrap();
        assert!((cagr(&prices, 252).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_cagr_requires_two_prices() {
        let prices = PriceSeries::new(dates(1), vec![100.0]).unwrap();
        assert!(matches!(cagr(&prices, 252), Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_cagr_non_positive_first_price_errors() {
        // PriceSeries::new would reject these, so build the parts directly.
        // Without the guard, -100 start and an integral exponent would come
        // back as a huge finite number rather than an error.
        let negative = PriceSeries::from_parts(dates(2), vec![-100.0, 110.0]);
        assert!(matches!(
            cagr(&negative, 252),
            Err(Error::DegenerateInput(_))
        ));

        let zero_start = PriceSeries::from_parts(dates(3), vec![0.0, 50.0, 100.0]);
        assert!(matches!(
            cagr(&zero_start, 252),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_annualized_return_full_year() {
        // 252 observations of 0.1% compound to (1.001)^252 - 1, about 28.6%
        let returns = return_series(&[0.001; 252]);
        let annual = annualized_return(&returns, 252).unwrap();
        let expected = 1.001_f64.powi(252) - 1.0;
        assert_relative_eq!(annual, expected, epsilon = 1e-9);
        assert!((annual - 0.2864).abs() < 1e-3);
    }

    #[test]
    fn test_annualization_uses_observation_count() {
        let values = vec![0.01, -0.005, 0.002, 0.007];
        let daily = return_series(&values);
        // same returns spread over sparse dates annualize identically
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let sparse_dates = (0..4).map(|i| start + Days::new(i * 9)).collect();
        let sparse = ReturnSeries::from_parts(sparse_dates, values);
        assert_eq!(
            annualized_return(&daily, 252).unwrap(),
            annualized_return(&sparse, 252).unwrap()
        );
    }

    #[test]
    fn test_annualized_return_empty_errors() {
        assert!(matches!(
            annualized_return(&return_series(&[]), 252),
            Err(Error::InsufficientData(_))
        ));
    }
}
