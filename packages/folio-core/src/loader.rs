//! CSV loading for holdings and price history.
//!
//! Two file shapes are understood: a holdings file with `Ticker,Amount`
//! rows, and per-ticker price files with `Date,Close` rows named
//! `<TICKER>.csv`.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::types::{Portfolio, PriceSeries};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct HoldingRow {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "Amount")]
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Close")]
    close: f64,
}

fn require_columns(path: &Path, headers: &csv::StringRecord, required: &[&str]) -> Result<()> {
    for column in required {
        if !headers.iter().any(|header| header.trim() == *column) {
            return Err(Error::MissingColumn(format!(
                "{} is missing the {column} column",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Load a holdings file into a weighted portfolio.
///
/// Amounts are monetary position sizes; each weight is the position's
/// share of the total.
///
/// # Errors
///
/// Fails when the file cannot be read, the `Ticker` or `Amount` column is
/// absent, the file has no data rows, or the amounts do not form a valid
/// portfolio.
pub fn load_holdings(path: &Path) -> Result<Portfolio> {
    let mut reader = csv::Reader::from_path(path)?;
    require_columns(path, reader.headers()?, &["Ticker", "Amount"])?;

    let mut tickers = Vec::new();
    let mut amounts = Vec::new();
    for row in reader.deserialize() {
        let row: HoldingRow = row?;
        tickers.push(row.ticker.trim().to_string());
        amounts.push(row.amount);
    }
    if tickers.is_empty() {
        return Err(Error::InvalidPortfolio(format!(
            "{} contains no holdings",
            path.display()
        )));
    }
    info!("Loaded {} holdings from {}", tickers.len(), path.display());
    Portfolio::from_amounts(tickers, amounts)
}

/// Load a `Date,Close` price history. Rows may arrive in any order;
/// duplicate dates are rejected.
pub fn load_prices(path: &Path) -> Result<PriceSeries> {
    let mut reader = csv::Reader::from_path(path)?;
    require_columns(path, reader.headers()?, &["Date", "Close"])?;

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: PriceRow = row?;
        rows.push((row.date, row.close));
    }
    rows.sort_by_key(|(date, _)| *date);
    if let Some(pair) = rows.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(Error::DegenerateInput(format!(
            "Duplicate date {} in {}",
            pair[0].0,
            path.display()
        )));
    }
    let (dates, values): (Vec<NaiveDate>, Vec<f64>) = rows.into_iter().unzip();
    PriceSeries::new(dates, values)
}

/// Load `<TICKER>.csv` price files for every portfolio ticker under `dir`.
///
/// A ticker whose file is absent or malformed is logged and returned in
/// the failure list; one bad file never aborts the rest of the load.
pub fn load_price_dir(
    dir: &Path,
    tickers: &[String],
) -> (BTreeMap<String, PriceSeries>, Vec<(String, Error)>) {
    let mut series = BTreeMap::new();
    let mut failures = Vec::new();
    for ticker in tickers {
        let path = dir.join(format!("{ticker}.csv"));
        match load_prices(&path) {
            Ok(prices) => {
                series.insert(ticker.clone(), prices);
            }
            Err(err) => {
                warn!("Could not load prices for {}: {}", ticker, err);
                failures.push((ticker.clone(), err));
            }
        }
    }
    (series, failures)
}

/// Starter holdings file written by `folio init`.
pub fn example_holdings() -> &'static str {
    "Ticker,Amount\n\
     RELIANCE.NS,25000\n\
     TCS.NS,20000\n\
     HDFCBANK.NS,15000\n\
     INFY.NS,15000\n\
     ICICIBANK.NS,25000\n"
}
