//! Behavior consistency: rolling returns, win rate, gain/loss asymmetry.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::returns::annualize_window;
use crate::analytics::risk::mean;
use crate::types::ReturnSeries;
use crate::{Error, Result};

/// Rolling annualized return with explicit unavailable positions.
///
/// Dates mirror the source return series; a position is `None` until a full
/// window of history exists behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingSeries {
    dates: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl RollingSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Most recent defined value, if any.
    pub fn last_defined(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }
}

/// Trailing-window annualized return at every position.
///
/// Position `t` annualizes the `window` returns ending at `t` inclusive;
/// positions with less history than that are `None` rather than being
/// computed over a partial window.
///
/// # Errors
///
/// `InsufficientData` when the whole series is shorter than the window, and
/// `DegenerateInput` for a zero-length window.
pub fn rolling_cagr(
    returns: &ReturnSeries,
    window: usize,
    trading_days: usize,
) -> Result<RollingSeries> {
    if window == 0 {
        return Err(Error::DegenerateInput(
            "Rolling window must be positive".to_string(),
        ));
    }
    if returns.len() < window {
        return Err(Error::InsufficientData(format!(
            "Rolling window of {} exceeds the {} available observations",
            window,
            returns.len()
        )));
    }
    let values = (0..returns.len())
        .map(|t| {
            if t + 1 < window {
                None
            } else {
                Some(annualize_window(
                    &returns.values()[t + 1 - window..=t],
                    trading_days,
                ))
            }
        })
        .collect();
    Ok(RollingSeries {
        dates: returns.dates().to_vec(),
        values,
    })
}

/// Fraction of strictly positive return days.
///
/// Zero-return days count toward the denominator but are not wins.
///
/// # Errors
///
/// `InsufficientData` when the series is empty.
pub fn win_rate(returns: &ReturnSeries) -> Result<f64> {
    if returns.is_empty() {
        return Err(Error::InsufficientData(
            "Cannot compute win rate of an empty return series".to_string(),
        ));
    }
    let wins = returns.values().iter().filter(|r| **r > 0.0).count();
    Ok(wins as f64 / returns.len() as f64)
}

/// Average gaining day, average losing day, and their magnitude ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GainLossProfile {
    pub avg_gain: f64,
    pub avg_loss: f64,
    pub gain_loss_ratio: f64,
}

/// Gain/loss asymmetry of a return series.
///
/// `avg_gain` averages the strictly positive days and `avg_loss` the
/// strictly negative days; either is 0.0 when its subset is empty. The
/// ratio is `|avg_gain| / |avg_loss|`, and positive infinity when there are
/// no losing days at all; renderers and serializers must handle the
/// infinite case.
///
/// # Errors
///
/// `InsufficientData` when the series is empty.
pub fn gain_loss_profile(returns: &ReturnSeries) -> Result<GainLossProfile> {
    if returns.is_empty() {
        return Err(Error::InsufficientData(
            "Cannot profile an empty return series".to_string(),
        ));
    }
    let gains: Vec<f64> = returns
        .values()
        .iter()
        .copied()
        .filter(|r| *r > 0.0)
        .collect();
    let losses: Vec<f64> = returns
        .values()
        .iter()
        .copied()
        .filter(|r| *r < 0.0)
        .collect();
    let avg_gain = if gains.is_empty() { 0.0 } else { mean(&gains) };
    let avg_loss = if losses.is_empty() { 0.0 } else { mean(&losses) };
    let gain_loss_ratio = if losses.is_empty() {
        f64::INFINITY
    } else {
        avg_gain.abs() / avg_loss.abs()
    };
    Ok(GainLossProfile {
        avg_gain,
        avg_loss,
        gain_loss_ratio,
    })
}
