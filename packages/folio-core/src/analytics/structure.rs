//! Portfolio structure: contribution, concentration, diversification.

use serde::Serialize;

use crate::compose::AssetReturns;
use crate::types::Portfolio;
use crate::{Error, Result};

/// One asset's additive return contribution over the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetContribution {
    pub ticker: String,
    pub weight: f64,
    pub contribution: f64,
}

/// Per-asset contributions with the extremes picked out.
#[derive(Debug, Clone, Serialize)]
pub struct ContributionSummary {
    pub top_contributor: String,
    pub top_contributor_value: f64,
    pub top_dragger: String,
    pub top_dragger_value: f64,
    /// All contributions, in portfolio order
    pub contributions: Vec<AssetContribution>,
}

impl ContributionSummary {
    /// Summarize per-asset contributions. Ties keep the first-encountered
    /// asset so the output is deterministic.
    ///
    /// # Errors
    ///
    /// `InsufficientData` when the contribution list is empty.
    pub fn from_contributions(contributions: Vec<AssetContribution>) -> Result<Self> {
        if contributions.is_empty() {
            return Err(Error::InsufficientData(
                "No asset contributions to summarize".to_string(),
            ));
        }
        let mut top = 0;
        let mut bottom = 0;
        for (i, c) in contributions.iter().enumerate().skip(1) {
            if c.contribution > contributions[top].contribution {
                top = i;
            }
            if c.contribution < contributions[bottom].contribution {
                bottom = i;
            }
        }
        Ok(Self {
            top_contributor: contributions[top].ticker.clone(),
            top_contributor_value: contributions[top].contribution,
            top_dragger: contributions[bottom].ticker.clone(),
            top_dragger_value: contributions[bottom].contribution,
            contributions,
        })
    }
}

/// Additive weighted return contribution per asset.
///
/// Each asset contributes `weight * sum(r_t)` over the window. Summed simple
/// returns do not compound, so over long windows the total drifts from the
/// compounded portfolio return; the decomposition stays exactly additive in
/// exchange.
pub fn contribution_by_asset(assets: &[AssetReturns]) -> Vec<AssetContribution> {
    assets
        .iter()
        .map(|asset| AssetContribution {
            ticker: asset.ticker.clone(),
            weight: asset.weight,
            contribution: asset.weight * asset.returns.values().iter().sum::<f64>(),
        })
        .collect()
}

/// Largest single position weight.
pub fn concentration(portfolio: &Portfolio) -> f64 {
    portfolio.weights().iter().copied().fold(0.0, f64::max)
}

/// Effective number of stocks: the inverse Herfindahl index `1 / sum(w^2)`.
///
/// Equal weights over N holdings give exactly N; a portfolio dominated by
/// one position approaches 1.
pub fn effective_n_stocks(portfolio: &Portfolio) -> f64 {
    1.0 / portfolio.weights().iter().map(|w| w * w).sum::<f64>()
}
