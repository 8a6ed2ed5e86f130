//! Metric computation.
//!
//! Split by concern: return transforms, risk primitives, market-relative
//! comparisons, portfolio structure, and behavior consistency.

mod behavior;
mod market;
mod returns;
mod risk;
mod structure;

pub use behavior::{gain_loss_profile, rolling_cagr, win_rate, GainLossProfile, RollingSeries};
pub use market::{
    annualized_excess_return, beta, excess_returns, information_ratio, tracking_error,
};
pub use returns::{annualized_return, cagr, cumulative_returns, simple_returns};
pub use risk::{downside_deviation, max_drawdown, sharpe_ratio, sortino_ratio, volatility};
pub use structure::{
    concentration, contribution_by_asset, effective_n_stocks, AssetContribution,
    ContributionSummary,
};
