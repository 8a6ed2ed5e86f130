//! End-to-end analysis pipeline.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::align::{align_prices, AlignmentDiagnostics};
use crate::analytics::{
    annualized_excess_return, annualized_return, beta, concentration, contribution_by_asset,
    cumulative_returns, downside_deviation, effective_n_stocks, gain_loss_profile,
    information_ratio, max_drawdown, rolling_cagr, sharpe_ratio, sortino_ratio, tracking_error,
    volatility, win_rate, ContributionSummary, RollingSeries,
};
use crate::compose::{compose, ComposedReturns};
use crate::config::AnalysisConfig;
use crate::report::MetricsReport;
use crate::types::{Portfolio, PriceSeries, ReturnSeries};
use crate::{Error, Result};

/// Full output of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// The portfolio as analyzed, weights included
    pub portfolio: Portfolio,
    /// Calendar and coverage accounting from the alignment stage
    pub diagnostics: AlignmentDiagnostics,
    /// Composite daily returns on the final shared calendar
    pub portfolio_returns: ReturnSeries,
    /// Benchmark daily returns on the same calendar
    pub benchmark_returns: ReturnSeries,
    /// Flat name-to-value metrics plus per-metric skip reasons
    pub metrics: MetricsReport,
    /// Per-asset contribution breakdown
    pub contributions: ContributionSummary,
    /// Trailing-window annualized returns; absent when the history is
    /// shorter than the configured window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling_cagr: Option<RollingSeries>,
}

/// Runs the full pipeline: align, compose, compute, report.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run one analysis over in-memory inputs.
    ///
    /// # Errors
    ///
    /// Only pipeline-fatal conditions error out: no usable price data, too
    /// few aligned trading days, or a benchmark calendar too thin to derive
    /// returns from. Anything that breaks a single metric lands in
    /// `metrics.skipped()` with a reason instead.
    pub fn analyze(
        &self,
        portfolio: &Portfolio,
        prices: &BTreeMap<String, PriceSeries>,
        benchmark: &PriceSeries,
    ) -> Result<AnalysisReport> {
        let (aligned, diagnostics) = align_prices(portfolio, prices, benchmark, &self.config)?;
        let composed = compose(&aligned, portfolio)?;
        info!(
            "Computing metrics over {} aligned return observations",
            composed.portfolio.len()
        );
        self.build_report(portfolio, composed, diagnostics)
    }

    fn build_report(
        &self,
        portfolio: &Portfolio,
        composed: ComposedReturns,
        diagnostics: AlignmentDiagnostics,
    ) -> Result<AnalysisReport> {
        let cfg = &self.config;
        let series = &composed.portfolio;
        let bench = &composed.benchmark;
        let mut metrics = MetricsReport::default();

        // performance
        metrics.record("annual_return", annualized_return(series, cfg.trading_days));
        metrics.record("total_return", total_return(series));
        metrics.record("volatility", volatility(series, true, cfg.trading_days));
        metrics.record(
            "downside_deviation",
            downside_deviation(series, true, cfg.trading_days),
        );
        metrics.record("max_drawdown", max_drawdown(series));
        metrics.record(
            "sharpe_ratio",
            sharpe_ratio(series, cfg.risk_free_rate, cfg.trading_days),
        );
        metrics.record(
            "sortino_ratio",
            sortino_ratio(series, cfg.risk_free_rate, cfg.trading_days),
        );

        // market comparison
        metrics.record("beta", beta(series, bench));
        metrics.record(
            "tracking_error",
            tracking_error(series, bench, cfg.trading_days),
        );
        metrics.record(
            "information_ratio",
            information_ratio(series, bench, cfg.trading_days),
        );
        metrics.record(
            "excess_return",
            annualized_excess_return(series, bench, cfg.trading_days),
        );

        // benchmark-side figures for the risk comparison view
        metrics.record(
            "benchmark_annual_return",
            annualized_return(bench, cfg.trading_days),
        );
        metrics.record(
            "benchmark_volatility",
            volatility(bench, true, cfg.trading_days),
        );
        metrics.record(
            "benchmark_downside_deviation",
            downside_deviation(bench, true, cfg.trading_days),
        );
        metrics.record("benchmark_max_drawdown", max_drawdown(bench));
        metrics.record(
            "benchmark_sharpe_ratio",
            sharpe_ratio(bench, cfg.risk_free_rate, cfg.trading_days),
        );
        metrics.record_relative("relative_volatility", "volatility", "benchmark_volatility");
        metrics.record_relative("relative_drawdown", "max_drawdown", "benchmark_max_drawdown");

        // structure
        metrics.record("concentration", Ok(concentration(portfolio)));
        metrics.record("effective_n", Ok(effective_n_stocks(portfolio)));
        let contributions = contribution_by_asset(&composed.assets);
        for contribution in &contributions {
            metrics.record(
                &format!("contribution_{}", contribution.ticker),
                Ok(contribution.contribution),
            );
        }
        let contributions = ContributionSummary::from_contributions(contributions)?;

        // behavior
        metrics.record("win_rate", win_rate(series));
        match gain_loss_profile(series) {
            Ok(profile) => {
                metrics.record("avg_gain", Ok(profile.avg_gain));
                metrics.record("avg_loss", Ok(profile.avg_loss));
                metrics.record("gain_loss_ratio", Ok(profile.gain_loss_ratio));
            }
            Err(err) => metrics.record("gain_loss_ratio", Err(err)),
        }
        metrics.record("benchmark_win_rate", win_rate(bench));
        match gain_loss_profile(bench) {
            Ok(profile) => {
                metrics.record("benchmark_avg_gain", Ok(profile.avg_gain));
                metrics.record("benchmark_avg_loss", Ok(profile.avg_loss));
                metrics.record("benchmark_gain_loss_ratio", Ok(profile.gain_loss_ratio));
            }
            Err(err) => metrics.record("benchmark_gain_loss_ratio", Err(err)),
        }

        // rolling view needs a full window of history behind the last date
        let rolling = if series.len() >= cfg.rolling_window {
            Some(rolling_cagr(series, cfg.rolling_window, cfg.trading_days)?)
        } else {
            info!(
                "Rolling CAGR unavailable: {} observations, window is {}",
                series.len(),
                cfg.rolling_window
            );
            None
        };

        Ok(AnalysisReport {
            portfolio: portfolio.clone(),
            diagnostics,
            metrics,
            contributions,
            rolling_cagr: rolling,
            portfolio_returns: composed.portfolio,
            benchmark_returns: composed.benchmark,
        })
    }
}

/// Compounded return over the whole window.
fn total_return(returns: &ReturnSeries) -> Result<f64> {
    cumulative_returns(returns)
        .last()
        .ok_or_else(|| Error::InsufficientData("Cannot total an empty return series".to_string()))
}
