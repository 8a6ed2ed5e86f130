//! Metric collection and report rendering.
//!
//! `MetricsReport` is the flat name-to-value map the analyzer fills in.
//! Metrics that cannot be computed are kept as skipped entries with the
//! reason attached, so a flat benchmark shows up as "beta: n/a (...)"
//! instead of a silent zero. Rendering to text and JSON lives here too.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::analyzer::AnalysisReport;
use crate::{Error, Result};

/// A metric that could not be computed, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedMetric {
    pub metric: String,
    pub reason: String,
}

/// Named metric values keyed by stable snake_case names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsReport {
    values: BTreeMap<String, f64>,
    skipped: Vec<SkippedMetric>,
}

impl MetricsReport {
    /// Record one metric outcome. A failure is logged and retained as a
    /// skipped entry rather than aborting the run or defaulting to zero.
    pub fn record(&mut self, metric: &str, result: Result<f64>) {
        match result {
            Ok(value) => {
                self.values.insert(metric.to_string(), value);
            }
            Err(err) => {
                warn!("Skipping {}: {}", metric, err);
                self.skipped.push(SkippedMetric {
                    metric: metric.to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Record the ratio of two already-recorded metrics. Skips when either
    /// input was itself skipped, or when the denominator is zero.
    pub fn record_relative(&mut self, metric: &str, numerator: &str, denominator: &str) {
        let result = match (self.value(numerator), self.value(denominator)) {
            (Some(_), Some(d)) if d == 0.0 => Err(Error::UndefinedRatio(format!(
                "Cannot compute {metric} against a zero {denominator}"
            ))),
            (Some(n), Some(d)) => Ok(n / d),
            _ => Err(Error::InsufficientData(format!(
                "Cannot compute {metric} without both {numerator} and {denominator}"
            ))),
        };
        self.record(metric, result);
    }

    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }

    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    pub fn skipped(&self) -> &[SkippedMetric] {
        &self.skipped
    }

    pub fn skip_reason(&self, metric: &str) -> Option<&str> {
        self.skipped
            .iter()
            .find(|skip| skip.metric == metric)
            .map(|skip| skip.reason.as_str())
    }
}

enum Unit {
    Percent,
    Ratio,
}

impl Unit {
    fn render(&self, value: f64) -> String {
        match self {
            Unit::Percent => format!("{:.2}%", value * 100.0),
            Unit::Ratio => format!("{value:.2}"),
        }
    }
}

fn metric_line(out: &mut String, metrics: &MetricsReport, label: &str, metric: &str, unit: Unit) {
    let text = match metrics.value(metric) {
        Some(value) => unit.render(value),
        None => match metrics.skip_reason(metric) {
            Some(reason) => format!("n/a ({reason})"),
            None => "n/a".to_string(),
        },
    };
    let _ = writeln!(out, "  {label:<26}{text:>10}");
}

/// Render a full analysis as a plain-text report.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let rule = "-".repeat(60);
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, " PORTFOLIO ANALYSIS");
    let _ = writeln!(out, "{}", "=".repeat(60));

    let _ = writeln!(out, "\nHoldings\n{rule}");
    for (ticker, weight) in report
        .portfolio
        .tickers()
        .iter()
        .zip(report.portfolio.weights())
    {
        let _ = writeln!(out, "  {:<26}{:>9.1}%", ticker, weight * 100.0);
    }

    let diag = &report.diagnostics;
    let _ = writeln!(out, "\nAlignment\n{rule}");
    let _ = writeln!(out, "  {:<26}{:>10}", "Trading days", diag.total_dates);
    let _ = writeln!(
        out,
        "  {:<26}{:>10}",
        "Fully aligned", diag.fully_aligned_dates
    );
    let _ = writeln!(
        out,
        "  {:<26}{:>9.1}%",
        "Dropped",
        diag.dropped_fraction * 100.0
    );
    let _ = writeln!(
        out,
        "  {:<26}{:>10}",
        "Benchmark overlap", diag.benchmark_common_dates
    );
    if !diag.missing_tickers.is_empty() {
        let _ = writeln!(
            out,
            "  {:<26}{}",
            "Missing tickers",
            diag.missing_tickers.join(", ")
        );
    }
    for coverage in &diag.per_ticker_coverage {
        if coverage.low_overlap {
            let _ = writeln!(
                out,
                "  low overlap: {} covers {:.1}% of the calendar",
                coverage.ticker,
                coverage.coverage * 100.0
            );
        }
    }

    let metrics = &report.metrics;
    let _ = writeln!(out, "\nPerformance\n{rule}");
    metric_line(&mut out, metrics, "Annualized return", "annual_return", Unit::Percent);
    metric_line(&mut out, metrics, "Total return", "total_return", Unit::Percent);
    metric_line(&mut out, metrics, "Volatility", "volatility", Unit::Percent);
    metric_line(&mut out, metrics, "Downside deviation", "downside_deviation", Unit::Percent);
    metric_line(&mut out, metrics, "Max drawdown", "max_drawdown", Unit::Percent);
    metric_line(&mut out, metrics, "Sharpe ratio", "sharpe_ratio", Unit::Ratio);
    metric_line(&mut out, metrics, "Sortino ratio", "sortino_ratio", Unit::Ratio);

    let _ = writeln!(out, "\nMarket comparison\n{rule}");
    metric_line(&mut out, metrics, "Benchmark return", "benchmark_annual_return", Unit::Percent);
    metric_line(&mut out, metrics, "Excess return", "excess_return", Unit::Percent);
    metric_line(&mut out, metrics, "Beta", "beta", Unit::Ratio);
    metric_line(&mut out, metrics, "Tracking error", "tracking_error", Unit::Percent);
    metric_line(&mut out, metrics, "Information ratio", "information_ratio", Unit::Ratio);

    let _ = writeln!(out, "\nRisk vs benchmark\n{rule}");
    metric_line(&mut out, metrics, "Benchmark volatility", "benchmark_volatility", Unit::Percent);
    metric_line(&mut out, metrics, "Benchmark max drawdown", "benchmark_max_drawdown", Unit::Percent);
    metric_line(&mut out, metrics, "Benchmark Sharpe", "benchmark_sharpe_ratio", Unit::Ratio);
    metric_line(&mut out, metrics, "Relative volatility", "relative_volatility", Unit::Ratio);
    metric_line(&mut out, metrics, "Relative drawdown", "relative_drawdown", Unit::Ratio);

    let contributions = &report.contributions;
    let _ = writeln!(out, "\nStructure\n{rule}");
    let mut by_size = contributions.contributions.clone();
    by_size.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
    for asset in &by_size {
        let _ = writeln!(
            out,
            "  {:<26}{:>9.1}%",
            asset.ticker,
            asset.contribution * 100.0
        );
    }
    metric_line(&mut out, metrics, "Max concentration", "concentration", Unit::Percent);
    metric_line(&mut out, metrics, "Effective holdings", "effective_n", Unit::Ratio);
    let _ = writeln!(
        out,
        "  {:<26}{} ({:+.1}%)",
        "Top contributor",
        contributions.top_contributor,
        contributions.top_contributor_value * 100.0
    );
    let _ = writeln!(
        out,
        "  {:<26}{} ({:+.1}%)",
        "Top dragger",
        contributions.top_dragger,
        contributions.top_dragger_value * 100.0
    );

    let _ = writeln!(out, "\nBehavior\n{rule}");
    metric_line(&mut out, metrics, "Win rate", "win_rate", Unit::Percent);
    metric_line(&mut out, metrics, "Average gain", "avg_gain", Unit::Percent);
    metric_line(&mut out, metrics, "Average loss", "avg_loss", Unit::Percent);
    metric_line(&mut out, metrics, "Gain/loss ratio", "gain_loss_ratio", Unit::Ratio);
    metric_line(&mut out, metrics, "Benchmark win rate", "benchmark_win_rate", Unit::Percent);

    if let Some(rolling) = &report.rolling_cagr {
        if let Some(latest) = rolling.last_defined() {
            let _ = writeln!(out, "\nRolling\n{rule}");
            let _ = writeln!(
                out,
                "  {:<26}{:>9.2}%",
                "Latest windowed return",
                latest * 100.0
            );
        }
    }

    if !metrics.skipped().is_empty() {
        let _ = writeln!(out, "\nSkipped\n{rule}");
        for skip in metrics.skipped() {
            let _ = writeln!(out, "  {:<26}{}", skip.metric, skip.reason);
        }
    }

    out
}

/// A finite metric value, or JSON null. Skipped and non-finite values both
/// export as null; the reasons travel separately under `skipped_metrics`.
fn optional(value: Option<f64>) -> Value {
    match value {
        Some(v) if v.is_finite() => json!(v),
        _ => Value::Null,
    }
}

fn section(metrics: &MetricsReport, keys: &[(&str, &str)]) -> Value {
    let map: serde_json::Map<String, Value> = keys
        .iter()
        .map(|(field, metric)| ((*field).to_string(), optional(metrics.value(metric))))
        .collect();
    Value::Object(map)
}

/// Export a full analysis as a stable JSON document.
pub fn export_json(report: &AnalysisReport) -> Value {
    let metrics = &report.metrics;

    // Non-finite values export as null, so give each one a reason entry
    // alongside the metrics that were skipped outright.
    let mut skipped = metrics.skipped().to_vec();
    for (metric, value) in metrics.values() {
        if !value.is_finite() {
            skipped.push(SkippedMetric {
                metric: metric.clone(),
                reason: format!("Value {value} has no JSON representation"),
            });
        }
    }

    let composition: serde_json::Map<String, Value> = report
        .portfolio
        .tickers()
        .iter()
        .zip(report.portfolio.weights())
        .map(|(ticker, weight)| (ticker.clone(), json!(weight)))
        .collect();
    let contributions: serde_json::Map<String, Value> = report
        .contributions
        .contributions
        .iter()
        .map(|c| (c.ticker.clone(), optional(Some(c.contribution))))
        .collect();

    let mut structure = section(
        metrics,
        &[
            ("max_concentration", "concentration"),
            ("effective_n_stocks", "effective_n"),
        ],
    );
    if let Value::Object(map) = &mut structure {
        map.insert(
            "top_contributor".to_string(),
            json!(report.contributions.top_contributor),
        );
        map.insert(
            "top_contributor_value".to_string(),
            optional(Some(report.contributions.top_contributor_value)),
        );
        map.insert(
            "top_dragger".to_string(),
            json!(report.contributions.top_dragger),
        );
        map.insert(
            "top_dragger_value".to_string(),
            optional(Some(report.contributions.top_dragger_value)),
        );
        map.insert("contributions".to_string(), Value::Object(contributions));
    }

    json!({
        "portfolio_composition": Value::Object(composition),
        "performance_metrics": section(metrics, &[
            ("annual_return", "annual_return"),
            ("total_return", "total_return"),
            ("volatility", "volatility"),
            ("downside_deviation", "downside_deviation"),
            ("max_drawdown", "max_drawdown"),
            ("sharpe_ratio", "sharpe_ratio"),
            ("sortino_ratio", "sortino_ratio"),
        ]),
        "market_comparison": section(metrics, &[
            ("benchmark_annual_return", "benchmark_annual_return"),
            ("excess_return", "excess_return"),
            ("beta", "beta"),
            ("tracking_error", "tracking_error"),
            ("information_ratio", "information_ratio"),
        ]),
        "risk_quality": section(metrics, &[
            ("portfolio_volatility", "volatility"),
            ("market_volatility", "benchmark_volatility"),
            ("relative_volatility", "relative_volatility"),
            ("portfolio_drawdown", "max_drawdown"),
            ("market_drawdown", "benchmark_max_drawdown"),
            ("relative_drawdown", "relative_drawdown"),
            ("portfolio_sharpe", "sharpe_ratio"),
            ("market_sharpe", "benchmark_sharpe_ratio"),
            ("portfolio_downside_deviation", "downside_deviation"),
            ("market_downside_deviation", "benchmark_downside_deviation"),
        ]),
        "portfolio_structure": structure,
        "behavior": section(metrics, &[
            ("win_rate", "win_rate"),
            ("avg_gain", "avg_gain"),
            ("avg_loss", "avg_loss"),
            ("gain_loss_ratio", "gain_loss_ratio"),
            ("market_win_rate", "benchmark_win_rate"),
            ("market_gain_loss_ratio", "benchmark_gain_loss_ratio"),
        ]),
        "alignment": serde_json::to_value(&report.diagnostics).unwrap_or(Value::Null),
        "rolling_cagr": report
            .rolling_cagr
            .as_ref()
            .and_then(|r| serde_json::to_value(r).ok())
            .unwrap_or(Value::Null),
        "skipped_metrics": serde_json::to_value(&skipped).unwrap_or(Value::Null),
    })
}
