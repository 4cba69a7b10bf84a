//! Backtest runner: wires configuration, engine and metrics together.
//!
//! Two entry points:
//! - `run_single_backtest()`: takes a [`RunConfig`]. Used by callers holding a TOML file.
//! - `run_backtest_from_config()`: takes an already validated engine config.
//!   Used by the noise test, which varies seed and noise per iteration.

use barsim_core::domain::Bar;
use barsim_core::engine::{BacktestConfig, BacktestError, RunSummary};
use barsim_core::run_backtest;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, RunConfig};
use crate::metrics::PerformanceReport;
use crate::sweep::SweepError;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error("noise test needs at least one run")]
    NoRuns,
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub summary: RunSummary,
    pub metrics: PerformanceReport,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run one backtest described by `config` over `bars` (oldest first).
pub fn run_single_backtest(config: &RunConfig, bars: Vec<Bar>) -> Result<BacktestReport, RunError> {
    let run_id = config.run_id()?;
    let bt_config = config.into_backtest_config()?;
    let (summary, metrics) = run_backtest_from_config(bt_config, bars)?;
    info!(
        %run_id,
        trades = metrics.all.trade_count,
        net_profit = metrics.all.net_profit,
        max_drawdown = metrics.all.max_drawdown,
        "run complete"
    );
    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        summary,
        metrics,
    })
}

/// Run a backtest with an engine config and compute its metrics. No I/O.
pub fn run_backtest_from_config(
    config: BacktestConfig,
    bars: Vec<Bar>,
) -> Result<(RunSummary, PerformanceReport), RunError> {
    let tick_value = config.instrument.tick_value;
    let summary = run_backtest(config, bars)?;
    let metrics = PerformanceReport::compute(&summary.transactions, summary.initial_balance, tick_value);
    Ok((summary, metrics))
}
