//! Parameter sweep: exhaustive grid search over integer parameter ranges.
//!
//! The grid is the cartesian product of the configured `[param_ranges]`,
//! the last parameter (by name) varying fastest. Every grid point is a full
//! backtest with its own [`RunConfig`]; points run in parallel with rayon and
//! the results are ranked by a [`FitnessMetric`], best first.

use barsim_core::domain::Bar;
use barsim_core::strategy::ParamSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use crate::config::RunConfig;
use crate::metrics::PerformanceMetrics;
use crate::runner::{run_single_backtest, RunError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepError {
    #[error("range for '{name}' is invalid: {reason}")]
    InvalidRange { name: String, reason: String },

    #[error("fitness metric '{0}' not recognized")]
    UnknownMetric(String),
}

/// Values one parameter takes during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamRange {
    /// Explicit list, swept in the given order.
    Values(Vec<i64>),
    /// `start..=stop` in increments of `step`.
    Stepped { start: i64, stop: i64, step: i64 },
}

impl ParamRange {
    pub fn values(&self, name: &str) -> Result<Vec<i64>, SweepError> {
        let invalid = |reason: &str| SweepError::InvalidRange {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        match self {
            ParamRange::Values(values) if values.is_empty() => Err(invalid("no values")),
            ParamRange::Values(values) => Ok(values.clone()),
            ParamRange::Stepped { step, .. } if *step <= 0 => Err(invalid("step must be > 0")),
            ParamRange::Stepped { start, stop, .. } if start > stop => Err(invalid("start is past stop")),
            ParamRange::Stepped { start, stop, step } => {
                let mut out = Vec::new();
                let mut v = *start;
                while v <= *stop {
                    out.push(v);
                    match v.checked_add(*step) {
                        Some(next) => v = next,
                        None => break,
                    }
                }
                Ok(out)
            }
        }
    }
}

/// Expanded grid: one value list per parameter, in name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGrid {
    axes: Vec<(String, Vec<i64>)>,
}

impl ParamGrid {
    pub fn from_ranges(ranges: &BTreeMap<String, ParamRange>) -> Result<Self, SweepError> {
        let axes = ranges
            .iter()
            .map(|(name, range)| Ok((name.clone(), range.values(name)?)))
            .collect::<Result<Vec<_>, SweepError>>()?;
        Ok(Self { axes })
    }

    /// Number of grid points. An empty grid has exactly one point.
    pub fn size(&self) -> usize {
        self.axes.iter().map(|(_, values)| values.len()).product()
    }

    /// Every combination, the last axis varying fastest.
    pub fn combinations(&self) -> Vec<ParamSet> {
        let total = self.size();
        (0..total)
            .map(|mut n| {
                let mut point: Vec<(String, i64)> = Vec::with_capacity(self.axes.len());
                for (name, values) in self.axes.iter().rev() {
                    point.push((name.clone(), values[n % values.len()]));
                    n /= values.len();
                }
                point.into_iter().rev().collect()
            })
            .collect()
    }
}

/// Metric a sweep is ranked by; higher is better for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMetric {
    TradeCount,
    AvgTicks,
    WinRate,
    ProfitFactor,
    /// Net profit over max drawdown.
    NpMdd,
    Expectancy,
    ZScore,
}

impl FitnessMetric {
    pub fn value(&self, m: &PerformanceMetrics) -> f64 {
        match self {
            FitnessMetric::TradeCount => m.trade_count as f64,
            FitnessMetric::AvgTicks => m.avg_ticks,
            FitnessMetric::WinRate => m.win_rate,
            FitnessMetric::ProfitFactor => m.profit_factor,
            FitnessMetric::NpMdd => m.net_profit_to_drawdown,
            FitnessMetric::Expectancy => m.expectancy,
            FitnessMetric::ZScore => m.z_score,
        }
    }
}

impl fmt::Display for FitnessMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FitnessMetric::TradeCount => "trade_count",
            FitnessMetric::AvgTicks => "avg_ticks",
            FitnessMetric::WinRate => "win_rate",
            FitnessMetric::ProfitFactor => "profit_factor",
            FitnessMetric::NpMdd => "np_mdd",
            FitnessMetric::Expectancy => "expectancy",
            FitnessMetric::ZScore => "z_score",
        };
        f.write_str(s)
    }
}

impl FromStr for FitnessMetric {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trade_count" => Ok(FitnessMetric::TradeCount),
            "avg_ticks" => Ok(FitnessMetric::AvgTicks),
            "win_rate" => Ok(FitnessMetric::WinRate),
            "profit_factor" => Ok(FitnessMetric::ProfitFactor),
            "np_mdd" => Ok(FitnessMetric::NpMdd),
            "expectancy" => Ok(FitnessMetric::Expectancy),
            "z_score" => Ok(FitnessMetric::ZScore),
            _ => Err(SweepError::UnknownMetric(s.to_string())),
        }
    }
}

/// One grid point and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRun {
    pub run_id: String,
    pub params: ParamSet,
    pub fitness: f64,
    pub final_balance: f64,
    pub metrics: PerformanceMetrics,
}

/// All grid points, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    pub metric: FitnessMetric,
    pub runs: Vec<SweepRun>,
}

impl SweepResults {
    pub fn best(&self) -> Option<&SweepRun> {
        self.runs.first()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Configuration of a single grid point: swept values override `params`.
pub fn point_config(base: &RunConfig, point: &ParamSet) -> RunConfig {
    let mut config = base.clone();
    config.param_ranges.clear();
    for (name, value) in point.iter() {
        config.params.insert(name.to_string(), value);
    }
    config
}

/// Backtest every point of `config.param_ranges` and rank by `metric`.
///
/// Ties keep grid order, so the ranking does not depend on scheduling.
pub fn run_sweep(config: &RunConfig, bars: &[Bar], metric: FitnessMetric) -> Result<SweepResults, RunError> {
    let grid = ParamGrid::from_ranges(&config.param_ranges)?;
    let configs: Vec<RunConfig> = grid
        .combinations()
        .iter()
        .map(|point| point_config(config, point))
        .collect();
    info!(points = configs.len(), %metric, "sweep started");

    let mut runs = configs
        .par_iter()
        .map(|point| {
            let report = run_single_backtest(point, bars.to_vec())?;
            Ok(SweepRun {
                run_id: report.run_id,
                params: point.param_set(),
                fitness: metric.value(&report.metrics.all),
                final_balance: report.summary.final_balance,
                metrics: report.metrics.all,
            })
        })
        .collect::<Result<Vec<_>, RunError>>()?;

    runs.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

    if let Some(best) = runs.first() {
        info!(fitness = best.fitness, run_id = %best.run_id, "sweep complete");
    }
    Ok(SweepResults { metric, runs })
}
