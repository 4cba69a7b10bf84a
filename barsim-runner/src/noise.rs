//! Noise test: rerun one configuration on Gaussian-perturbed prices.
//!
//! Iteration 0 is the baseline on the original data. Iterations `1..runs`
//! enable random noise and use a seed derived from the master seed, the run
//! id, the symbol and the iteration number, so the outcome does not depend on
//! how rayon schedules the runs.

use barsim_core::domain::Bar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RunConfig;
use crate::metrics::{mean, std_dev, PerformanceMetrics};
use crate::rng::RngHierarchy;
use crate::runner::{run_backtest_from_config, RunError};

/// Outcome of one iteration of the noise test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseRun {
    pub iteration: usize,
    pub seed: u64,
    pub noisy: bool,
    pub final_balance: f64,
    pub metrics: PerformanceMetrics,
}

/// All iterations in iteration order; the first one is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseTestResult {
    pub run_id: String,
    pub runs: Vec<NoiseRun>,
}

impl NoiseTestResult {
    pub fn baseline(&self) -> Option<&NoiseRun> {
        self.runs.first()
    }

    pub fn noisy_runs(&self) -> &[NoiseRun] {
        self.runs.get(1..).unwrap_or(&[])
    }

    /// Mean and standard deviation of net profit over the noisy runs.
    pub fn net_profit_distribution(&self) -> (f64, f64) {
        let profits: Vec<f64> = self.noisy_runs().iter().map(|r| r.metrics.net_profit).collect();
        (mean(&profits), std_dev(&profits))
    }
}

/// Run the baseline plus `runs - 1` noisy backtests in parallel.
pub fn run_noise_test(config: &RunConfig, bars: &[Bar], runs: usize) -> Result<NoiseTestResult, RunError> {
    if runs == 0 {
        return Err(RunError::NoRuns);
    }
    let run_id = config.run_id()?;
    let base = config.into_backtest_config()?;
    let hierarchy = RngHierarchy::new(config.seed);
    let symbol = base.instrument.symbol.clone();

    let outcomes = (0..runs)
        .into_par_iter()
        .map(|iteration| {
            let mut bt = base.clone();
            let noisy = iteration > 0;
            if noisy {
                bt.random_noise = true;
                bt.seed = hierarchy.sub_seed(&run_id, &symbol, iteration as u64);
            }
            let seed = bt.seed;
            let (summary, metrics) = run_backtest_from_config(bt, bars.to_vec())?;
            Ok(NoiseRun {
                iteration,
                seed,
                noisy,
                final_balance: summary.final_balance,
                metrics: metrics.all,
            })
        })
        .collect::<Result<Vec<_>, RunError>>()?;

    let result = NoiseTestResult {
        run_id,
        runs: outcomes,
    };
    let (avg, std) = result.net_profit_distribution();
    info!(runs, net_profit_mean = avg, net_profit_std = std, "noise test complete");
    Ok(result)
}
