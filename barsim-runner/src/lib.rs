//! Barsim Runner: run configuration, single backtests, metrics and noise tests.
//!
//! This crate builds on `barsim-core` to provide:
//! - TOML run configuration with validation
//! - Single-backtest runner with performance metrics
//! - Noise robustness test run in parallel with deterministic seeds
//! - Parallel parameter sweep ranked by a fitness metric
//! - Logging setup

pub mod config;
pub mod logging;
pub mod metrics;
pub mod noise;
pub mod rng;
pub mod runner;
pub mod sweep;

pub use config::{ConfigError, InstrumentSpec, RunConfig};
pub use logging::init_logging;
pub use metrics::{PerformanceMetrics, PerformanceReport};
pub use noise::{run_noise_test, NoiseRun, NoiseTestResult};
pub use rng::RngHierarchy;
pub use runner::{run_backtest_from_config, run_single_backtest, BacktestReport, RunError};
pub use sweep::{run_sweep, FitnessMetric, ParamGrid, ParamRange, SweepError, SweepResults, SweepRun};
