//! Event queue and the backtest dispatch loop.

pub mod backtest;
pub mod queue;

pub use backtest::{run_backtest, Backtest, BacktestConfig, BacktestError, RunSummary};
pub use queue::EventQueue;
