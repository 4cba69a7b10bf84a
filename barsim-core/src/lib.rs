//! Barsim Core: event queue, price collection, signal lifecycle, sizing,
//! simulated execution and position accounting for a bar-by-bar backtester.
//!
//! One run wires the pieces together through a single FIFO event queue:
//! - a [`feed::DataFeed`] pushes bars
//! - the [`price_collection::PriceCollection`] keeps bounded histories
//! - a [`strategy::Strategy`] proposes at most one long and one short signal per bar
//! - the [`signals::SignalHandler`] turns triggered signals into orders
//! - [`execution::SimulatedExecution`] turns orders into fills
//! - a [`portfolio::PositionBook`] tracks positions and realized P/L

pub mod domain;
pub mod engine;
pub mod execution;
pub mod feed;
pub mod portfolio;
pub mod price_collection;
pub mod signals;
pub mod sizers;
pub mod strategy;

pub use engine::{run_backtest, Backtest, BacktestConfig, BacktestError, RunSummary};
