//! Execution simulation: orders become fills.

pub mod simulated;
pub mod slippage;

pub use simulated::SimulatedExecution;
pub use slippage::{slippage_for_ticks, NoSlippage, SlippageModel, TickSlippage};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("order {action} for {symbol} has zero quantity")]
    ZeroQuantity { symbol: String, action: String },

    #[error("order {action} for {symbol} has non-finite price {price}")]
    InvalidPrice {
        symbol: String,
        action: String,
        price: f64,
    },
}
