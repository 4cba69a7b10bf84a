//! Position bookkeeping contract used by the dispatch loop and strategies.

pub mod handler;

pub use handler::PositionHandler;

use crate::domain::{Bar, Fill, Position, Side, Ticket, Transaction};
use crate::engine::EventQueue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortfolioError {
    #[error("no open position to close for strategy '{strategy}' (ticket {ticket})")]
    PositionNotFound { strategy: String, ticket: Ticket },
}

/// Balance figures the sizers need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub initial_balance: f64,
    pub balance: f64,
    /// Most negative closed-trade P/L, 0.0 if none.
    pub largest_loss: f64,
}

/// Open positions plus the account they settle into.
pub trait PositionBook {
    fn open_positions(&self) -> &[Position];

    /// Update open positions with a new bar; may enqueue protective exits.
    fn on_bar(&mut self, bar: &Bar, queue: &mut EventQueue);

    fn on_fill(&mut self, fill: &Fill) -> Result<(), PortfolioError>;

    /// Close every open position at the close of `bar`.
    fn close_all_positions(&mut self, bar: &Bar);

    fn balance(&self) -> f64;

    fn initial_balance(&self) -> f64;

    fn largest_loss(&self) -> f64;

    fn transactions(&self) -> &[Transaction];

    fn account(&self) -> AccountSnapshot {
        AccountSnapshot {
            initial_balance: self.initial_balance(),
            balance: self.balance(),
            largest_loss: self.largest_loss(),
        }
    }

    /// Whether a protective exit for `ticket` is already on the queue.
    fn exit_pending(&self, _ticket: Ticket) -> bool {
        false
    }

    fn has_open_positions(&self) -> bool {
        !self.open_positions().is_empty()
    }

    /// First open position on `side`, if any.
    fn position_on(&self, side: Side) -> Option<&Position> {
        self.open_positions().iter().find(|p| p.side == side)
    }
}
