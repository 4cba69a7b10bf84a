//! Orders produced when a pending signal triggers.

use super::event::{Action, OrderKind};
use super::ids::Ticket;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Order handed to the execution simulator.
///
/// `stop_loss` and `take_profit` are totals for the whole quantity, not per
/// contract. A value of 0.0 means the level is not set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    /// Timestamp of the bar that triggered the signal.
    pub timestamp: NaiveDateTime,
    pub action: Action,
    pub kind: OrderKind,
    pub suggested_price: f64,
    pub quantity: u32,
    pub strategy: String,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Position ticket for exits, `Ticket::NONE` for entries.
    pub ticket: Ticket,
}

impl Order {
    pub fn is_entry(&self) -> bool {
        self.action.is_entry()
    }

    /// Notional value at the suggested price, in price units.
    pub fn notional(&self) -> f64 {
        self.suggested_price * f64::from(self.quantity)
    }
}
