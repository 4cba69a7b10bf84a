//! Conditional trade intents proposed by a strategy.

use super::event::{Action, OrderKind};
use super::ids::Ticket;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A pending trade intent.
///
/// Stop-loss and take-profit are per contract; they are scaled by the order
/// quantity when the signal triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    /// Timestamp of the bar that produced the signal.
    pub timestamp: NaiveDateTime,
    pub action: Action,
    pub kind: OrderKind,
    /// Suggested price. Ignored for market signals.
    pub level: f64,
    /// Multiplier applied to the sizer output (entries).
    pub size_factor: f64,
    /// Quantity to close (exits).
    pub quantity_to_close: u32,
    pub strategy: String,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Position ticket for exits.
    pub ticket: Ticket,
}

impl Signal {
    /// Entry signal with a unit size factor and no protective levels.
    pub fn entry(
        symbol: impl Into<String>,
        timestamp: NaiveDateTime,
        action: Action,
        kind: OrderKind,
        level: f64,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            action,
            kind,
            level,
            size_factor: 1.0,
            quantity_to_close: 0,
            strategy: strategy.into(),
            stop_loss: 0.0,
            take_profit: 0.0,
            ticket: Ticket::NONE,
        }
    }

    /// Exit signal closing `quantity` contracts of the position `ticket`.
    #[allow(clippy::too_many_arguments)]
    pub fn exit(
        symbol: impl Into<String>,
        timestamp: NaiveDateTime,
        action: Action,
        kind: OrderKind,
        level: f64,
        quantity: u32,
        ticket: Ticket,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            action,
            kind,
            level,
            size_factor: 1.0,
            quantity_to_close: quantity,
            strategy: strategy.into(),
            stop_loss: 0.0,
            take_profit: 0.0,
            ticket,
        }
    }

    pub fn with_size_factor(mut self, factor: f64) -> Self {
        self.size_factor = factor;
        self
    }

    pub fn with_stop_loss(mut self, per_contract: f64) -> Self {
        self.stop_loss = per_contract;
        self
    }

    pub fn with_take_profit(mut self, per_contract: f64) -> Self {
        self.take_profit = per_contract;
        self
    }

    pub fn is_entry(&self) -> bool {
        self.action.is_entry()
    }
}
