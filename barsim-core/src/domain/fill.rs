use super::event::{Action, OrderKind};
use super::ids::Ticket;
use super::order::Order;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fill record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub action: Action,
    pub kind: OrderKind,
    pub fill_price: f64,
    pub quantity: u32,
    pub strategy: String,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub ticket: Ticket,
    pub commission: f64,
}

impl Fill {
    /// Build a fill that copies every order field.
    pub fn from_order(order: &Order, fill_price: f64, ticket: Ticket, commission: f64) -> Self {
        Self {
            symbol: order.symbol.clone(),
            timestamp: order.timestamp,
            action: order.action,
            kind: order.kind,
            fill_price,
            quantity: order.quantity,
            strategy: order.strategy.clone(),
            stop_loss: order.stop_loss,
            take_profit: order.take_profit,
            ticket,
            commission,
        }
    }
}
