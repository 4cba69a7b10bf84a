//! Open position with excursion tracking.

use super::bar::Bar;
use super::event::Side;
use super::ids::Ticket;
use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// An open position.
///
/// `mae` and `mfe` are non-negative amounts in account currency.
/// `stop_loss` / `take_profit` are totals for the whole quantity; 0.0 means
/// the level is not set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub strategy: String,
    pub side: Side,
    pub quantity: u32,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub ticket: Ticket,
    /// Round-turn commission per contract charged when the position closes.
    pub commission: f64,
    pub mae: f64,
    pub mfe: f64,
    pub bars_in_trade: u32,
    pub days_in_trade: u32,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }

    pub fn is_short(&self) -> bool {
        self.side == Side::Short
    }

    /// Profit or loss if closed at `price`, in account currency.
    pub fn pnl_at(&self, price: f64, big_point_value: f64) -> f64 {
        let points = match self.side {
            Side::Long => price - self.entry_price,
            Side::Short => self.entry_price - price,
        };
        points * f64::from(self.quantity) * big_point_value
    }

    /// Update excursions and counters with a new bar.
    ///
    /// Returns true when a defined stop-loss or take-profit has been reached.
    pub fn update(&mut self, bar: &Bar, big_point_value: f64, session_close: NaiveTime) -> bool {
        let qty = f64::from(self.quantity);
        let (adverse, favourable) = match self.side {
            Side::Long => (self.entry_price - bar.low, bar.high - self.entry_price),
            Side::Short => (bar.high - self.entry_price, self.entry_price - bar.low),
        };
        self.mae = self.mae.max(adverse * qty * big_point_value);
        self.mfe = self.mfe.max(favourable * qty * big_point_value);

        self.bars_in_trade += 1;
        if bar.timestamp.time() == session_close {
            self.days_in_trade += 1;
        }

        let stop_hit = self.stop_loss != 0.0 && self.mae >= self.stop_loss;
        let target_hit = self.take_profit != 0.0 && self.mfe >= self.take_profit;
        stop_hit || target_hit
    }
}
