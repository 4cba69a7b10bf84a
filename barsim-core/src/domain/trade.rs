//! Closed round trips.

use super::event::Side;
use super::ids::Ticket;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A closed position as recorded in the account ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub symbol: String,
    pub strategy: String,
    pub ticket: Ticket,
    pub side: Side,
    pub quantity: u32,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub mae: f64,
    pub mfe: f64,
    pub bars_in_trade: u32,
    pub gross_pl: f64,
    pub commission: f64,
    /// Gross profit/loss minus commission.
    pub net_pl: f64,
    /// Account balance minus initial balance after this trade.
    pub cumulative_pl: f64,
}

impl Transaction {
    pub fn is_winner(&self) -> bool {
        self.net_pl > 0.0
    }

    /// Price move captured by the trade, in ticks.
    pub fn ticks(&self, tick_size: f64) -> i64 {
        let points = match self.side {
            Side::Long => self.exit_price - self.entry_price,
            Side::Short => self.entry_price - self.exit_price,
        };
        (points / tick_size).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Transaction {
        let t = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Transaction {
            symbol: "GC".into(),
            strategy: "s".into(),
            ticket: Ticket(3),
            side: Side::Short,
            quantity: 1,
            entry_time: t,
            entry_price: 2000.0,
            exit_time: t,
            exit_price: 1995.0,
            mae: 100.0,
            mfe: 600.0,
            bars_in_trade: 4,
            gross_pl: 500.0,
            commission: 3.0,
            net_pl: 497.0,
            cumulative_pl: 497.0,
        }
    }

    #[test]
    fn short_ticks_are_positive_when_price_falls() {
        assert_eq!(sample().ticks(0.1), 50);
        assert!(sample().is_winner());
    }
}
