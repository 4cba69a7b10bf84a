use super::trade::Transaction;
use serde::{Deserialize, Serialize};

/// Cash balance and closed-transaction ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    initial_balance: f64,
    balance: f64,
    transactions: Vec<Transaction>,
}

impl Account {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            initial_balance,
            balance: initial_balance,
            transactions: Vec::new(),
        }
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn update_balance(&mut self, pl: f64) {
        self.balance += pl;
    }

    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Most negative net P/L among closed transactions, 0.0 if none lost.
    pub fn largest_loss(&self) -> f64 {
        self.transactions
            .iter()
            .map(|t| t.net_pl)
            .fold(0.0, f64::min)
    }

    pub fn reset(&mut self, initial_balance: f64) {
        *self = Self::new(initial_balance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Side, Ticket};
    use chrono::NaiveDate;

    fn tx(net_pl: f64) -> Transaction {
        let t = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Transaction {
            symbol: "GC".into(),
            strategy: "s".into(),
            ticket: Ticket(1),
            side: Side::Long,
            quantity: 1,
            entry_time: t,
            entry_price: 1.0,
            exit_time: t,
            exit_price: 1.0,
            mae: 0.0,
            mfe: 0.0,
            bars_in_trade: 1,
            gross_pl: net_pl,
            commission: 0.0,
            net_pl,
            cumulative_pl: net_pl,
        }
    }

    #[test]
    fn largest_loss_is_zero_without_losers() {
        let mut acct = Account::new(1000.0);
        assert_eq!(acct.largest_loss(), 0.0);
        acct.add_transaction(tx(50.0));
        assert_eq!(acct.largest_loss(), 0.0);
    }

    #[test]
    fn largest_loss_picks_most_negative() {
        let mut acct = Account::new(1000.0);
        acct.add_transaction(tx(-20.0));
        acct.add_transaction(tx(-75.0));
        acct.add_transaction(tx(10.0));
        assert_eq!(acct.largest_loss(), -75.0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut acct = Account::new(1000.0);
        acct.update_balance(-100.0);
        acct.add_transaction(tx(-100.0));
        acct.reset(5000.0);
        assert_eq!(acct.balance(), 5000.0);
        assert!(acct.transactions().is_empty());
    }
}
