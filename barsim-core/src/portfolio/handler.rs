//! Reference position handler: open positions, SL/TP monitoring, ledger.

use super::{PortfolioError, PositionBook};
use crate::domain::{
    Account, Action, Bar, Fill, Instrument, Order, OrderKind, Position, Side, Ticket, Transaction,
};
use crate::engine::EventQueue;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PositionHandler {
    instrument: Instrument,
    account: Account,
    positions: Vec<Position>,
    /// Tickets with a protective exit already queued.
    exiting: Vec<Ticket>,
}

impl PositionHandler {
    pub fn new(instrument: Instrument, initial_balance: f64) -> Self {
        Self {
            instrument,
            account: Account::new(initial_balance),
            positions: Vec::new(),
            exiting: Vec::new(),
        }
    }

    pub fn account_ledger(&self) -> &Account {
        &self.account
    }

    fn open_position(&mut self, fill: &Fill) {
        let side = fill.action.side();
        debug!(ticket = %fill.ticket, %side, qty = fill.quantity, price = fill.fill_price, "position opened");
        self.positions.push(Position {
            symbol: fill.symbol.clone(),
            strategy: fill.strategy.clone(),
            side,
            quantity: fill.quantity,
            entry_time: fill.timestamp,
            entry_price: fill.fill_price,
            stop_loss: fill.stop_loss,
            take_profit: fill.take_profit,
            ticket: fill.ticket,
            commission: fill.commission,
            mae: 0.0,
            mfe: 0.0,
            bars_in_trade: 1,
            days_in_trade: 0,
        });
    }

    fn find_position(&self, fill: &Fill) -> Option<usize> {
        let side = fill.action.side();
        if !fill.ticket.is_none() {
            return self
                .positions
                .iter()
                .position(|p| p.ticket == fill.ticket && p.side == side);
        }
        self.positions
            .iter()
            .position(|p| p.strategy == fill.strategy && p.side == side)
    }

    /// Settle `quantity` contracts of the position at `idx` at `price`.
    fn settle(&mut self, idx: usize, quantity: u32, price: f64, exit_time: chrono::NaiveDateTime) {
        let bpv = self.instrument.big_point_value();
        let pos = &self.positions[idx];
        let quantity = quantity.min(pos.quantity);

        let points = match pos.side {
            Side::Long => price - pos.entry_price,
            Side::Short => pos.entry_price - price,
        };
        let gross_pl = points * f64::from(quantity) * bpv;
        let commission = pos.commission * f64::from(quantity);
        let net_pl = gross_pl - commission;
        self.account.update_balance(net_pl);

        let transaction = Transaction {
            symbol: pos.symbol.clone(),
            strategy: pos.strategy.clone(),
            ticket: pos.ticket,
            side: pos.side,
            quantity,
            entry_time: pos.entry_time,
            entry_price: pos.entry_price,
            exit_time,
            exit_price: price,
            mae: round1(pos.mae),
            mfe: round1(pos.mfe),
            bars_in_trade: pos.bars_in_trade,
            gross_pl,
            commission,
            net_pl,
            cumulative_pl: self.account.balance() - self.account.initial_balance(),
        };
        debug!(ticket = %pos.ticket, side = %pos.side, qty = quantity, net_pl, "position closed");
        self.account.add_transaction(transaction);

        let remaining = self.positions[idx].quantity - quantity;
        if remaining == 0 {
            let closed = self.positions.remove(idx);
            self.exiting.retain(|t| *t != closed.ticket);
        } else {
            self.positions[idx].quantity = remaining;
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl PositionBook for PositionHandler {
    fn open_positions(&self) -> &[Position] {
        &self.positions
    }

    fn on_bar(&mut self, bar: &Bar, queue: &mut EventQueue) {
        let bpv = self.instrument.big_point_value();
        let session_close = self.instrument.session_close;
        for pos in self.positions.iter_mut() {
            let hit = pos.update(bar, bpv, session_close);
            if !hit || self.exiting.contains(&pos.ticket) {
                continue;
            }
            let action = match pos.side {
                Side::Long => Action::Sell,
                Side::Short => Action::BuyToCover,
            };
            debug!(ticket = %pos.ticket, mae = pos.mae, mfe = pos.mfe, "protective level reached");
            queue.push(Order {
                symbol: pos.symbol.clone(),
                timestamp: bar.timestamp,
                action,
                kind: OrderKind::Market,
                suggested_price: bar.close,
                quantity: pos.quantity,
                strategy: pos.strategy.clone(),
                stop_loss: 0.0,
                take_profit: 0.0,
                ticket: pos.ticket,
            });
            self.exiting.push(pos.ticket);
        }
    }

    fn on_fill(&mut self, fill: &Fill) -> Result<(), PortfolioError> {
        if fill.action.is_entry() {
            self.open_position(fill);
            return Ok(());
        }
        let Some(idx) = self.find_position(fill) else {
            return Err(PortfolioError::PositionNotFound {
                strategy: fill.strategy.clone(),
                ticket: fill.ticket,
            });
        };
        if fill.quantity > self.positions[idx].quantity {
            warn!(
                ticket = %fill.ticket,
                fill_qty = fill.quantity,
                open_qty = self.positions[idx].quantity,
                "exit fill larger than open position, closing what is open"
            );
        }
        self.settle(idx, fill.quantity, fill.fill_price, fill.timestamp);
        Ok(())
    }

    fn close_all_positions(&mut self, bar: &Bar) {
        while !self.positions.is_empty() {
            let qty = self.positions[0].quantity;
            self.settle(0, qty, bar.close, bar.timestamp);
        }
    }

    fn exit_pending(&self, ticket: Ticket) -> bool {
        self.exiting.contains(&ticket)
    }

    fn balance(&self) -> f64 {
        self.account.balance()
    }

    fn initial_balance(&self) -> f64 {
        self.account.initial_balance()
    }

    fn largest_loss(&self) -> f64 {
        self.account.largest_loss()
    }

    fn transactions(&self) -> &[Transaction] {
        self.account.transactions()
    }
}
