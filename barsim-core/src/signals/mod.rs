//! Signal lifecycle: pending slots, triggering and order emission.
//!
//! Once per bar the handler receives the strategy's candidate pair
//! `[long, short]`. New signals are parked in a per-side [`PendingSlot`] and
//! can only be triggered by a later bar. The front of each slot is checked
//! against the current bar; a triggered front becomes an [`Order`] on the
//! event queue.

pub mod slot;
pub mod trigger;

pub use slot::{PendingSlot, SLOT_CAPACITY};
pub use trigger::{is_triggered, TriggerResult};

use crate::domain::{Action, Bar, Instrument, Order, Signal, Ticket};
use crate::engine::EventQueue;
use crate::portfolio::PositionBook;
use crate::sizers::PositionSizer;
use tracing::{debug, warn};

pub const LONG: usize = 0;
pub const SHORT: usize = 1;

/// Candidate signals for one bar: index 0 long, index 1 short.
pub type Candidates = [Option<Signal>; 2];

#[derive(Debug)]
pub struct SignalHandler {
    instrument: Instrument,
    sizer: PositionSizer,
    slots: [PendingSlot; 2],
}

impl SignalHandler {
    pub fn new(instrument: Instrument, sizer: PositionSizer) -> Self {
        Self {
            instrument,
            sizer,
            slots: [PendingSlot::new(), PendingSlot::new()],
        }
    }

    pub fn long_signals(&self) -> &PendingSlot {
        &self.slots[LONG]
    }

    pub fn short_signals(&self) -> &PendingSlot {
        &self.slots[SHORT]
    }

    pub fn clear(&mut self) {
        self.slots[LONG].clear();
        self.slots[SHORT].clear();
    }

    /// Process the candidate pair produced on `bar`.
    ///
    /// The long side is handled first; a trigger on either side ends the
    /// tick.
    pub fn on_signals(
        &mut self,
        bar: &Bar,
        candidates: Candidates,
        book: &dyn PositionBook,
        queue: &mut EventQueue,
    ) {
        for (ls, candidate) in candidates.into_iter().enumerate() {
            let candidate = candidate.filter(|sig| !self.suppressed(bar, sig));

            let Some(new_signal) = candidate else {
                if self.handle_front(ls, bar, None, book, queue) {
                    break;
                }
                continue;
            };

            if self.slots[ls].is_empty() {
                if new_signal.action.is_exit() || !book.has_open_positions() {
                    debug!(side = ls, action = %new_signal.action, level = new_signal.level, "signal parked");
                    self.slots[ls].push(new_signal);
                }
                continue;
            }

            if !self.slots[ls].is_full() && self.is_legal_append(ls, &new_signal) {
                debug!(side = ls, action = %new_signal.action, "signal appended");
                self.slots[ls].push(new_signal.clone());
            }
            if self.handle_front(ls, bar, Some(&new_signal), book, queue) {
                break;
            }
        }
    }

    /// Entries stamped at the session close of an intraday bar are dropped.
    fn suppressed(&self, bar: &Bar, signal: &Signal) -> bool {
        let drop = signal.action.is_entry()
            && bar.timeframe.is_intraday()
            && signal.timestamp.time() == self.instrument.session_close;
        if drop {
            debug!(action = %signal.action, ts = %signal.timestamp, "entry at session close suppressed");
        }
        drop
    }

    /// Whether `new` may follow the current front of slot `ls`.
    ///
    /// An entry may only queue behind an exit: a pending exit on the opposite
    /// slot counts as a reversal, but never while this slot's front is itself
    /// an entry.
    fn is_legal_append(&self, ls: usize, new: &Signal) -> bool {
        let front = self.slots[ls].front().map(|s| s.action);
        let front_is_entry = front.is_some_and(|a| a.is_entry());
        if ls == LONG {
            let short_front = self.slots[SHORT].front().map(|s| s.action);
            (front == Some(Action::Buy) && new.action == Action::Sell)
                || ((front == Some(Action::Sell)
                    || (!front_is_entry && short_front == Some(Action::BuyToCover)))
                    && new.action == Action::Buy)
        } else {
            let long_front = self.slots[LONG].front().map(|s| s.action);
            (front == Some(Action::SellShort) && new.action == Action::BuyToCover)
                || ((front == Some(Action::BuyToCover)
                    || (!front_is_entry && long_front == Some(Action::Sell)))
                    && new.action == Action::SellShort)
        }
    }

    /// Check the front of slot `ls` against `bar`. Returns true if it triggered.
    fn handle_front(
        &mut self,
        ls: usize,
        bar: &Bar,
        live: Option<&Signal>,
        book: &dyn PositionBook,
        queue: &mut EventQueue,
    ) -> bool {
        let Some(front) = self.slots[ls].front() else {
            return false;
        };
        let front_action = front.action;

        match is_triggered(bar, front) {
            TriggerResult::Fill { fill_price, .. } => {
                let Some(front) = self.slots[ls].pop_front() else {
                    return false;
                };
                debug!(side = ls, action = %front.action, fill_price, "signal triggered");
                match front.action {
                    Action::Buy => self.slots[SHORT].clear(),
                    Action::SellShort => self.slots[LONG].clear(),
                    _ => {}
                }
                if let Some(order) = self.signal_to_order(bar, &front, fill_price, book) {
                    queue.push(order);
                }
                true
            }
            TriggerResult::NoTrigger => {
                match live {
                    Some(candidate) if candidate.action == front_action => {
                        self.slots[ls].replace_front(candidate.clone());
                    }
                    None => {
                        self.slots[ls].pop_front();
                    }
                    Some(_) => {}
                }
                false
            }
        }
    }

    fn signal_to_order(
        &self,
        bar: &Bar,
        signal: &Signal,
        price: f64,
        book: &dyn PositionBook,
    ) -> Option<Order> {
        let (quantity, ticket) = if signal.action.is_entry() {
            let qty = self
                .sizer
                .compute_quantity(bar.close, signal.size_factor, &book.account());
            (qty, Ticket::NONE)
        } else {
            if !exit_has_position(signal, book) {
                debug!(ticket = %signal.ticket, action = %signal.action, "exit for a position no longer open, dropped");
                return None;
            }
            (signal.quantity_to_close, signal.ticket)
        };

        if quantity == 0 {
            warn!(action = %signal.action, size_factor = signal.size_factor, "order quantity is zero, not sent");
            return None;
        }

        let qty = f64::from(quantity);
        let order = Order {
            symbol: signal.symbol.clone(),
            timestamp: bar.timestamp,
            action: signal.action,
            kind: signal.kind,
            suggested_price: price,
            quantity,
            strategy: signal.strategy.clone(),
            stop_loss: signal.stop_loss * qty,
            take_profit: signal.take_profit * qty,
            ticket,
        };
        debug!(action = %order.action, kind = %order.kind, qty = quantity, price, "order sent");
        Some(order)
    }
}

fn exit_has_position(signal: &Signal, book: &dyn PositionBook) -> bool {
    let side = signal.action.side();
    book.open_positions().iter().any(|p| {
        let matches = p.side == side
            && if signal.ticket.is_none() {
                p.strategy == signal.strategy
            } else {
                p.ticket == signal.ticket
            };
        matches && !book.exit_pending(p.ticket)
    })
}
