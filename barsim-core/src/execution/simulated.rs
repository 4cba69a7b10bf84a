//! Simulated broker: immediate fills with random slippage.

use super::slippage::{slippage_for_ticks, SlippageModel};
use super::ExecutionError;
use crate::domain::{Fill, Instrument, Order, Ticket};
use crate::engine::EventQueue;
use rand::{Rng, RngCore};
use tracing::debug;

/// Highest broker ticket handed out for entries.
pub const MAX_TICKET: u32 = 10_000;

#[derive(Debug)]
pub struct SimulatedExecution {
    instrument: Instrument,
    include_commissions: bool,
    slippage: Box<dyn SlippageModel>,
}

impl SimulatedExecution {
    pub fn new(instrument: Instrument, include_commissions: bool, slippage_ticks: u32) -> Self {
        Self::with_slippage(instrument, include_commissions, slippage_for_ticks(slippage_ticks))
    }

    pub fn with_slippage(
        instrument: Instrument,
        include_commissions: bool,
        slippage: Box<dyn SlippageModel>,
    ) -> Self {
        Self {
            instrument,
            include_commissions,
            slippage,
        }
    }

    /// Fill `order` and enqueue the resulting [`Fill`].
    ///
    /// Entries get a fresh ticket in `[1, MAX_TICKET]`; exits keep the
    /// ticket carried by the order.
    pub fn on_order(
        &self,
        order: &Order,
        rng: &mut dyn RngCore,
        queue: &mut EventQueue,
    ) -> Result<(), ExecutionError> {
        if order.quantity == 0 {
            return Err(ExecutionError::ZeroQuantity {
                symbol: order.symbol.clone(),
                action: order.action.to_string(),
            });
        }
        if !order.suggested_price.is_finite() {
            return Err(ExecutionError::InvalidPrice {
                symbol: order.symbol.clone(),
                action: order.action.to_string(),
                price: order.suggested_price,
            });
        }

        let ticket = if order.is_entry() {
            Ticket(rng.gen_range(1..=MAX_TICKET))
        } else {
            order.ticket
        };
        let fill_price = order.suggested_price + self.slippage.offset(self.instrument.tick_size, rng);
        let commission = if self.include_commissions {
            self.instrument.commission
        } else {
            0.0
        };

        debug!(
            action = %order.action,
            %ticket,
            qty = order.quantity,
            suggested = order.suggested_price,
            fill_price,
            "order filled"
        );
        queue.push(Fill::from_order(order, fill_price, ticket, commission));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, Event, OrderKind};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn order(action: Action, ticket: Ticket) -> Order {
        Order {
            symbol: "C".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            action,
            kind: OrderKind::Stop,
            suggested_price: 450.0,
            quantity: 2,
            strategy: "s".into(),
            stop_loss: 100.0,
            take_profit: 0.0,
            ticket,
        }
    }

    fn pop_fill(q: &mut EventQueue) -> Fill {
        match q.pop() {
            Some(Event::Fill(f)) => f,
            other => panic!("expected fill, got {other:?}"),
        }
    }

    #[test]
    fn entry_gets_fresh_ticket_and_no_slippage() {
        let exec = SimulatedExecution::new(Instrument::from_symbol("C").unwrap(), false, 0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut q = EventQueue::new();
        exec.on_order(&order(Action::Buy, Ticket::NONE), &mut rng, &mut q).unwrap();
        let fill = pop_fill(&mut q);
        assert!((1..=MAX_TICKET).contains(&fill.ticket.0));
        assert_eq!(fill.fill_price, 450.0);
        assert_eq!(fill.commission, 0.0);
        assert_eq!(fill.quantity, 2);
        assert_eq!(fill.stop_loss, 100.0);
    }

    #[test]
    fn exit_keeps_order_ticket_and_pays_commission() {
        let exec = SimulatedExecution::new(Instrument::from_symbol("C").unwrap(), true, 0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut q = EventQueue::new();
        exec.on_order(&order(Action::Sell, Ticket(77)), &mut rng, &mut q).unwrap();
        let fill = pop_fill(&mut q);
        assert_eq!(fill.ticket, Ticket(77));
        assert_eq!(fill.commission, 3.0);
    }

    #[test]
    fn slipped_price_is_on_tick_grid() {
        // C tick size 0.25, up to 2 ticks either way
        let exec = SimulatedExecution::new(Instrument::from_symbol("C").unwrap(), false, 2);
        let mut rng = StdRng::seed_from_u64(11);
        let mut q = EventQueue::new();
        for _ in 0..50 {
            exec.on_order(&order(Action::Buy, Ticket::NONE), &mut rng, &mut q).unwrap();
            let fill = pop_fill(&mut q);
            let off = fill.fill_price - 450.0;
            assert!((-0.5..=0.5).contains(&off));
            assert_eq!((off / 0.25).fract(), 0.0);
        }
    }

    #[test]
    fn zero_quantity_order_is_rejected() {
        let exec = SimulatedExecution::new(Instrument::from_symbol("C").unwrap(), false, 0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut q = EventQueue::new();
        let mut o = order(Action::Buy, Ticket::NONE);
        o.quantity = 0;
        assert!(matches!(
            exec.on_order(&o, &mut rng, &mut q),
            Err(ExecutionError::ZeroQuantity { .. })
        ));
        assert!(q.is_empty());
    }
}
