use crate::domain::Signal;
use std::collections::VecDeque;

/// Maximum number of pending signals per side.
pub const SLOT_CAPACITY: usize = 2;

/// Pending signals for one side, front first.
///
/// Holds at most two signals: an entry with its exit, or an exit with the
/// next entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingSlot {
    signals: VecDeque<Signal>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.signals.len() >= SLOT_CAPACITY
    }

    pub fn front(&self) -> Option<&Signal> {
        self.signals.front()
    }

    /// Append a signal. Returns false, leaving the slot unchanged, when full.
    pub fn push(&mut self, signal: Signal) -> bool {
        if self.is_full() {
            return false;
        }
        self.signals.push_back(signal);
        true
    }

    pub fn pop_front(&mut self) -> Option<Signal> {
        self.signals.pop_front()
    }

    pub fn replace_front(&mut self, signal: Signal) {
        if let Some(front) = self.signals.front_mut() {
            *front = signal;
        }
    }

    pub fn clear(&mut self) {
        self.signals.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, OrderKind};
    use chrono::NaiveDate;

    fn sig(action: Action, level: f64) -> Signal {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Signal::entry("GC", ts, action, OrderKind::Stop, level, "s")
    }

    #[test]
    fn capacity_is_enforced() {
        let mut slot = PendingSlot::new();
        assert!(slot.push(sig(Action::Buy, 1.0)));
        assert!(slot.push(sig(Action::Sell, 2.0)));
        assert!(!slot.push(sig(Action::Buy, 3.0)));
        assert_eq!(slot.len(), 2);
        assert_eq!(slot.front().map(|s| s.level), Some(1.0));
    }

    #[test]
    fn replace_front_keeps_order() {
        let mut slot = PendingSlot::new();
        slot.push(sig(Action::Buy, 1.0));
        slot.push(sig(Action::Sell, 2.0));
        slot.replace_front(sig(Action::Buy, 1.5));
        let levels: Vec<f64> = slot.iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![1.5, 2.0]);
    }

    #[test]
    fn replace_on_empty_slot_is_noop() {
        let mut slot = PendingSlot::new();
        slot.replace_front(sig(Action::Buy, 1.0));
        assert!(slot.is_empty());
    }
}
