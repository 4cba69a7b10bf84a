//! FIFO event queue owned by the dispatch loop.

use crate::domain::Event;
use std::collections::VecDeque;

/// First-in first-out queue of pending events.
///
/// Components receive `&mut EventQueue` for the duration of a call and may
/// only append; the loop is the sole consumer.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: impl Into<Event>) {
        self.events.push_back(event.into());
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
