use super::DataFeed;
use crate::domain::Bar;
use crate::engine::EventQueue;
use tracing::debug;

/// In-memory feed over a pre-loaded bar series, oldest first.
#[derive(Debug, Clone)]
pub struct HistoricalFeed {
    bars: Vec<Bar>,
    cursor: usize,
    open: bool,
    exhausted: bool,
}

impl HistoricalFeed {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            cursor: 0,
            open: false,
            exhausted: false,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

impl DataFeed for HistoricalFeed {
    fn open_data_connection(&mut self) {
        self.cursor = 0;
        self.open = true;
        self.exhausted = false;
        debug!(bars = self.bars.len(), "historical feed opened");
    }

    fn continue_parsing(&self) -> bool {
        self.open && !self.exhausted
    }

    fn stream_next_bar(&mut self, queue: &mut EventQueue) {
        if !self.open {
            return;
        }
        match self.bars.get(self.cursor) {
            Some(bar) => {
                queue.push(bar.clone());
                self.cursor += 1;
            }
            None => self.exhausted = true,
        }
    }

    fn close_data_connection(&mut self) {
        self.open = false;
    }

    fn tot_bars(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Event, Timeframe};
    use chrono::{NaiveDate, Timelike};

    fn bars(n: u32) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
                    .unwrap()
                    .and_hms_opt(i, 0, 0)
                    .unwrap();
                Bar::new("GC", ts, Timeframe::Minutes(60), 1.0, 2.0, 0.5, 1.5, 1)
            })
            .collect()
    }

    #[test]
    fn streams_each_bar_once_then_stops() {
        let mut feed = HistoricalFeed::new(bars(2));
        let mut q = EventQueue::new();
        assert!(!feed.continue_parsing());
        feed.open_data_connection();
        assert!(feed.continue_parsing());

        feed.stream_next_bar(&mut q);
        feed.stream_next_bar(&mut q);
        assert_eq!(q.len(), 2);
        assert!(feed.continue_parsing());

        feed.stream_next_bar(&mut q);
        assert_eq!(q.len(), 2);
        assert!(!feed.continue_parsing());
        assert_eq!(feed.tot_bars(), 2);
        assert!(matches!(q.pop(), Some(Event::Bar(b)) if b.timestamp.hour() == 0));
    }
}
