//! Market data feed contract.

pub mod historical;

pub use historical::HistoricalFeed;

use crate::engine::EventQueue;

/// Source of bars for the dispatch loop.
///
/// `stream_next_bar` pushes at most one `Event::Bar` per call. Once the data
/// is exhausted `continue_parsing` turns false.
pub trait DataFeed {
    fn open_data_connection(&mut self);

    fn continue_parsing(&self) -> bool;

    fn stream_next_bar(&mut self, queue: &mut EventQueue);

    fn close_data_connection(&mut self);

    /// Total number of bars streamed so far.
    fn tot_bars(&self) -> usize;
}
