//! Strategy contract and registry.
//!
//! A strategy reads the price histories and the position book once per bar
//! and proposes at most one long-side and one short-side [`Signal`].

pub mod factory;
pub mod no_trade;
pub mod params;
pub mod session_breakout;

pub use factory::{create_strategy, FactoryError, STRATEGY_NAMES};
pub use no_trade::NoTrade;
pub use params::{ParamError, ParamSet};
pub use session_breakout::SessionBreakout;

use crate::portfolio::PositionBook;
use crate::price_collection::PriceCollection;
use crate::signals::Candidates;

/// Trading rule driven by the dispatch loop.
///
/// # Contract
/// - `compute_signals` may only read bars already in the price collection
/// - `candidates[0]` is reserved for the long side, `candidates[1]` for short
/// - `compute_signals` is called only after `preliminaries` returned true
pub trait Strategy: Send {
    fn name(&self) -> &str;

    fn set_param_values(&mut self, params: &ParamSet) -> Result<(), ParamError>;

    /// Per-bar bookkeeping. Returns false while there is not enough history.
    fn preliminaries(&mut self, prices: &PriceCollection, book: &dyn PositionBook) -> bool;

    fn compute_signals(
        &mut self,
        prices: &PriceCollection,
        book: &dyn PositionBook,
        candidates: &mut Candidates,
    );
}
