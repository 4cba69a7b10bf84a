use super::{ParamError, ParamSet, Strategy};
use crate::portfolio::PositionBook;
use crate::price_collection::PriceCollection;
use crate::signals::Candidates;

/// Strategy that never trades. Useful for replaying data through the loop.
#[derive(Debug, Clone, Default)]
pub struct NoTrade;

impl Strategy for NoTrade {
    fn name(&self) -> &str {
        "no_trade"
    }

    fn set_param_values(&mut self, _params: &ParamSet) -> Result<(), ParamError> {
        Ok(())
    }

    fn preliminaries(&mut self, _prices: &PriceCollection, _book: &dyn PositionBook) -> bool {
        true
    }

    fn compute_signals(
        &mut self,
        _prices: &PriceCollection,
        _book: &dyn PositionBook,
        _candidates: &mut Candidates,
    ) {
    }
}
