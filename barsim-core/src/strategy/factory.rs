//! Strategy registry: name to boxed [`Strategy`].

use super::{NoTrade, SessionBreakout, Strategy};
use crate::domain::{Instrument, Timeframe};
use thiserror::Error;

/// Names accepted by [`create_strategy`].
pub const STRATEGY_NAMES: &[&str] = &["no_trade", "session_breakout"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("strategy '{strategy}' does not support timeframe {timeframe}")]
    UnsupportedTimeframe { strategy: String, timeframe: Timeframe },
}

/// Instantiate a registered strategy.
pub fn create_strategy(
    name: &str,
    instrument: &Instrument,
    timeframe: Timeframe,
    max_bars_back: usize,
) -> Result<Box<dyn Strategy>, FactoryError> {
    match name {
        "no_trade" => Ok(Box::new(NoTrade)),
        "session_breakout" => {
            let strategy = SessionBreakout::new(instrument.clone(), timeframe, max_bars_back)
                .ok_or_else(|| FactoryError::UnsupportedTimeframe {
                    strategy: name.to_string(),
                    timeframe,
                })?;
            Ok(Box::new(strategy))
        }
        other => Err(FactoryError::UnknownStrategy(other.to_string())),
    }
}
