//! Does a bar trigger a pending signal?
//!
//! Stops and limits are evaluated against the bar's open first (gap-through
//! fills at the open), then against the high/low range.

use crate::domain::{Bar, OrderKind, Signal};

/// Result of checking a pending signal against a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerResult {
    NoTrigger,
    /// Signal triggers; `gap_through` is set when the open was already past the level.
    Fill { fill_price: f64, gap_through: bool },
}

impl TriggerResult {
    pub fn is_triggered(&self) -> bool {
        matches!(self, TriggerResult::Fill { .. })
    }

    pub fn fill_price(&self) -> Option<f64> {
        match self {
            TriggerResult::Fill { fill_price, .. } => Some(*fill_price),
            TriggerResult::NoTrigger => None,
        }
    }
}

/// Check whether `bar` triggers `signal` and at which raw price.
///
/// Buy-side actions (`Buy`, `BuyToCover`) use buy-stop/buy-limit rules;
/// sell-side actions (`SellShort`, `Sell`) the mirrored ones.
pub fn is_triggered(bar: &Bar, signal: &Signal) -> TriggerResult {
    if bar.is_void() {
        return TriggerResult::NoTrigger;
    }
    let level = signal.level;
    let buy_side = signal.action.is_buy_side();

    match signal.kind {
        OrderKind::Market => TriggerResult::Fill {
            fill_price: bar.open,
            gap_through: false,
        },
        OrderKind::Stop if buy_side => rising_through(bar, level),
        OrderKind::Stop => falling_through(bar, level),
        OrderKind::Limit if buy_side => falling_through(bar, level),
        OrderKind::Limit => rising_through(bar, level),
    }
}

/// Price trades at or above `level`.
fn rising_through(bar: &Bar, level: f64) -> TriggerResult {
    if bar.open >= level {
        TriggerResult::Fill {
            fill_price: bar.open,
            gap_through: true,
        }
    } else if bar.high >= level {
        TriggerResult::Fill {
            fill_price: level,
            gap_through: false,
        }
    } else {
        TriggerResult::NoTrigger
    }
}

/// Price trades at or below `level`.
fn falling_through(bar: &Bar, level: f64) -> TriggerResult {
    if bar.open <= level {
        TriggerResult::Fill {
            fill_price: bar.open,
            gap_through: true,
        }
    } else if bar.low <= level {
        TriggerResult::Fill {
            fill_price: level,
            gap_through: false,
        }
    } else {
        TriggerResult::NoTrigger
    }
}
