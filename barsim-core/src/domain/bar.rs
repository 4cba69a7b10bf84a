//! OHLCV bars and their timeframes.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bar timeframe: intraday minutes (`M15`) or a whole session (`D`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    Minutes(u32),
    Daily,
}

impl Timeframe {
    pub fn is_intraday(&self) -> bool {
        matches!(self, Timeframe::Minutes(_))
    }

    /// Time covered by one bar. Session bars have no fixed duration.
    pub fn bar_duration(&self) -> Option<Duration> {
        match self {
            Timeframe::Minutes(mins) => Some(Duration::minutes(i64::from(*mins))),
            Timeframe::Daily => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeframeError {
    #[error("invalid timeframe '{0}' (expected 'D' or 'M<minutes>')")]
    Invalid(String),
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "D" {
            return Ok(Timeframe::Daily);
        }
        trimmed
            .strip_prefix('M')
            .and_then(|mins| mins.parse::<u32>().ok())
            .filter(|mins| *mins > 0 && *mins < 24 * 60)
            .map(Timeframe::Minutes)
            .ok_or_else(|| TimeframeError::Invalid(s.to_string()))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = TimeframeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.to_string()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Minutes(mins) => write!(f, "M{mins}"),
            Timeframe::Daily => write!(f, "D"),
        }
    }
}

/// OHLCV bar for a single symbol and timeframe.
///
/// `timestamp` is the exchange time at which the bar closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub timeframe: Timeframe,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        timestamp: NaiveDateTime,
        timeframe: Timeframe,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            timeframe,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// OHLC sanity: high >= max(open, close), low <= min(open, close).
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Replace OHLC with new values, then restore high/low as the max/min of all four.
    pub fn reorder_ohlc(&mut self, open: f64, high: f64, low: f64, close: f64) {
        self.open = open;
        self.close = close;
        self.high = open.max(high).max(low).max(close);
        self.low = open.min(high).min(low).min(close);
    }
}
