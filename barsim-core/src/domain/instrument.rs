use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contract specification and trading session of a futures instrument.
///
/// Session times are exchange times. A session whose open is later than its
/// close spans two calendar days (e.g. 18:00 to 17:00 next day).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    /// Size of one contract in units of the underlying.
    pub contract_unit: f64,
    pub margin: f64,
    /// Round-turn commission per contract.
    pub commission: f64,
    pub tick_size: f64,
    /// Value of one tick per contract.
    pub tick_value: f64,
    pub session_open: NaiveTime,
    pub session_close: NaiveTime,
    pub settlement: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstrumentError {
    #[error("unknown instrument symbol '{0}'")]
    UnknownSymbol(String),

    #[error("instrument {symbol}: tick_size must be > 0 (got {tick_size})")]
    InvalidTickSize { symbol: String, tick_size: f64 },
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

impl Instrument {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        contract_unit: f64,
        margin: f64,
        commission: f64,
        tick_size: f64,
        tick_value: f64,
        session_open: NaiveTime,
        session_close: NaiveTime,
        settlement: NaiveTime,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            contract_unit,
            margin,
            commission,
            tick_size,
            tick_value,
            session_open,
            session_close,
            settlement,
        }
    }

    /// Look up a contract from the built-in table.
    pub fn from_symbol(symbol: &str) -> Result<Self, InstrumentError> {
        let inst = match symbol {
            // Soybean Oil - CBOT
            "BO" => Self::new("BO", 60_000.0, 848.0, 3.0, 0.01, 6.0, hm(19, 0), hm(13, 20), hm(13, 15)),
            // Corn - CBOT
            "C" => Self::new("C", 5_000.0, 990.0, 3.0, 0.25, 12.5, hm(19, 0), hm(13, 20), hm(13, 15)),
            // E-mini EUR/USD - CME
            "E7" => Self::new("E7", 62_500.0, 1252.0, 3.0, 0.0001, 6.25, hm(17, 0), hm(16, 0), hm(14, 0)),
            // Gold - COMEX
            "GC" => Self::new("GC", 100.0, 6600.0, 3.0, 0.1, 10.0, hm(18, 0), hm(17, 0), hm(13, 30)),
            // Natural Gas (Henry Hub) - NYMEX
            "NG" => Self::new("NG", 10_000.0, 2200.0, 3.0, 0.001, 10.0, hm(18, 0), hm(17, 0), hm(14, 30)),
            // E-mini Russell 2000 - CME
            "RTY" => Self::new("RTY", 50.0, 6380.0, 3.0, 0.1, 5.0, hm(17, 0), hm(16, 0), hm(14, 30)),
            // Wheat (SRW) - CBOT
            "W" => Self::new("W", 5_000.0, 1375.0, 3.0, 0.25, 12.5, hm(19, 0), hm(13, 20), hm(13, 15)),
            other => return Err(InstrumentError::UnknownSymbol(other.to_string())),
        };
        Ok(inst)
    }

    pub fn validate(&self) -> Result<(), InstrumentError> {
        if self.tick_size.is_nan() || self.tick_size <= 0.0 {
            return Err(InstrumentError::InvalidTickSize {
                symbol: self.symbol.clone(),
                tick_size: self.tick_size,
            });
        }
        Ok(())
    }

    /// Whether the session spans two calendar days.
    pub fn two_days_session(&self) -> bool {
        self.session_open > self.session_close
    }

    /// Market value of a full point move per contract.
    pub fn big_point_value(&self) -> f64 {
        self.tick_value / self.tick_size
    }

    /// Round-turn commission plus two ticks of slippage, per contract.
    pub fn transaction_cost(&self) -> f64 {
        self.commission + 2.0 * self.tick_value
    }

    /// Number of decimal digits of the tick size.
    pub fn digits(&self) -> u32 {
        let mut frac = self.tick_size.abs().fract();
        let mut count = 0;
        while frac.abs() >= 1e-7 && count < 10 {
            frac = (frac * 10.0).fract();
            // absorb binary representation noise (0.1 * 10 = 0.9999..)
            if (1.0 - frac).abs() < 1e-7 {
                frac = 0.0;
            }
            count += 1;
        }
        count
    }

    /// Whether a bar closing at `close_time` belongs to the open session.
    ///
    /// The session open instant itself is excluded: a bar closing exactly at
    /// the open belongs to the previous session.
    pub fn session_window_contains(&self, close_time: NaiveTime) -> bool {
        if self.two_days_session() {
            close_time > self.session_open || close_time <= self.session_close
        } else {
            close_time > self.session_open && close_time <= self.session_close
        }
    }
}
