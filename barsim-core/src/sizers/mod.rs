//! Position sizing: number of contracts for an entry order.
//!
//! A [`Sizer`] turns a price and an account snapshot into a raw contract
//! count. [`PositionSizer`] wraps the configured sizer and applies the
//! signal's position-size factor.

pub mod fixed;
pub mod fractional;

pub use fixed::{FixedNotional, FixedSize};
pub use fractional::FixedFractional;

use crate::domain::Instrument;
use crate::portfolio::AccountSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    #[error("position sizing mode '{0}' not recognized (expected fixed_size, fixed_notional or fixed_fractional)")]
    UnknownMode(String),
}

/// Money-management mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SizingMode {
    FixedSize,
    FixedNotional,
    FixedFractional,
}

impl FromStr for SizingMode {
    type Err = SizingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fixed_size" => Ok(SizingMode::FixedSize),
            "fixed_notional" => Ok(SizingMode::FixedNotional),
            "fixed_fractional" => Ok(SizingMode::FixedFractional),
            other => Err(SizingError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for SizingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SizingMode::FixedSize => "fixed_size",
            SizingMode::FixedNotional => "fixed_notional",
            SizingMode::FixedFractional => "fixed_fractional",
        })
    }
}

impl TryFrom<String> for SizingMode {
    type Error = SizingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SizingMode> for String {
    fn from(mode: SizingMode) -> Self {
        mode.to_string()
    }
}

/// Contract count before the position-size factor is applied.
pub trait Sizer: Send + Sync + fmt::Debug {
    fn contracts(&self, price: f64, account: &AccountSnapshot) -> i64;

    /// Sizer name for logging
    fn name(&self) -> &str;
}

/// Configured sizer plus factor scaling.
#[derive(Debug)]
pub struct PositionSizer {
    inner: Box<dyn Sizer>,
}

impl PositionSizer {
    pub fn new(
        mode: SizingMode,
        instrument: &Instrument,
        num_contracts: u32,
        risk_fraction: f64,
    ) -> Self {
        let num_contracts = i64::from(num_contracts);
        let inner: Box<dyn Sizer> = match mode {
            SizingMode::FixedSize => Box::new(FixedSize::new(num_contracts)),
            SizingMode::FixedNotional => Box::new(FixedNotional::new(
                instrument.contract_unit,
                num_contracts,
                risk_fraction,
            )),
            SizingMode::FixedFractional => {
                Box::new(FixedFractional::new(num_contracts, risk_fraction))
            }
        };
        Self { inner }
    }

    /// Number of contracts for an entry at `price`.
    ///
    /// The raw count is scaled by `size_factor` and rounded half away from
    /// zero. Non-positive results come back as 0.
    pub fn compute_quantity(&self, price: f64, size_factor: f64, account: &AccountSnapshot) -> u32 {
        let raw = self.inner.contracts(price, account) as f64;
        let scaled = (raw * size_factor).round();
        if scaled.is_nan() || scaled <= 0.0 {
            0
        } else {
            scaled.min(f64::from(u32::MAX)) as u32
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Round half away from zero to an integer contract count.
pub(crate) fn nearest_int(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}
