//! Serializable run configuration, loaded from TOML.
//!
//! ```toml
//! strategy = "session_breakout"
//! instrument = "GC"
//! timeframe = "M60"
//! sizing = "fixed_size"
//! seed = 7
//!
//! [params]
//! fractN = 3
//! stop_loss = 500
//! ```
//!
//! `instrument` is either a symbol from the built-in table or an inline
//! table with the full contract specification. An optional
//! `[param_ranges]` table feeds the parameter sweep:
//!
//! ```toml
//! [param_ranges]
//! fractN = [1, 2, 3]
//! stop_loss = { start = 300, stop = 900, step = 300 }
//! ```

use barsim_core::domain::{Instrument, InstrumentError, Timeframe};
use barsim_core::engine::BacktestConfig;
use barsim_core::sizers::SizingMode;
use barsim_core::strategy::ParamSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sweep::ParamRange;

/// Errors from loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Instrument given by symbol or spelled out in full.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InstrumentSpec {
    Symbol(String),
    Custom(Instrument),
}

impl InstrumentSpec {
    pub fn resolve(&self) -> Result<Instrument, InstrumentError> {
        let instrument = match self {
            InstrumentSpec::Symbol(symbol) => Instrument::from_symbol(symbol)?,
            InstrumentSpec::Custom(instrument) => instrument.clone(),
        };
        instrument.validate()?;
        Ok(instrument)
    }

    pub fn symbol(&self) -> &str {
        match self {
            InstrumentSpec::Symbol(symbol) => symbol,
            InstrumentSpec::Custom(instrument) => &instrument.symbol,
        }
    }
}

/// Everything needed to reproduce one backtest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub strategy: String,
    pub instrument: InstrumentSpec,
    pub timeframe: Timeframe,

    #[serde(default = "default_max_bars_back")]
    pub max_bars_back: usize,

    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,

    #[serde(default = "default_sizing")]
    pub sizing: SizingMode,

    #[serde(default = "default_num_contracts")]
    pub num_contracts: u32,

    #[serde(default = "default_risk_fraction")]
    pub risk_fraction: f64,

    #[serde(default)]
    pub include_commissions: bool,

    #[serde(default)]
    pub slippage_ticks: u32,

    #[serde(default)]
    pub random_noise: bool,

    #[serde(default)]
    pub seed: u64,

    /// Strategy parameters by name.
    #[serde(default)]
    pub params: BTreeMap<String, i64>,

    /// Values to sweep per parameter; override `params` during a sweep.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub param_ranges: BTreeMap<String, ParamRange>,
}

fn default_max_bars_back() -> usize {
    100
}

fn default_initial_balance() -> f64 {
    100_000.0
}

fn default_sizing() -> SizingMode {
    SizingMode::FixedSize
}

fn default_num_contracts() -> u32 {
    1
}

fn default_risk_fraction() -> f64 {
    0.1
}

impl RunConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Content hash of this configuration.
    ///
    /// Two identical configs share the same id; any changed field changes it.
    pub fn run_id(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub fn param_set(&self) -> ParamSet {
        self.params
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect()
    }

    /// Validate and convert into the engine's configuration.
    pub fn into_backtest_config(&self) -> Result<BacktestConfig, ConfigError> {
        if self.strategy.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "strategy",
                reason: "must not be empty".into(),
            });
        }
        if self.max_bars_back == 0 {
            return Err(ConfigError::Invalid {
                field: "max_bars_back",
                reason: "must be > 0".into(),
            });
        }
        if !(self.initial_balance.is_finite() && self.initial_balance > 0.0) {
            return Err(ConfigError::Invalid {
                field: "initial_balance",
                reason: format!("must be > 0 (got {})", self.initial_balance),
            });
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "risk_fraction",
                reason: format!("must be in (0, 1] (got {})", self.risk_fraction),
            });
        }

        Ok(BacktestConfig {
            strategy: self.strategy.clone(),
            instrument: self.instrument.resolve()?,
            timeframe: self.timeframe,
            max_bars_back: self.max_bars_back,
            initial_balance: self.initial_balance,
            sizing_mode: self.sizing,
            num_contracts: self.num_contracts,
            risk_fraction: self.risk_fraction,
            include_commissions: self.include_commissions,
            slippage_ticks: self.slippage_ticks,
            random_noise: self.random_noise,
            seed: self.seed,
            params: self.param_set(),
        })
    }
}
