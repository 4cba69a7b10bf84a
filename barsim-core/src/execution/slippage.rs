//! Slippage models: random offset added to the suggested price.

use rand::{Rng, RngCore};
use std::fmt::Debug;

/// Price offset applied to every fill.
pub trait SlippageModel: Send + Sync + Debug {
    /// Signed offset in price units (positive = filled higher).
    fn offset(&self, tick_size: f64, rng: &mut dyn RngCore) -> f64;

    /// Name of this model
    fn name(&self) -> &str;
}

/// No slippage: fills happen at the suggested price.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSlippage;

impl SlippageModel for NoSlippage {
    fn offset(&self, _tick_size: f64, _rng: &mut dyn RngCore) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        "NoSlippage"
    }
}

/// Uniform integer number of ticks in `[-ticks, +ticks]`.
#[derive(Debug, Clone, Copy)]
pub struct TickSlippage {
    pub ticks: u32,
}

impl TickSlippage {
    pub fn new(ticks: u32) -> Self {
        Self { ticks }
    }
}

impl SlippageModel for TickSlippage {
    fn offset(&self, tick_size: f64, rng: &mut dyn RngCore) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        let span = i64::from(self.ticks);
        let n = rng.gen_range(-span..=span);
        n as f64 * tick_size
    }

    fn name(&self) -> &str {
        "TickSlippage"
    }
}

/// Pick the model for a configured tick count.
pub fn slippage_for_ticks(ticks: u32) -> Box<dyn SlippageModel> {
    if ticks == 0 {
        Box::new(NoSlippage)
    } else {
        Box::new(TickSlippage::new(ticks))
    }
}
