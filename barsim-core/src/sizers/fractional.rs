use super::{nearest_int, Sizer};
use crate::portfolio::AccountSnapshot;

/// Risk a fraction of the current balance against the largest loss so far.
///
/// `max(1, round(risk_fraction * balance / |largest_loss|))`; the configured
/// count is used until a losing trade has been recorded.
#[derive(Debug, Clone, Copy)]
pub struct FixedFractional {
    num_contracts: i64,
    risk_fraction: f64,
}

impl FixedFractional {
    pub fn new(num_contracts: i64, risk_fraction: f64) -> Self {
        Self {
            num_contracts,
            risk_fraction,
        }
    }
}

impl Sizer for FixedFractional {
    fn contracts(&self, _price: f64, account: &AccountSnapshot) -> i64 {
        if account.largest_loss == 0.0 {
            return self.num_contracts;
        }
        nearest_int(self.risk_fraction * account.balance / account.largest_loss.abs()).max(1)
    }

    fn name(&self) -> &str {
        "fixed_fractional"
    }
}
