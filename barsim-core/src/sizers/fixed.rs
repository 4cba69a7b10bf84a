//! Fixed sizers: a constant contract count or a constant share of capital.

use super::{nearest_int, Sizer};
use crate::portfolio::AccountSnapshot;

/// Always trade the configured number of contracts.
#[derive(Debug, Clone, Copy)]
pub struct FixedSize {
    num_contracts: i64,
}

impl FixedSize {
    pub fn new(num_contracts: i64) -> Self {
        Self { num_contracts }
    }
}

impl Sizer for FixedSize {
    fn contracts(&self, _price: f64, _account: &AccountSnapshot) -> i64 {
        self.num_contracts
    }

    fn name(&self) -> &str {
        "fixed_size"
    }
}

/// Commit a fixed fraction of the initial balance at the contract notional.
///
/// `max(1, round(initial_balance * risk_fraction / (contract_unit * price)))`;
/// falls back to the configured count when the notional is zero.
#[derive(Debug, Clone, Copy)]
pub struct FixedNotional {
    contract_unit: f64,
    num_contracts: i64,
    risk_fraction: f64,
}

impl FixedNotional {
    pub fn new(contract_unit: f64, num_contracts: i64, risk_fraction: f64) -> Self {
        Self {
            contract_unit,
            num_contracts,
            risk_fraction,
        }
    }
}

impl Sizer for FixedNotional {
    fn contracts(&self, price: f64, account: &AccountSnapshot) -> i64 {
        let value_at_risk = account.initial_balance * self.risk_fraction;
        let notional = self.contract_unit * price;
        if notional == 0.0 {
            return self.num_contracts;
        }
        nearest_int(value_at_risk / notional).max(1)
    }

    fn name(&self) -> &str {
        "fixed_notional"
    }
}
