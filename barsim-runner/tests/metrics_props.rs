//! Property tests for the metric functions.

use barsim_runner::metrics::{drawdowns, max_streak, profit_factor, std_dev};
use proptest::prelude::*;

fn profits() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-5_000.0..5_000.0_f64, 0..60)
}

proptest! {
    #[test]
    fn drawdown_never_positive(p in profits()) {
        let dd = drawdowns(&p, 100_000.0);
        prop_assert!(dd.max <= 0.0);
        prop_assert!(dd.max_pct <= 0.0);
        prop_assert!(dd.avg >= dd.max - 1e-9);
    }

    #[test]
    fn max_drawdown_bounded_by_total_losses(p in profits()) {
        let losses: f64 = p.iter().filter(|&&x| x < 0.0).sum();
        prop_assert!(drawdowns(&p, 100_000.0).max >= losses - 1e-9);
    }

    #[test]
    fn profit_factor_in_range(p in profits()) {
        let pf = profit_factor(&p);
        prop_assert!((0.0..=100.0).contains(&pf));
    }

    #[test]
    fn streaks_fit_in_sample(p in profits()) {
        let wins = max_streak(&p, true);
        let losses = max_streak(&p, false);
        prop_assert!(wins + losses <= p.len());
        prop_assert!(std_dev(&p) >= 0.0);
    }
}
