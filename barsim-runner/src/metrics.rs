//! Performance metrics: pure functions over the closed-transaction ledger.
//!
//! Every metric takes a slice of net P/L values (in ledger order) or
//! transactions and returns a scalar. Drawdowns are measured on the
//! cumulative P/L curve, one point per closed trade.

use barsim_core::domain::{Side, Transaction};
use serde::{Deserialize, Serialize};

/// Profit factor reported when there are wins and no losses.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

/// Fewest trades for which a z-score is reported.
pub const Z_SCORE_MIN_TRADES: usize = 30;

/// Aggregate statistics for one set of trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub trade_count: usize,
    pub win_count: usize,
    pub net_profit: f64,
    /// Net profit as a percentage of the initial balance.
    pub net_profit_pct: f64,
    pub avg_trade: f64,
    pub std_trade: f64,
    /// Mean P/L per contract, in ticks.
    pub avg_ticks: f64,
    pub gross_profit: f64,
    /// Sum of losing trades (negative).
    pub gross_loss: f64,
    pub avg_profit: f64,
    pub avg_loss: f64,
    pub max_profit: f64,
    /// Worst single trade (negative, or 0 without losers).
    pub largest_loss: f64,
    /// Percentage of winning trades.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub expectancy: f64,
    /// Deepest drop of cumulative P/L from its running peak (negative).
    pub max_drawdown: f64,
    /// Same drop relative to balance at the peak, in percent (negative).
    pub max_drawdown_pct: f64,
    pub avg_drawdown: f64,
    /// Net profit over |max drawdown|.
    pub net_profit_to_drawdown: f64,
    /// sqrt(n) * avg / std; 0 below [`Z_SCORE_MIN_TRADES`] trades.
    pub z_score: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub avg_bars_in_win: f64,
    pub avg_bars_in_loss: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics for `trades`, ignoring zero-quantity entries.
    pub fn compute<'a>(
        trades: impl IntoIterator<Item = &'a Transaction>,
        initial_balance: f64,
        tick_value: f64,
    ) -> Self {
        let trades: Vec<&Transaction> = trades.into_iter().filter(|t| t.quantity > 0).collect();
        if trades.is_empty() {
            return Self::default();
        }
        let profits: Vec<f64> = trades.iter().map(|t| t.net_pl).collect();

        let win_count = profits.iter().filter(|&&p| p > 0.0).count();
        let loss_count = profits.len() - win_count;
        let gross_profit: f64 = profits.iter().filter(|&&p| p > 0.0).sum();
        let gross_loss: f64 = profits.iter().filter(|&&p| p <= 0.0).sum();
        let net_profit: f64 = profits.iter().sum();
        let dd = drawdowns(&profits, initial_balance);

        let avg_profit = if win_count > 0 {
            gross_profit / win_count as f64
        } else {
            0.0
        };
        let avg_loss = if loss_count > 0 {
            gross_loss / loss_count as f64
        } else {
            0.0
        };
        let win_rate = win_count as f64 / profits.len() as f64 * 100.0;

        let bars_in = |winners: bool, count: usize| {
            if count == 0 {
                return 0.0;
            }
            let total: u32 = trades
                .iter()
                .filter(|t| (t.net_pl > 0.0) == winners && (winners || t.net_pl < 0.0))
                .map(|t| t.bars_in_trade)
                .sum();
            f64::from(total) / count as f64
        };

        Self {
            trade_count: profits.len(),
            win_count,
            net_profit,
            net_profit_pct: if initial_balance > 0.0 {
                net_profit / initial_balance * 100.0
            } else {
                0.0
            },
            avg_trade: mean(&profits),
            std_trade: std_dev(&profits),
            avg_ticks: avg_ticks(&trades, tick_value),
            gross_profit,
            gross_loss,
            avg_profit,
            avg_loss,
            max_profit: profits.iter().copied().fold(0.0, f64::max),
            largest_loss: profits.iter().copied().fold(0.0, f64::min),
            win_rate,
            profit_factor: profit_factor(&profits),
            expectancy: expectancy(avg_profit, avg_loss, win_rate),
            max_drawdown: dd.max,
            max_drawdown_pct: dd.max_pct,
            avg_drawdown: dd.avg,
            net_profit_to_drawdown: if dd.max != 0.0 {
                net_profit / dd.max.abs()
            } else {
                0.0
            },
            z_score: z_score(&profits),
            max_consecutive_wins: max_streak(&profits, true),
            max_consecutive_losses: max_streak(&profits, false),
            avg_bars_in_win: bars_in(true, win_count),
            avg_bars_in_loss: bars_in(false, loss_count),
        }
    }
}

/// Metrics for all trades and for each side separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub all: PerformanceMetrics,
    pub long: PerformanceMetrics,
    pub short: PerformanceMetrics,
}

impl PerformanceReport {
    pub fn compute(transactions: &[Transaction], initial_balance: f64, tick_value: f64) -> Self {
        let side = |s: Side| {
            PerformanceMetrics::compute(
                transactions.iter().filter(move |t| t.side == s),
                initial_balance,
                tick_value,
            )
        };
        Self {
            all: PerformanceMetrics::compute(transactions, initial_balance, tick_value),
            long: side(Side::Long),
            short: side(Side::Short),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0.0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Gross profit over |gross loss|, capped at [`PROFIT_FACTOR_CAP`].
pub fn profit_factor(profits: &[f64]) -> f64 {
    let gross_profit: f64 = profits.iter().filter(|&&p| p > 0.0).sum();
    let gross_loss: f64 = profits.iter().filter(|&&p| p < 0.0).map(|p| p.abs()).sum();
    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 {
            PROFIT_FACTOR_CAP
        } else {
            0.0
        };
    }
    (gross_profit / gross_loss).min(PROFIT_FACTOR_CAP)
}

/// Statistical significance of the mean trade.
pub fn z_score(profits: &[f64]) -> f64 {
    let std = std_dev(profits);
    if profits.len() < Z_SCORE_MIN_TRADES || std <= 0.0 {
        return 0.0;
    }
    (profits.len() as f64).sqrt() * mean(profits) / std
}

/// Win-rate weighted payoff in units of the average loss.
pub fn expectancy(avg_profit: f64, avg_loss: f64, win_rate_pct: f64) -> f64 {
    if avg_loss >= 0.0 {
        return 0.0;
    }
    let p = win_rate_pct / 100.0;
    (avg_profit * p - avg_loss.abs() * (1.0 - p)) / avg_loss.abs()
}

/// Mean of P/L per contract expressed in ticks.
pub fn avg_ticks(trades: &[&Transaction], tick_value: f64) -> f64 {
    if trades.is_empty() || tick_value <= 0.0 {
        return 0.0;
    }
    let ticks: Vec<f64> = trades
        .iter()
        .map(|t| t.net_pl / f64::from(t.quantity) / tick_value)
        .collect();
    mean(&ticks)
}

/// Longest run of winning (`winners`) or non-winning trades.
pub fn max_streak(profits: &[f64], winners: bool) -> usize {
    let mut best = 0;
    let mut run = 0;
    for &p in profits {
        if (p > 0.0) == winners {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Drawdowns {
    pub max: f64,
    pub max_pct: f64,
    pub avg: f64,
}

/// Drawdowns of the cumulative P/L curve. The curve starts at 0, so a
/// losing first trade is already a drawdown.
pub fn drawdowns(profits: &[f64], initial_balance: f64) -> Drawdowns {
    if profits.is_empty() {
        return Drawdowns::default();
    }
    let mut cumulative = 0.0;
    let mut peak = 0.0_f64;
    let mut out = Drawdowns::default();
    let mut sum = 0.0;

    for &p in profits {
        cumulative += p;
        peak = peak.max(cumulative);
        let dd = cumulative - peak;
        sum += dd;
        out.max = out.max.min(dd);
        let peak_balance = initial_balance + peak;
        if peak_balance > 0.0 {
            let pct = ((initial_balance + cumulative) / peak_balance - 1.0) * 100.0;
            out.max_pct = out.max_pct.min(pct);
        }
    }
    out.avg = sum / profits.len() as f64;
    out
}
