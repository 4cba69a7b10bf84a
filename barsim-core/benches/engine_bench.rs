//! Criterion benchmarks for Barsim hot paths.
//!
//! Benchmarks:
//! 1. Dispatch loop (full backtest over hourly bars)
//! 2. Price collection updates with session-bar synthesis
//! 3. Trigger checks against a bar
//! 4. Simulated execution of a batch of orders

use barsim_core::domain::{Action, Bar, Instrument, Order, OrderKind, Signal, Ticket, Timeframe};
use barsim_core::engine::{BacktestConfig, EventQueue};
use barsim_core::execution::SimulatedExecution;
use barsim_core::price_collection::PriceCollection;
use barsim_core::run_backtest;
use barsim_core::signals::is_triggered;
use barsim_core::strategy::ParamSet;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ──────────────────────────────────────────────────────────

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 6)
        .unwrap()
        .and_hms_opt(19, 0, 0)
        .unwrap()
}

fn make_bars(n: usize) -> Vec<Bar> {
    let mut ts = start();
    let mut bars = Vec::with_capacity(n);
    let mut i = 0usize;
    while bars.len() < n {
        if ts.hour() != 18 {
            let close = 1800.0 + (i as f64 * 0.1).sin() * 10.0;
            let open = close - 0.3;
            bars.push(Bar::new("GC", ts, Timeframe::Minutes(60), open, close + 1.5, close - 1.5, close, 1_000));
            i += 1;
        }
        ts += Duration::hours(1);
    }
    bars
}

fn gc() -> Instrument {
    Instrument::from_symbol("GC").unwrap()
}

// ── 1. Dispatch loop ─────────────────────────────────────────────────

fn bench_dispatch_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_loop");

    for n in [1_000usize, 10_000] {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::new("session_breakout", n), &bars, |b, bars| {
            b.iter(|| {
                let config = BacktestConfig::new("session_breakout", gc(), Timeframe::Minutes(60))
                    .with_params(ParamSet::new().with("fractN", 3).with("stop_loss", 500));
                let summary = run_backtest(config, bars.clone()).unwrap();
                black_box(summary.final_balance)
            })
        });
    }

    let bars = make_bars(10_000);
    group.bench_function("no_trade_noise_10000", |b| {
        b.iter(|| {
            let mut config = BacktestConfig::new("no_trade", gc(), Timeframe::Minutes(60))
                .with_params(ParamSet::new().with("unused", 0));
            config.random_noise = true;
            black_box(run_backtest(config, bars.clone()).unwrap().bar_count)
        })
    });

    group.finish();
}

// ── 2. Price collection ──────────────────────────────────────────────

fn bench_price_collection(c: &mut Criterion) {
    let bars = make_bars(5_000);
    c.bench_function("price_collection_5000", |b| {
        b.iter(|| {
            let mut pc = PriceCollection::new(gc(), Timeframe::Minutes(60), 100, false);
            let mut rng = StdRng::seed_from_u64(0);
            for bar in &bars {
                let mut bar = bar.clone();
                pc.on_bar(&mut bar, &mut rng);
            }
            black_box(pc.session_bars().len())
        })
    });
}

// ── 3. Trigger checks ────────────────────────────────────────────────

fn bench_trigger(c: &mut Criterion) {
    let bars = make_bars(1_000);
    let signals: Vec<Signal> = [
        (Action::Buy, OrderKind::Stop),
        (Action::SellShort, OrderKind::Stop),
        (Action::Buy, OrderKind::Limit),
        (Action::Sell, OrderKind::Limit),
    ]
    .into_iter()
    .map(|(action, kind)| Signal::entry("GC", start(), action, kind, 1800.0, "bench"))
    .collect();

    c.bench_function("trigger_4x1000", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for bar in &bars {
                for signal in &signals {
                    if is_triggered(black_box(bar), signal).is_triggered() {
                        hits += 1;
                    }
                }
            }
            black_box(hits)
        })
    });
}

// ── 4. Execution ─────────────────────────────────────────────────────

fn bench_execution(c: &mut Criterion) {
    let exec = SimulatedExecution::new(gc(), true, 2);
    let order = Order {
        symbol: "GC".into(),
        timestamp: start(),
        action: Action::Buy,
        kind: OrderKind::Stop,
        suggested_price: 1800.0,
        quantity: 2,
        strategy: "bench".into(),
        stop_loss: 0.0,
        take_profit: 0.0,
        ticket: Ticket::NONE,
    };

    c.bench_function("execution_100_orders", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            let mut queue = EventQueue::new();
            for _ in 0..100 {
                exec.on_order(&order, &mut rng, &mut queue).unwrap();
            }
            black_box(queue.len())
        })
    });
}

criterion_group!(
    benches,
    bench_dispatch_loop,
    bench_price_collection,
    bench_trigger,
    bench_execution
);
criterion_main!(benches);
