//! Event-driven dispatch loop.
//!
//! The loop has two steady states. With an empty queue it asks the feed for
//! the next bar; otherwise it pops one event and routes it:
//!
//! - `Bar`: counters, price collection, position book, strategy, signal handler
//! - `Order`: simulated execution
//! - `Fill`: position book
//!
//! A new bar is requested only after every order and fill caused by the
//! previous one has been processed.

use super::queue::EventQueue;
use crate::domain::{Bar, Event, Instrument, InstrumentError, Timeframe, Transaction};
use crate::execution::{ExecutionError, SimulatedExecution};
use crate::feed::{DataFeed, HistoricalFeed};
use crate::portfolio::{PortfolioError, PositionBook, PositionHandler};
use crate::price_collection::PriceCollection;
use crate::signals::{Candidates, SignalHandler};
use crate::sizers::{PositionSizer, SizingError, SizingMode};
use crate::strategy::{create_strategy, FactoryError, ParamError, ParamSet, Strategy};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

/// Everything needed to set up one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub strategy: String,
    pub instrument: Instrument,
    pub timeframe: Timeframe,
    pub max_bars_back: usize,
    pub initial_balance: f64,
    pub sizing_mode: SizingMode,
    pub num_contracts: u32,
    pub risk_fraction: f64,
    pub include_commissions: bool,
    pub slippage_ticks: u32,
    pub random_noise: bool,
    pub seed: u64,
    pub params: ParamSet,
}

impl BacktestConfig {
    /// Config with default money management and no parameters.
    pub fn new(strategy: impl Into<String>, instrument: Instrument, timeframe: Timeframe) -> Self {
        Self {
            strategy: strategy.into(),
            instrument,
            timeframe,
            max_bars_back: 100,
            initial_balance: 100_000.0,
            sizing_mode: SizingMode::FixedSize,
            num_contracts: 1,
            risk_fraction: 0.1,
            include_commissions: false,
            slippage_ticks: 0,
            random_noise: false,
            seed: 0,
            params: ParamSet::new(),
        }
    }

    pub fn with_params(mut self, params: ParamSet) -> Self {
        self.params = params;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Sizing(#[from] SizingError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    #[error("strategy '{0}' received an empty parameter set")]
    EmptyParameters(String),

    #[error("max_bars_back must be > 0")]
    ZeroHistory,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub strategy: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bar_count: usize,
    pub day_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub transactions: Vec<Transaction>,
}

impl RunSummary {
    pub fn net_profit(&self) -> f64 {
        self.final_balance - self.initial_balance
    }
}

/// One backtest run over a data feed.
pub struct Backtest<F: DataFeed, B: PositionBook = PositionHandler> {
    config: BacktestConfig,
    feed: F,
    book: B,
    queue: EventQueue,
    rng: StdRng,
    prices: PriceCollection,
    signals: SignalHandler,
    execution: SimulatedExecution,
    strategy: Option<Box<dyn Strategy>>,
    initialized: bool,
    bar_count: usize,
    day_count: usize,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    last_bar: Option<Bar>,
}

impl<F: DataFeed> Backtest<F, PositionHandler> {
    pub fn new(config: BacktestConfig, feed: F) -> Self {
        let book = PositionHandler::new(config.instrument.clone(), config.initial_balance);
        Self::with_position_book(config, feed, book)
    }
}

impl<F: DataFeed, B: PositionBook> Backtest<F, B> {
    pub fn with_position_book(config: BacktestConfig, feed: F, book: B) -> Self {
        let instrument = config.instrument.clone();
        let sizer = PositionSizer::new(
            config.sizing_mode,
            &instrument,
            config.num_contracts,
            config.risk_fraction,
        );
        Self {
            prices: PriceCollection::new(
                instrument.clone(),
                config.timeframe,
                config.max_bars_back,
                config.random_noise,
            ),
            signals: SignalHandler::new(instrument.clone(), sizer),
            execution: SimulatedExecution::new(
                instrument,
                config.include_commissions,
                config.slippage_ticks,
            ),
            rng: StdRng::seed_from_u64(config.seed),
            queue: EventQueue::new(),
            strategy: None,
            initialized: false,
            bar_count: 0,
            day_count: 0,
            first_date: None,
            last_date: None,
            last_bar: None,
            config,
            feed,
            book,
        }
    }

    /// Use `strategy` instead of looking `config.strategy` up in the factory.
    pub fn with_strategy(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Reset the histories, open the feed and load the strategy.
    pub fn initialize(&mut self) -> Result<(), BacktestError> {
        self.config.instrument.validate()?;
        if self.config.max_bars_back == 0 {
            return Err(BacktestError::ZeroHistory);
        }
        self.prices.clear_bars();
        self.signals.clear();
        self.queue.clear();
        self.feed.open_data_connection();

        let mut strategy = match self.strategy.take() {
            Some(strategy) => strategy,
            None => create_strategy(
                &self.config.strategy,
                &self.config.instrument,
                self.config.timeframe,
                self.config.max_bars_back,
            )?,
        };
        if self.config.params.is_empty() {
            return Err(BacktestError::EmptyParameters(strategy.name().to_string()));
        }
        strategy.set_param_values(&self.config.params)?;
        self.strategy = Some(strategy);
        self.initialized = true;
        Ok(())
    }

    /// Replay the feed to exhaustion, then close all positions at the last bar.
    pub fn run(&mut self) -> Result<RunSummary, BacktestError> {
        if !self.initialized {
            if let Err(e) = self.initialize() {
                error!(error = %e, strategy = %self.config.strategy, "backtest initialization failed");
                return Err(e);
            }
        }
        info!(
            strategy = %self.config.strategy,
            symbol = %self.config.instrument.symbol,
            timeframe = %self.config.timeframe,
            "backtest started"
        );

        while self.feed.continue_parsing() {
            match self.queue.pop() {
                None => self.feed.stream_next_bar(&mut self.queue),
                Some(event) => {
                    if let Err(e) = self.dispatch(event) {
                        error!(error = %e, bar = self.bar_count, "backtest aborted");
                        self.feed.close_data_connection();
                        return Err(e);
                    }
                }
            }
        }

        if let Some(bar) = &self.last_bar {
            self.book.close_all_positions(bar);
        }
        self.feed.close_data_connection();

        let summary = self.summary();
        info!(
            bars = summary.bar_count,
            days = summary.day_count,
            trades = summary.transactions.len(),
            net_profit = summary.net_profit(),
            "backtest finished"
        );
        Ok(summary)
    }

    fn dispatch(&mut self, event: Event) -> Result<(), BacktestError> {
        match event {
            Event::Bar(bar) => self.on_bar(bar),
            Event::Order(order) => {
                self.execution.on_order(&order, &mut self.rng, &mut self.queue)?;
                Ok(())
            }
            Event::Fill(fill) => {
                self.book.on_fill(&fill)?;
                Ok(())
            }
            Event::None => Ok(()),
        }
    }

    fn on_bar(&mut self, mut bar: Bar) -> Result<(), BacktestError> {
        self.bar_count += 1;
        let date = bar.timestamp.date();
        if self.last_date != Some(date) {
            self.day_count += 1;
        }
        self.first_date.get_or_insert(date);
        self.last_date = Some(date);

        self.prices.on_bar(&mut bar, &mut self.rng);
        self.book.on_bar(&bar, &mut self.queue);

        let mut candidates: Candidates = [None, None];
        if let Some(strategy) = self.strategy.as_mut() {
            if strategy.preliminaries(&self.prices, &self.book) {
                strategy.compute_signals(&self.prices, &self.book, &mut candidates);
            }
        }
        self.signals
            .on_signals(&bar, candidates, &self.book, &mut self.queue);

        debug!(ts = %bar.timestamp, close = bar.close, queued = self.queue.len(), "bar processed");
        self.last_bar = Some(bar);
        Ok(())
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            strategy: self.config.strategy.clone(),
            symbol: self.config.instrument.symbol.clone(),
            timeframe: self.config.timeframe,
            bar_count: self.bar_count,
            day_count: self.day_count,
            first_date: self.first_date,
            last_date: self.last_date,
            initial_balance: self.book.initial_balance(),
            final_balance: self.book.balance(),
            transactions: self.book.transactions().to_vec(),
        }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn prices(&self) -> &PriceCollection {
        &self.prices
    }

    pub fn signal_handler(&self) -> &SignalHandler {
        &self.signals
    }

    pub fn position_book(&self) -> &B {
        &self.book
    }

    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    pub fn day_count(&self) -> usize {
        self.day_count
    }
}

/// Run one backtest over in-memory bars.
pub fn run_backtest(config: BacktestConfig, bars: Vec<Bar>) -> Result<RunSummary, BacktestError> {
    Backtest::new(config, HistoricalFeed::new(bars)).run()
}
