//! Bounded multi-timeframe bar histories with session-bar synthesis.
//!
//! Histories are stored newest first. When the primary timeframe is intraday,
//! a `Daily` history (one bar per trading session) is built alongside it by
//! folding intraday bars into the current session bar.

use crate::domain::{Bar, Instrument, Timeframe};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::collections::{HashMap, VecDeque};
use tracing::trace;

/// Fraction of the bar range used as the noise standard deviation.
const NOISE_RANGE_FRACTION: f64 = 0.33;

type HistoryKey = (String, Timeframe);

/// Rolling bar histories for one instrument.
#[derive(Debug, Clone)]
pub struct PriceCollection {
    instrument: Instrument,
    timeframe: Timeframe,
    max_bars_back: usize,
    random_noise: bool,
    histories: HashMap<HistoryKey, VecDeque<Bar>>,
}

impl PriceCollection {
    pub fn new(
        instrument: Instrument,
        timeframe: Timeframe,
        max_bars_back: usize,
        random_noise: bool,
    ) -> Self {
        let mut histories = HashMap::new();
        histories.insert(
            (instrument.symbol.clone(), timeframe),
            VecDeque::with_capacity(max_bars_back),
        );
        if timeframe.is_intraday() {
            histories.insert(
                (instrument.symbol.clone(), Timeframe::Daily),
                VecDeque::with_capacity(max_bars_back),
            );
        }
        Self {
            instrument,
            timeframe,
            max_bars_back,
            random_noise,
            histories,
        }
    }

    /// Record a new bar.
    ///
    /// With noise enabled the bar is perturbed in place first, so every
    /// downstream consumer sees the same perturbed values.
    pub fn on_bar<R: Rng + ?Sized>(&mut self, bar: &mut Bar, rng: &mut R) {
        if self.random_noise {
            add_gaussian_noise(bar, rng);
        }

        match (self.timeframe.is_intraday(), bar.timeframe.is_intraday()) {
            (true, true) => {
                self.push_bounded(bar.timeframe, bar.clone());
                self.update_session_bars(bar);
            }
            (false, false) => self.push_bounded(Timeframe::Daily, bar.clone()),
            _ => trace!(
                primary = %self.timeframe,
                incoming = %bar.timeframe,
                "bar timeframe does not match collection, ignored"
            ),
        }
    }

    /// Fold an intraday bar into the session (`Daily`) history.
    pub fn update_session_bars(&mut self, bar: &Bar) {
        let Some(duration) = bar.timeframe.bar_duration() else {
            return;
        };
        let close_time = bar.timestamp.time();
        // NaiveTime arithmetic wraps over midnight
        let open_time = close_time - duration;

        if open_time == self.instrument.session_open {
            let mut session_bar = bar.clone();
            session_bar.timeframe = Timeframe::Daily;
            self.push_bounded(Timeframe::Daily, session_bar);
            return;
        }

        if !self.instrument.session_window_contains(close_time) {
            return;
        }
        let key = (self.instrument.symbol.clone(), Timeframe::Daily);
        if let Some(current) = self.histories.get_mut(&key).and_then(|h| h.front_mut()) {
            current.close = bar.close;
            current.high = current.high.max(bar.high);
            current.low = current.low.min(bar.low);
            current.volume += bar.volume;
            current.timestamp = bar.timestamp;
        }
    }

    /// Empty the primary history and, for intraday runs, the session history.
    pub fn clear_bars(&mut self) {
        for history in self.histories.values_mut() {
            history.clear();
        }
    }

    /// History for `timeframe`, newest first. Empty if never populated.
    pub fn bars(&self, timeframe: Timeframe) -> &VecDeque<Bar> {
        static EMPTY: VecDeque<Bar> = VecDeque::new();
        self.histories
            .get(&(self.instrument.symbol.clone(), timeframe))
            .unwrap_or(&EMPTY)
    }

    pub fn primary_bars(&self) -> &VecDeque<Bar> {
        self.bars(self.timeframe)
    }

    pub fn session_bars(&self) -> &VecDeque<Bar> {
        self.bars(Timeframe::Daily)
    }

    pub fn max_bars_back(&self) -> usize {
        self.max_bars_back
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn random_noise(&self) -> bool {
        self.random_noise
    }

    fn push_bounded(&mut self, timeframe: Timeframe, bar: Bar) {
        let history = self
            .histories
            .entry((self.instrument.symbol.clone(), timeframe))
            .or_default();
        if self.max_bars_back == 0 {
            return;
        }
        while history.len() >= self.max_bars_back {
            history.pop_back();
        }
        history.push_front(bar);
    }
}

/// Perturb one randomly chosen OHLC value with zero-mean Gaussian noise.
///
/// The standard deviation is a third of the bar range. High and low are
/// restored as the max/min of the four values afterwards. Bars with no range
/// are left untouched.
pub fn add_gaussian_noise<R: Rng + ?Sized>(bar: &mut Bar, rng: &mut R) {
    let std_dev = bar.range() * NOISE_RANGE_FRACTION;
    if !(std_dev.is_finite() && std_dev > 0.0) {
        return;
    }
    let Ok(normal) = Normal::new(0.0, std_dev) else {
        return;
    };
    let noise = normal.sample(rng);

    let mut ohlc = [bar.open, bar.high, bar.low, bar.close];
    ohlc[rng.gen_range(0..4)] += noise;
    let [open, high, low, close] = ohlc;
    bar.reorder_ohlc(open, high, low, close);
}
