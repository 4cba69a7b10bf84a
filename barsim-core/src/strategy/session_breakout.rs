//! Session open breakout.
//!
//! Entry levels sit a fraction of the previous session's range above and
//! below the current session open. An entry is proposed only when the last
//! three intraday bars agree with the direction, and at most one trade is
//! taken per session. Open positions are closed at market one bar before the
//! session close.

use super::{ParamError, ParamSet, Strategy};
use crate::domain::{Action, Instrument, OrderKind, Side, Signal, Timeframe};
use crate::portfolio::PositionBook;
use crate::price_collection::PriceCollection;
use crate::signals::{Candidates, LONG, SHORT};
use chrono::NaiveTime;

const NAME: &str = "session_breakout";

#[derive(Debug, Clone)]
pub struct SessionBreakout {
    instrument: Instrument,
    max_bars_back: usize,
    digits: u32,
    one_bar_before_close: NaiveTime,

    // parameters
    /// Range fraction in tenths.
    fract_n: i64,
    /// Per-contract stop-loss in account currency, 0 for none.
    stop_loss: f64,

    // state
    session_open_price: Option<f64>,
    trading_enabled: bool,
    market_position: i64,
    open_d: f64,
    prev_range: f64,
}

impl SessionBreakout {
    /// Returns `None` for session (`Daily`) timeframes.
    pub fn new(instrument: Instrument, timeframe: Timeframe, max_bars_back: usize) -> Option<Self> {
        let duration = timeframe.bar_duration()?;
        let one_bar_before_close = instrument.session_close - duration;
        Some(Self {
            digits: instrument.digits(),
            instrument,
            max_bars_back,
            one_bar_before_close,
            fract_n: 0,
            stop_loss: 0.0,
            session_open_price: None,
            trading_enabled: false,
            market_position: 0,
            open_d: 0.0,
            prev_range: 0.0,
        })
    }

    pub fn max_bars_back(&self) -> usize {
        self.max_bars_back
    }

    fn round_price(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.digits as i32);
        (value * scale).round() / scale
    }

    fn compute_entry(&self, prices: &PriceCollection, candidates: &mut Candidates) {
        let data1 = prices.primary_bars();
        let (b0, b1, b2) = (&data1[0], &data1[1], &data1[2]);
        let filter_long = b0.close > b1.close && b1.close > b1.open && b2.close > b2.open;
        let filter_short = b0.close < b1.close && b1.close < b1.open && b2.close < b2.open;
        if !self.trading_enabled || !(filter_long || filter_short) {
            return;
        }

        let fract = self.fract_n as f64 * 0.1;
        let offset = fract * self.prev_range;
        let symbol = &self.instrument.symbol;

        if filter_long {
            let level = self.round_price(self.open_d + offset);
            candidates[LONG] = Some(
                Signal::entry(symbol, b0.timestamp, Action::Buy, OrderKind::Stop, level, NAME)
                    .with_stop_loss(self.stop_loss),
            );
        }
        if filter_short {
            let level = self.round_price(self.open_d - offset);
            candidates[SHORT] = Some(
                Signal::entry(symbol, b0.timestamp, Action::SellShort, OrderKind::Stop, level, NAME)
                    .with_stop_loss(self.stop_loss),
            );
        }
    }

    fn compute_exit(&self, prices: &PriceCollection, book: &dyn PositionBook, candidates: &mut Candidates) {
        let bar = &prices.primary_bars()[0];
        if bar.timestamp.time() != self.one_bar_before_close {
            return;
        }
        for (side, action, idx) in [
            (Side::Long, Action::Sell, LONG),
            (Side::Short, Action::BuyToCover, SHORT),
        ] {
            if let Some(pos) = book.position_on(side) {
                candidates[idx] = Some(Signal::exit(
                    &self.instrument.symbol,
                    bar.timestamp,
                    action,
                    OrderKind::Market,
                    bar.close,
                    pos.quantity,
                    pos.ticket,
                    NAME,
                ));
            }
        }
    }
}

impl Strategy for SessionBreakout {
    fn name(&self) -> &str {
        NAME
    }

    fn set_param_values(&mut self, params: &ParamSet) -> Result<(), ParamError> {
        let fract_n = params.get("fractN")?;
        if fract_n < 0 {
            return Err(ParamError::OutOfRange {
                name: "fractN".into(),
                value: fract_n,
            });
        }
        let stop_loss = params.get_or("stop_loss", 0);
        if stop_loss < 0 {
            return Err(ParamError::OutOfRange {
                name: "stop_loss".into(),
                value: stop_loss,
            });
        }
        self.fract_n = fract_n;
        self.stop_loss = stop_loss as f64;
        Ok(())
    }

    fn preliminaries(&mut self, prices: &PriceCollection, book: &dyn PositionBook) -> bool {
        let data1 = prices.primary_bars();
        let data1d = prices.session_bars();
        if data1.len() < 3 || data1d.len() < 2 {
            return false;
        }

        self.open_d = data1d[0].open;
        self.prev_range = data1d[1].high - data1d[1].low;

        if self.session_open_price != Some(self.open_d) {
            self.trading_enabled = true;
            self.session_open_price = Some(self.open_d);
        }

        self.market_position = book
            .open_positions()
            .iter()
            .map(|p| match p.side {
                Side::Long => i64::from(p.quantity),
                Side::Short => -i64::from(p.quantity),
            })
            .sum();
        if self.market_position != 0 {
            self.trading_enabled = false;
        }
        true
    }

    fn compute_signals(
        &mut self,
        prices: &PriceCollection,
        book: &dyn PositionBook,
        candidates: &mut Candidates,
    ) {
        *candidates = [None, None];
        if self.market_position == 0 {
            self.compute_entry(prices, candidates);
        } else {
            self.compute_exit(prices, book, candidates);
        }
    }
}
