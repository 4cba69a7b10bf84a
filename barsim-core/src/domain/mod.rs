//! Domain types shared by every engine component.

pub mod account;
pub mod bar;
pub mod event;
pub mod fill;
pub mod ids;
pub mod instrument;
pub mod order;
pub mod position;
pub mod signal;
pub mod trade;

pub use account::Account;
pub use bar::{Bar, Timeframe, TimeframeError};
pub use event::{Action, Event, EventError, OrderKind, Side};
pub use fill::Fill;
pub use ids::Ticket;
pub use instrument::{Instrument, InstrumentError};
pub use order::Order;
pub use position::Position;
pub use signal::Signal;
pub use trade::Transaction;
