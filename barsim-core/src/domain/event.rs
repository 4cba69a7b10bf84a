//! Event vocabulary shared by every component of the dispatch loop.

use super::bar::Bar;
use super::fill::Fill;
use super::order::Order;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Trading action carried by signals, orders and fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Open a long position.
    Buy,
    /// Open a short position.
    SellShort,
    /// Close a long position.
    Sell,
    /// Close a short position.
    BuyToCover,
}

impl Action {
    pub fn is_entry(&self) -> bool {
        matches!(self, Action::Buy | Action::SellShort)
    }

    pub fn is_exit(&self) -> bool {
        !self.is_entry()
    }

    /// Buy-side actions lift the offer; sell-side actions hit the bid.
    pub fn is_buy_side(&self) -> bool {
        matches!(self, Action::Buy | Action::BuyToCover)
    }

    /// Direction of the position this action opens or closes.
    pub fn side(&self) -> Side {
        match self {
            Action::Buy | Action::Sell => Side::Long,
            Action::SellShort | Action::BuyToCover => Side::Short,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Buy => "BUY",
            Action::SellShort => "SELLSHORT",
            Action::Sell => "SELL",
            Action::BuyToCover => "BUYTOCOVER",
        };
        f.write_str(s)
    }
}

impl FromStr for Action {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELLSHORT" => Ok(Action::SellShort),
            "SELL" => Ok(Action::Sell),
            "BUYTOCOVER" => Ok(Action::BuyToCover),
            _ => Err(EventError::UnknownAction(s.to_string())),
        }
    }
}

/// How an order interacts with the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    Stop,
    Limit,
    Market,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderKind::Stop => "STOP",
            OrderKind::Limit => "LIMIT",
            OrderKind::Market => "MARKET",
        };
        f.write_str(s)
    }
}

impl FromStr for OrderKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STOP" => Ok(OrderKind::Stop),
            "LIMIT" => Ok(OrderKind::Limit),
            "MARKET" => Ok(OrderKind::Market),
            _ => Err(EventError::UnknownOrderKind(s.to_string())),
        }
    }
}

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("LONG"),
            Side::Short => f.write_str("SHORT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("order action '{0}' not recognized")]
    UnknownAction(String),

    #[error("order kind '{0}' not recognized")]
    UnknownOrderKind(String),
}

/// A unit of work on the event queue.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Event {
    Bar(Bar),
    Order(Order),
    Fill(Fill),
    #[default]
    None,
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Bar(_) => "BAR",
            Event::Order(_) => "ORDER",
            Event::Fill(_) => "FILL",
            Event::None => "NONE",
        }
    }
}

impl From<Bar> for Event {
    fn from(bar: Bar) -> Self {
        Event::Bar(bar)
    }
}

impl From<Order> for Event {
    fn from(order: Order) -> Self {
        Event::Order(order)
    }
}

impl From<Fill> for Event {
    fn from(fill: Fill) -> Self {
        Event::Fill(fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parsing() {
        assert_eq!("BUY".parse::<Action>().unwrap(), Action::Buy);
        assert_eq!("sellshort".parse::<Action>().unwrap(), Action::SellShort);
        assert_eq!(" Sell ".parse::<Action>().unwrap(), Action::Sell);
        assert_eq!("BUYTOCOVER".parse::<Action>().unwrap(), Action::BuyToCover);
    }

    #[test]
    fn unsupported_action_is_an_error() {
        let err = "MODIFY".parse::<Action>().unwrap_err();
        assert_eq!(err, EventError::UnknownAction("MODIFY".into()));
        assert!(err.to_string().contains("MODIFY"));
    }

    #[test]
    fn action_classification() {
        assert!(Action::Buy.is_entry());
        assert!(Action::SellShort.is_entry());
        assert!(Action::Sell.is_exit());
        assert!(Action::BuyToCover.is_exit());
        assert!(Action::BuyToCover.is_buy_side());
        assert!(!Action::Sell.is_buy_side());
        assert_eq!(Action::Sell.side(), Side::Long);
        assert_eq!(Action::BuyToCover.side(), Side::Short);
    }

    #[test]
    fn serialized_text_parses_back() {
        for action in [Action::Buy, Action::SellShort, Action::Sell, Action::BuyToCover] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{action}\""));
            assert_eq!(json.trim_matches('"').parse::<Action>().unwrap(), action);
        }
        for kind in [OrderKind::Stop, OrderKind::Limit, OrderKind::Market] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json.trim_matches('"').parse::<OrderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn order_kind_parsing() {
        assert_eq!("stop".parse::<OrderKind>().unwrap(), OrderKind::Stop);
        assert_eq!("MARKET".parse::<OrderKind>().unwrap(), OrderKind::Market);
        assert!("ICEBERG".parse::<OrderKind>().is_err());
    }

    #[test]
    fn default_event_is_none() {
        assert_eq!(Event::default().kind(), "NONE");
    }
}
