use serde::{Deserialize, Serialize};
use std::fmt;

/// Broker-assigned identifier of an open position.
///
/// Entry fills receive a fresh ticket; exit orders and fills carry the ticket
/// of the position they close. `Ticket::NONE` marks "not assigned".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticket(pub u32);

impl Ticket {
    pub const NONE: Ticket = Ticket(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
