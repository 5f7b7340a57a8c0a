//! Error types for the `logisim-orders` crate.

use std::fmt;

use logisim_ledger::LedgerError;
use uuid::Uuid;

/// Which lifecycle a transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Purchase orders.
    Order,
    /// Inter-location transfers.
    Transfer,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order => f.write_str("order"),
            Self::Transfer => f.write_str("transfer"),
        }
    }
}

/// Errors raised by the order and transfer state machines.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// The `(from, to)` pair is not in the transition table.
    #[error("invalid {lifecycle} transition for {id}: {from} -> {to}")]
    InvalidTransition {
        /// Which lifecycle.
        lifecycle: Lifecycle,
        /// The entity.
        id: Uuid,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// Delivery was requested before the due day.
    #[error("{lifecycle} {id} is not due until day {due:?} (day {day})")]
    NotDue {
        /// Which lifecycle.
        lifecycle: Lifecycle,
        /// The entity.
        id: Uuid,
        /// Scheduled delivery day, if any.
        due: Option<u64>,
        /// Current day.
        day: u64,
    },

    /// The treasury rejected the payment or refund.
    #[error(transparent)]
    Funds(#[from] LedgerError),
}

impl OrderError {
    /// Whether the error is a programming error rather than a guard the
    /// caller can satisfy.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}
