//! Order and transfer lifecycles for the Logisim simulation.
//!
//! Each lifecycle is a status enum plus an explicit table of allowed
//! `(from, to)` pairs. Every transition goes through [`OrderStateMachine`]
//! or [`TransferStateMachine`]; nothing else writes `status`.
//!
//! ```text
//! Order:    draft -> pending -> shipped -> delivered
//!                      |          |
//!                      +----------+--> cancelled
//!
//! Transfer: draft -> in_transit -> completed
//! ```
//!
//! A pair missing from the table is [`OrderError::InvalidTransition`], a
//! programming error. Guard failures (insufficient funds, not yet due) are
//! separate variants that callers can recover from.

pub mod error;
pub mod order;
pub mod transfer;

pub use error::{Lifecycle, OrderError};
pub use order::{ORDER_TRANSITIONS, OrderStateMachine};
pub use transfer::{TRANSFER_TRANSITIONS, TransferStateMachine};
