//! Funds balance and append-only ledger for the Logisim simulation.
//!
//! Every movement of money -- order payments and refunds, transfer fees,
//! spike resolution costs -- goes through the [`Treasury`], which keeps the
//! running balance and an append-only log of [`LedgerEntry`] records.
//!
//! # Invariants
//!
//! - Amounts are strictly positive at the call site; the sign is implied by
//!   `debit` / `credit`.
//! - A debit never drives the balance negative. Insufficient funds is a
//!   caller-correctable error and leaves the treasury untouched.
//! - All amounts use [`Decimal`] -- no floating point.
//!
//! [`LedgerEntry`]: logisim_types::LedgerEntry
//! [`Decimal`]: rust_decimal::Decimal

pub mod treasury;

pub use treasury::Treasury;

use rust_decimal::Decimal;

/// Errors that can occur during funds operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Amount must be strictly positive.
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The invalid amount.
        amount: Decimal,
    },

    /// The balance does not cover the debit.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Amount requested.
        required: Decimal,
        /// Balance at the time of the request.
        available: Decimal,
    },

    /// Balance arithmetic overflowed.
    #[error("arithmetic overflow in ledger calculation")]
    ArithmeticOverflow,
}
