//! The treasury: running balance plus an append-only entry log.

use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use logisim_types::{LedgerEntry, LedgerEntryId, LedgerEntryKind};

use crate::LedgerError;

/// The player's funds.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Treasury {
    /// Current balance.
    balance: Decimal,
    /// All entries, in insertion order.
    entries: Vec<LedgerEntry>,
}

impl Treasury {
    /// Create a treasury with an opening balance recorded on day 0.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonPositiveAmount`] for a negative opening
    /// balance. Zero is allowed and records no entry.
    pub fn with_opening_balance(amount: Decimal) -> Result<Self, LedgerError> {
        let mut treasury = Self::default();
        if amount.is_zero() {
            return Ok(treasury);
        }
        treasury.credit(0, LedgerEntryKind::OpeningBalance, amount, None)?;
        Ok(treasury)
    }

    /// Current balance.
    pub const fn balance(&self) -> Decimal {
        self.balance
    }

    /// All ledger entries, oldest first.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Whether the balance covers `amount`.
    pub fn can_afford(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// Remove `amount` from the balance.
    ///
    /// All-or-nothing: on error nothing is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonPositiveAmount`] or
    /// [`LedgerError::InsufficientFunds`].
    pub fn debit(
        &mut self,
        day: u64,
        kind: LedgerEntryKind,
        amount: Decimal,
        reference_id: Option<Uuid>,
    ) -> Result<&LedgerEntry, LedgerError> {
        ensure_positive(amount)?;
        if !self.can_afford(amount) {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let signed = amount
            .checked_mul(Decimal::NEGATIVE_ONE)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        Ok(self.record(day, kind, signed, balance, reference_id))
    }

    /// Add `amount` to the balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonPositiveAmount`] or
    /// [`LedgerError::ArithmeticOverflow`].
    pub fn credit(
        &mut self,
        day: u64,
        kind: LedgerEntryKind,
        amount: Decimal,
        reference_id: Option<Uuid>,
    ) -> Result<&LedgerEntry, LedgerError> {
        ensure_positive(amount)?;
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        Ok(self.record(day, kind, amount, balance, reference_id))
    }

    #[allow(clippy::indexing_slicing)] // `index` is the slot pushed just above.
    fn record(
        &mut self,
        day: u64,
        kind: LedgerEntryKind,
        amount: Decimal,
        balance_after: Decimal,
        reference_id: Option<Uuid>,
    ) -> &LedgerEntry {
        self.balance = balance_after;
        debug!(day, ?kind, %amount, balance = %balance_after, "funds moved");
        let index = self.entries.len();
        self.entries.push(LedgerEntry {
            id: LedgerEntryId::new(),
            day,
            kind,
            amount,
            balance_after,
            reference_id,
        });
        &self.entries[index]
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount { amount });
    }
    Ok(())
}
