//! Inter-location transfer lifecycle.

use logisim_types::{Transfer, TransferStatus};
use tracing::debug;

use crate::error::{Lifecycle, OrderError};

/// Every allowed transfer transition.
pub const TRANSFER_TRANSITIONS: &[(TransferStatus, TransferStatus)] = &[
    (TransferStatus::Draft, TransferStatus::InTransit),
    (TransferStatus::InTransit, TransferStatus::Completed),
];

/// Guarded transitions for [`Transfer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferStateMachine;

impl TransferStateMachine {
    /// Whether `from -> to` is in the table.
    pub fn can_transition(from: TransferStatus, to: TransferStatus) -> bool {
        TRANSFER_TRANSITIONS.contains(&(from, to))
    }

    fn check(transfer: &Transfer, to: TransferStatus) -> Result<(), OrderError> {
        if Self::can_transition(transfer.status, to) {
            return Ok(());
        }
        Err(OrderError::InvalidTransition {
            lifecycle: Lifecycle::Transfer,
            id: transfer.id.into_inner(),
            from: format!("{:?}", transfer.status),
            to: format!("{to:?}"),
        })
    }

    /// `draft -> in_transit`, due `transit_days` after `day`.
    ///
    /// # Errors
    ///
    /// [`OrderError::InvalidTransition`] if the transfer is not a draft.
    pub fn dispatch(transfer: &mut Transfer, day: u64, transit_days: u32) -> Result<(), OrderError> {
        Self::check(transfer, TransferStatus::InTransit)?;
        transfer.delivery_day = Some(day.saturating_add(u64::from(transit_days)));
        transfer.status = TransferStatus::InTransit;
        debug!(transfer = %transfer.id, due = ?transfer.delivery_day, "transfer dispatched");
        Ok(())
    }

    /// Whether an in-transit transfer is due on `day`.
    pub fn is_due(transfer: &Transfer, day: u64) -> bool {
        transfer.status == TransferStatus::InTransit
            && transfer.delivery_day.is_some_and(|d| d <= day)
    }

    /// `in_transit -> completed`, once due.
    ///
    /// # Errors
    ///
    /// [`OrderError::InvalidTransition`] if the transfer is not in transit;
    /// [`OrderError::NotDue`] before its delivery day.
    pub fn complete(transfer: &mut Transfer, day: u64) -> Result<(), OrderError> {
        Self::check(transfer, TransferStatus::Completed)?;
        if !Self::is_due(transfer, day) {
            return Err(OrderError::NotDue {
                lifecycle: Lifecycle::Transfer,
                id: transfer.id.into_inner(),
                due: transfer.delivery_day,
                day,
            });
        }
        transfer.status = TransferStatus::Completed;
        debug!(transfer = %transfer.id, day, "transfer completed");
        Ok(())
    }
}
