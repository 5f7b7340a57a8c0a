//! Purchase order lifecycle.

use logisim_ledger::Treasury;
use logisim_types::{LedgerEntryKind, Order, OrderStatus};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Lifecycle, OrderError};

/// Every allowed order transition.
pub const ORDER_TRANSITIONS: &[(OrderStatus, OrderStatus)] = &[
    (OrderStatus::Draft, OrderStatus::Pending),
    (OrderStatus::Pending, OrderStatus::Shipped),
    (OrderStatus::Shipped, OrderStatus::Delivered),
    (OrderStatus::Pending, OrderStatus::Cancelled),
    (OrderStatus::Shipped, OrderStatus::Cancelled),
];

/// Guarded transitions for [`Order`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Whether `from -> to` is in the table.
    pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
        ORDER_TRANSITIONS.contains(&(from, to))
    }

    fn check(order: &Order, to: OrderStatus) -> Result<(), OrderError> {
        if Self::can_transition(order.status, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition {
                lifecycle: Lifecycle::Order,
                id: order.id.into_inner(),
                from: format!("{:?}", order.status),
                to: format!("{to:?}"),
            })
        }
    }

    fn set(order: &mut Order, to: OrderStatus, day: u64) {
        debug!(order = %order.id, from = ?order.status, to = ?to, day, "order transition");
        order.status = to;
    }

    /// `draft -> pending`, paying `total_cost` from the treasury.
    ///
    /// # Errors
    ///
    /// [`OrderError::InvalidTransition`] if the order is not a draft;
    /// [`OrderError::Funds`] if the treasury cannot cover the total. In
    /// both cases nothing changes.
    pub fn submit(order: &mut Order, treasury: &mut Treasury, day: u64) -> Result<(), OrderError> {
        Self::check(order, OrderStatus::Pending)?;
        if order.total_cost > Decimal::ZERO {
            treasury.debit(
                day,
                LedgerEntryKind::OrderPayment,
                order.total_cost,
                Some(order.id.into_inner()),
            )?;
        }
        Self::set(order, OrderStatus::Pending, day);
        Ok(())
    }

    /// `pending -> shipped`, due `transit_days` after `day`.
    ///
    /// # Errors
    ///
    /// [`OrderError::InvalidTransition`] if the order is not pending.
    pub fn ship(order: &mut Order, day: u64, transit_days: u32) -> Result<(), OrderError> {
        Self::check(order, OrderStatus::Shipped)?;
        order.delivery_day = Some(day.saturating_add(u64::from(transit_days)));
        Self::set(order, OrderStatus::Shipped, day);
        Ok(())
    }

    /// `pending | shipped -> cancelled`, refunding `total_cost`.
    ///
    /// # Errors
    ///
    /// [`OrderError::InvalidTransition`] from any other status.
    pub fn cancel(order: &mut Order, treasury: &mut Treasury, day: u64) -> Result<(), OrderError> {
        Self::check(order, OrderStatus::Cancelled)?;
        if order.total_cost > Decimal::ZERO {
            treasury.credit(
                day,
                LedgerEntryKind::OrderRefund,
                order.total_cost,
                Some(order.id.into_inner()),
            )?;
        }
        Self::set(order, OrderStatus::Cancelled, day);
        Ok(())
    }

    /// Whether a shipped order is due on `day`.
    pub fn is_due(order: &Order, day: u64) -> bool {
        order.status == OrderStatus::Shipped && order.delivery_day.is_some_and(|d| d <= day)
    }

    /// `shipped -> delivered`, once due.
    ///
    /// # Errors
    ///
    /// [`OrderError::InvalidTransition`] if the order is not shipped;
    /// [`OrderError::NotDue`] before its delivery day.
    pub fn deliver(order: &mut Order, day: u64) -> Result<(), OrderError> {
        Self::check(order, OrderStatus::Delivered)?;
        if !Self::is_due(order, day) {
            return Err(OrderError::NotDue {
                lifecycle: Lifecycle::Order,
                id: order.id.into_inner(),
                due: order.delivery_day,
                day,
            });
        }
        Self::set(order, OrderStatus::Delivered, day);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use logisim_ledger::LedgerError;
    use logisim_types::{LocationId, OrderId, OrderLine, ProductId};
    use rust_decimal_macros::dec;

    use super::*;

    fn draft(total: Decimal) -> Order {
        Order {
            id: OrderId::new(),
            vendor_id: LocationId::new(),
            destination_id: LocationId::new(),
            lines: vec![OrderLine {
                product_id: ProductId::new(),
                quantity: 10,
                unit_price: total,
            }],
            route_ids: Vec::new(),
            total_cost: total,
            status: OrderStatus::Draft,
            created_day: 1,
            delivery_day: None,
        }
    }

    fn treasury(balance: Decimal) -> Treasury {
        Treasury::with_opening_balance(balance).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Table
    // -----------------------------------------------------------------------

    #[test]
    fn table_rejects_backwards_moves() {
        assert!(OrderStateMachine::can_transition(OrderStatus::Draft, OrderStatus::Pending));
        assert!(OrderStateMachine::can_transition(OrderStatus::Shipped, OrderStatus::Cancelled));
        assert!(!OrderStateMachine::can_transition(OrderStatus::Delivered, OrderStatus::Pending));
        assert!(!OrderStateMachine::can_transition(OrderStatus::Draft, OrderStatus::Cancelled));
        assert!(!OrderStateMachine::can_transition(OrderStatus::Draft, OrderStatus::Shipped));
    }

    // -----------------------------------------------------------------------
    // Submit
    // -----------------------------------------------------------------------

    #[test]
    fn submit_debits_funds() {
        let mut order = draft(dec!(300));
        let mut funds = treasury(dec!(1000));
        assert!(OrderStateMachine::submit(&mut order, &mut funds, 2).is_ok());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(funds.balance(), dec!(700));
    }

    #[test]
    fn submit_without_funds_changes_nothing() {
        let mut order = draft(dec!(300));
        let mut funds = treasury(dec!(100));
        let result = OrderStateMachine::submit(&mut order, &mut funds, 2);
        assert!(matches!(
            result,
            Err(OrderError::Funds(LedgerError::InsufficientFunds { .. }))
        ));
        assert!(result.as_ref().is_err_and(|e| !e.is_fatal()));
        assert_eq!(order.status, OrderStatus::Draft);
        assert_eq!(funds.balance(), dec!(100));
        assert_eq!(funds.entries().len(), 1);
    }

    // -----------------------------------------------------------------------
    // Ship, deliver, cancel
    // -----------------------------------------------------------------------

    #[test]
    fn full_happy_path() {
        let mut order = draft(dec!(50));
        let mut funds = treasury(dec!(100));
        assert!(OrderStateMachine::submit(&mut order, &mut funds, 1).is_ok());
        assert!(OrderStateMachine::ship(&mut order, 2, 3).is_ok());
        assert_eq!(order.delivery_day, Some(5));

        assert!(!OrderStateMachine::is_due(&order, 4));
        assert!(matches!(
            OrderStateMachine::deliver(&mut order, 4),
            Err(OrderError::NotDue { due: Some(5), day: 4, .. })
        ));
        assert!(OrderStateMachine::deliver(&mut order, 5).is_ok());
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[test]
    fn cancel_shipped_refunds() {
        let mut order = draft(dec!(80));
        let mut funds = treasury(dec!(100));
        assert!(OrderStateMachine::submit(&mut order, &mut funds, 1).is_ok());
        assert!(OrderStateMachine::ship(&mut order, 1, 2).is_ok());
        assert!(OrderStateMachine::cancel(&mut order, &mut funds, 2).is_ok());
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(funds.balance(), dec!(100));
    }

    #[test]
    fn delivered_cannot_go_back_to_pending() {
        let mut order = draft(dec!(10));
        order.status = OrderStatus::Delivered;
        let mut funds = treasury(dec!(100));
        let result = OrderStateMachine::submit(&mut order, &mut funds, 3);
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert!(result.is_err_and(|e| e.is_fatal()));
        assert_eq!(funds.balance(), dec!(100));
    }

    #[test]
    fn draft_cannot_be_cancelled() {
        let mut order = draft(dec!(10));
        let mut funds = treasury(dec!(100));
        assert!(matches!(
            OrderStateMachine::cancel(&mut order, &mut funds, 3),
            Err(OrderError::InvalidTransition { .. })
        ));
        assert_eq!(funds.balance(), dec!(100));
    }
}
