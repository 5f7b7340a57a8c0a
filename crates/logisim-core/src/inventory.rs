//! Stock updates driven by delivery events.

use tracing::debug;

use crate::events::{ListenerError, SimEvent, SimListener};
use crate::state::SimulationState;

/// Adds delivered quantities to the destination's stock.
///
/// Handles [`SimEvent::TransferCompleted`] (target location) and
/// [`SimEvent::OrderDelivered`] (destination location). Source stock for
/// transfers is removed when the transfer is created, not here.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryListener;

impl SimListener for InventoryListener {
    fn name(&self) -> &str {
        "inventory"
    }

    fn on_event(
        &mut self,
        event: &SimEvent,
        state: &mut SimulationState,
    ) -> Result<(), ListenerError> {
        let (location, lines): (_, Vec<_>) = match event {
            SimEvent::TransferCompleted { transfer } => (
                transfer.target_id,
                transfer.lines.iter().map(|l| (l.product_id, l.quantity)).collect(),
            ),
            SimEvent::OrderDelivered { order } => (
                order.destination_id,
                order.lines.iter().map(|l| (l.product_id, l.quantity)).collect(),
            ),
            _ => return Ok(()),
        };
        if !state.graph.contains_location(location) {
            return Err(ListenerError::new(
                self.name(),
                event,
                format!("delivery to unknown location {location}"),
            ));
        }
        for (product, quantity) in lines {
            state.add_stock(location, product, quantity);
            debug!(%location, %product, quantity, "stock received");
        }
        Ok(())
    }
}
