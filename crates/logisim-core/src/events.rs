//! Domain events and the in-transaction event bus.
//!
//! Events are dispatched synchronously to every subscribed [`SimListener`]
//! while the day-advance (or command) transaction is still open. Listeners
//! receive the transaction's working copy of the state, so their writes
//! commit or roll back together with the rest of the transaction, and a
//! listener error aborts the whole transaction.

use logisim_types::{Alert, Order, SpikeEvent, Transfer};
use serde::Serialize;
use tracing::debug;

use crate::state::SimulationState;

/// Something that happened inside the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// A spike became active and its effect was applied.
    SpikeOccurred {
        /// The spike after activation.
        spike: SpikeEvent,
    },
    /// A spike ended and its effect was rolled back.
    SpikeEnded {
        /// The spike after deactivation.
        spike: SpikeEvent,
    },
    /// An order was paid for and entered `pending`.
    OrderPlaced {
        /// The order.
        order: Order,
    },
    /// A shipped order reached its destination.
    OrderDelivered {
        /// The order.
        order: Order,
    },
    /// A transfer reached its target.
    TransferCompleted {
        /// The transfer.
        transfer: Transfer,
    },
    /// A low-stock location lost every supply path.
    IsolationDetected {
        /// The new alert.
        alert: Alert,
    },
    /// An isolated location regained a supply path.
    IsolationResolved {
        /// The resolved alert.
        alert: Alert,
    },
    /// The day-advance finished all phases. Emitted once per day.
    ///
    /// The simulation state travels alongside rather than inside the event:
    /// listeners get it as the `state` argument of
    /// [`SimListener::on_event`], already reflecting the event, physics, and
    /// analysis ticks of the new day.
    TimeAdvanced {
        /// The new day.
        day: u64,
    },
}

impl SimEvent {
    /// Short snake-case event name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SpikeOccurred { .. } => "spike_occurred",
            Self::SpikeEnded { .. } => "spike_ended",
            Self::OrderPlaced { .. } => "order_placed",
            Self::OrderDelivered { .. } => "order_delivered",
            Self::TransferCompleted { .. } => "transfer_completed",
            Self::IsolationDetected { .. } => "isolation_detected",
            Self::IsolationResolved { .. } => "isolation_resolved",
            Self::TimeAdvanced { .. } => "time_advanced",
        }
    }
}

/// A listener failed while handling an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("listener `{listener}` failed on {event}: {message}")]
pub struct ListenerError {
    /// The listener's name.
    pub listener: String,
    /// The event being handled.
    pub event: &'static str,
    /// What went wrong.
    pub message: String,
}

impl ListenerError {
    /// Build an error for `listener` handling `event`.
    pub fn new(listener: &str, event: &SimEvent, message: impl Into<String>) -> Self {
        Self {
            listener: listener.to_owned(),
            event: event.name(),
            message: message.into(),
        }
    }
}

/// A subscriber that reacts to events inside the open transaction.
pub trait SimListener: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Handle `event`, optionally mutating the working state.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the enclosing transaction.
    fn on_event(
        &mut self,
        event: &SimEvent,
        state: &mut SimulationState,
    ) -> Result<(), ListenerError>;
}

/// Ordered list of listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn SimListener>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "listeners",
                &self.listeners.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl EventBus {
    /// A bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Listeners run in subscription order.
    pub fn subscribe(&mut self, listener: Box<dyn SimListener>) {
        self.listeners.push(listener);
    }

    /// Number of subscribed listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is subscribed.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`ListenerError`].
    pub fn dispatch(
        &mut self,
        event: &SimEvent,
        state: &mut SimulationState,
    ) -> Result<(), ListenerError> {
        debug!(event = event.name(), listeners = self.listeners.len(), "dispatching event");
        for listener in &mut self.listeners {
            listener.on_event(event, state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every event day into the state's clock, to prove it ran.
    struct DayStamp;

    impl SimListener for DayStamp {
        fn name(&self) -> &str {
            "day_stamp"
        }

        fn on_event(
            &mut self,
            event: &SimEvent,
            state: &mut SimulationState,
        ) -> Result<(), ListenerError> {
            if let SimEvent::TimeAdvanced { day } = event {
                state.clock = crate::clock::DayClock::at(*day);
            }
            Ok(())
        }
    }

    struct Failing;

    impl SimListener for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn on_event(
            &mut self,
            event: &SimEvent,
            _state: &mut SimulationState,
        ) -> Result<(), ListenerError> {
            Err(ListenerError::new(self.name(), event, "boom"))
        }
    }

    #[test]
    fn dispatch_reaches_every_listener() {
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(DayStamp));
        let mut state = SimulationState::empty();
        assert!(bus.dispatch(&SimEvent::TimeAdvanced { day: 5 }, &mut state).is_ok());
        assert_eq!(state.day(), 5);
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn first_failure_is_returned() {
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(Failing));
        let mut state = SimulationState::empty();
        let result = bus.dispatch(&SimEvent::TimeAdvanced { day: 3 }, &mut state);
        assert_eq!(
            result,
            Err(ListenerError {
                listener: "failing".to_owned(),
                event: "time_advanced",
                message: "boom".to_owned(),
            })
        );
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(SimEvent::TimeAdvanced { day: 9 });
        assert!(json.is_ok_and(|v| v["type"] == "time_advanced" && v["day"] == 9));
    }
}
