//! Post-commit tick callbacks used by the engine.
//!
//! [`ObserverCallback`] publishes each committed day to Observer API
//! subscribers. [`AlertLogCallback`] surfaces isolation changes in the
//! logs when running headless.

use std::sync::Arc;

use logisim_core::{SimulationState, TickCallback, TickSummary};
use logisim_observer::AppState;
use tracing::{debug, info, warn};

/// Callback that bridges the day cycle to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl TickCallback for ObserverCallback {
    fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState) {
        let receivers = self.state.broadcast(summary);
        debug!(day = summary.day, receivers, "day broadcast sent");
    }
}

/// Callback that logs isolation alerts and a one-line day digest.
#[derive(Debug, Default)]
pub struct AlertLogCallback;

impl TickCallback for AlertLogCallback {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        for id in &summary.alerts_raised {
            if let Some(alert) = state.alerts.iter().find(|a| a.id == *id) {
                warn!(day = summary.day, location = %alert.location_id, "{}", alert.message);
            }
        }
        for id in &summary.alerts_resolved {
            info!(day = summary.day, alert = %id, "isolation cleared");
        }
        info!(
            day = summary.day,
            funds = %state.treasury.balance(),
            active_spikes = state.spikes.active().count(),
            open_alerts = state.unresolved_alerts().count(),
            "day digest"
        );
    }
}
