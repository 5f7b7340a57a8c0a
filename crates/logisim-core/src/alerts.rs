//! Isolation alerts.
//!
//! Re-evaluated for every location on every analysis tick:
//!
//! - unreachable from supply **and** stock below the threshold, with no open
//!   isolation alert: raise a critical alert, blaming the most recently
//!   started active spike scoped to the location or one of its inbound
//!   routes;
//! - reachable: resolve any open isolation alert, whatever became of the
//!   spike it blamed.
//!
//! Alerts are never reopened. A location that is isolated again after its
//! alert resolved gets a fresh alert record.

use std::collections::BTreeSet;

use logisim_types::{Alert, AlertId, AlertKind, AlertSeverity, LocationId, RouteId, SpikeId};
use tracing::info;

use crate::state::SimulationState;

/// Alerts raised and resolved in one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertChanges {
    /// Newly created alerts.
    pub raised: Vec<Alert>,
    /// Alerts closed by this evaluation.
    pub resolved: Vec<Alert>,
}

/// Raises and resolves isolation alerts from current reachability.
#[derive(Debug, Clone, Copy)]
pub struct IsolationAlertGenerator {
    low_stock_threshold: u64,
}

impl IsolationAlertGenerator {
    /// A generator alerting below `low_stock_threshold` total units.
    pub const fn new(low_stock_threshold: u64) -> Self {
        Self {
            low_stock_threshold,
        }
    }

    /// The configured threshold.
    pub const fn low_stock_threshold(&self) -> u64 {
        self.low_stock_threshold
    }

    /// Evaluate every location against `state.reachability`.
    ///
    /// Locations missing from the reachability map are treated as
    /// reachable.
    pub fn evaluate(&self, state: &mut SimulationState, day: u64) -> AlertChanges {
        let mut changes = AlertChanges::default();
        for location in state.graph.location_ids() {
            let reachable = state.reachability.get(&location).copied().unwrap_or(true);
            if reachable {
                for alert in state.alerts.iter_mut().filter(|a| {
                    a.kind == AlertKind::Isolation && a.location_id == location && !a.resolved
                }) {
                    alert.resolved = true;
                    alert.resolved_day = Some(day);
                    info!(alert = %alert.id, %location, day, "isolation resolved");
                    changes.resolved.push(alert.clone());
                }
                continue;
            }

            let stock = state.stock(location);
            if stock >= self.low_stock_threshold || state.open_isolation_alert(location).is_some() {
                continue;
            }
            let name = state
                .graph
                .location(location)
                .map_or_else(|| location.to_string(), |l| l.name.clone());
            let alert = Alert {
                id: AlertId::new(),
                kind: AlertKind::Isolation,
                severity: AlertSeverity::Critical,
                location_id: location,
                spike_event_id: causal_spike(state, location),
                message: format!(
                    "{name} is cut off from every supply source with {stock} units on hand"
                ),
                created_day: day,
                resolved: false,
                resolved_day: None,
            };
            info!(
                alert = %alert.id,
                %location,
                stock,
                spike = ?alert.spike_event_id,
                day,
                "isolation detected"
            );
            state.alerts.push(alert.clone());
            changes.raised.push(alert);
        }
        changes
    }
}

/// The most recently started active spike scoped to `location` or to a
/// route into it.
fn causal_spike(state: &SimulationState, location: LocationId) -> Option<SpikeId> {
    let inbound: BTreeSet<RouteId> = state.graph.inbound_routes(location).map(|r| r.id).collect();
    state
        .spikes
        .active()
        .filter(|s| {
            s.location_id == Some(location) || s.route_id.is_some_and(|r| inbound.contains(&r))
        })
        .max_by_key(|s| (s.starts_at_day, s.id))
        .map(|s| s.id)
}
