//! REST API endpoint handlers for the Observer server.
//!
//! Read handlers take the simulation's read lock and serve committed state.
//! Command handlers take the write lock and run one transaction each.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/status` | Day, funds, and counts |
//! | `GET` | `/api/path` | Cheapest path (`?source=&target=`) |
//! | `GET` | `/api/locations` | Locations with reachability and stock |
//! | `GET` | `/api/spikes` | Every spike |
//! | `POST` | `/api/spikes/{id}/resolve` | Pay to end a spike early |
//! | `GET` | `/api/alerts` | Isolation alerts (`?unresolved=true`) |
//! | `POST` | `/api/advance` | Advance one day |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use logisim_spikes::demand_multiplier;
use logisim_types::{LocationId, SpikeId};
use tracing::info;
use uuid::Uuid;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/path`.
#[derive(Debug, serde::Deserialize)]
pub struct PathParams {
    /// Origin location ID.
    pub source: Option<String>,
    /// Destination location ID.
    pub target: Option<String>,
}

/// Query parameters for `GET /api/alerts`.
#[derive(Debug, serde::Deserialize)]
pub struct AlertsQuery {
    /// Only alerts that are still open.
    #[serde(default)]
    pub unresolved: bool,
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Current day, funds, and headline counts.
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let simulation = state.simulation.read().await;
    let sim = simulation.state();
    Json(serde_json::json!({
        "day": sim.day(),
        "funds": sim.treasury.balance(),
        "locations": sim.graph.location_count(),
        "routes": sim.graph.route_count(),
        "active_routes": sim.graph.routes().filter(|r| r.active).count(),
        "active_spikes": sim.spikes.active().count(),
        "scheduled_spikes": sim.spikes.iter().filter(|s| !s.active && !s.is_resolved()).count(),
        "unresolved_alerts": sim.unresolved_alerts().count(),
        "orders": sim.orders.len(),
        "transfers": sim.transfers.len(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/path
// ---------------------------------------------------------------------------

/// The `GetPath` query. Unknown endpoints give `success: false`; an
/// unreachable target gives `reachable: false`.
pub async fn get_path(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PathParams>,
) -> Result<impl IntoResponse, ObserverError> {
    let source = required_id(params.source.as_deref(), "source")?;
    let target = required_id(params.target.as_deref(), "target")?;
    let simulation = state.simulation.read().await;
    let query = simulation.get_path(LocationId::from(source), LocationId::from(target));
    Ok(Json(serde_json::to_value(query)?))
}

// ---------------------------------------------------------------------------
// GET /api/locations
// ---------------------------------------------------------------------------

/// Every location with its reachability from supply as of the last
/// analysis tick, stock on hand, and live demand multiplier.
pub async fn list_locations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let simulation = state.simulation.read().await;
    let sim = simulation.state();

    let locations: Vec<serde_json::Value> = sim
        .graph
        .locations()
        .map(|loc| {
            serde_json::json!({
                "id": loc.id,
                "name": loc.name,
                "location_type": loc.location_type,
                "max_storage": loc.max_storage,
                "reachable": sim.reachability.get(&loc.id).copied().unwrap_or(true),
                "stock": sim.stock(loc.id),
                "demand_multiplier": demand_multiplier(&sim.spikes, Some(loc.id), None),
                "open_alert": sim.open_isolation_alert(loc.id).map(|a| a.id),
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": locations.len(),
        "locations": locations,
    }))
}

// ---------------------------------------------------------------------------
// Spikes
// ---------------------------------------------------------------------------

/// Every spike in arena order.
pub async fn list_spikes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let simulation = state.simulation.read().await;
    let spikes: Vec<_> = simulation.state().spikes.iter().cloned().collect();
    Json(serde_json::json!({
        "count": spikes.len(),
        "spikes": spikes,
    }))
}

/// Pay to end an active breakdown or blizzard early.
pub async fn resolve_spike(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = SpikeId::from(parse_uuid(&id_str)?);
    let mut simulation = state.simulation.write().await;
    let cost = simulation.resolve_spike(id)?;
    let spike = simulation.state().spikes.get(id).cloned();
    info!(spike = %id, %cost, "spike resolved via observer");
    Ok(Json(serde_json::json!({
        "cost": cost,
        "funds": simulation.state().treasury.balance(),
        "spike": spike,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/alerts
// ---------------------------------------------------------------------------

/// Isolation alerts, oldest first.
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertsQuery>,
) -> impl IntoResponse {
    let simulation = state.simulation.read().await;
    let alerts: Vec<_> = simulation
        .state()
        .alerts
        .iter()
        .filter(|a| !params.unresolved || !a.resolved)
        .cloned()
        .collect();
    Json(serde_json::json!({
        "count": alerts.len(),
        "alerts": alerts,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/advance
// ---------------------------------------------------------------------------

/// Run one atomic day-advance and return its summary. An aborted day
/// returns an error and leaves the simulation unchanged.
pub async fn advance(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let summary = {
        let mut simulation = state.simulation.write().await;
        simulation.advance_day()?
    };
    state.broadcast(&summary);
    Ok(Json(serde_json::to_value(&summary)?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a UUID from a string, returning an [`ObserverError`] on failure.
fn parse_uuid(s: &str) -> Result<Uuid, ObserverError> {
    s.parse::<Uuid>()
        .map_err(|e| ObserverError::InvalidUuid(format!("{s}: {e}")))
}

fn required_id(value: Option<&str>, name: &str) -> Result<Uuid, ObserverError> {
    value
        .ok_or_else(|| ObserverError::InvalidQuery(format!("missing `{name}`")))
        .and_then(parse_uuid)
}
