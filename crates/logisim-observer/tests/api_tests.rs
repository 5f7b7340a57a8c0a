//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use logisim_core::{SimulationConfig, Simulation, TickOrchestrator, create_starting_state};
use logisim_observer::router::build_router;
use logisim_observer::state::AppState;
use logisim_types::{LocationId, SpikeEvent, SpikeId, SpikeType};
use logisim_world::StartingLocationIds;
use serde_json::Value;
use tower::ServiceExt;

struct Fixture {
    state: Arc<AppState>,
    ids: StartingLocationIds,
    breakdown: SpikeId,
    demand: SpikeId,
}

/// A quiet world (no random or guaranteed spikes) with a breakdown at the
/// south warehouse and a demand surge downtown, both starting on day 1.
fn make_fixture() -> Fixture {
    let mut config = SimulationConfig::default();
    config.spikes.random_chance = 0.0;
    config.spikes.guaranteed_gap_days = 0;
    let orchestrator = TickOrchestrator::from_config(&config).unwrap();
    let mut world = create_starting_state(&config).unwrap();
    let ids = world.locations;

    let breakdown = world.state.spikes.insert(spike(
        SpikeType::Breakdown,
        Some(ids.south_warehouse),
    ));
    let demand = world
        .state
        .spikes
        .insert(spike(SpikeType::Demand, Some(ids.downtown_store)));

    let simulation = Simulation::new(world.state, orchestrator);
    Fixture {
        state: Arc::new(AppState::new(simulation)),
        ids,
        breakdown,
        demand,
    }
}

fn spike(spike_type: SpikeType, location: Option<LocationId>) -> SpikeEvent {
    SpikeEvent {
        id: SpikeId::new(),
        spike_type,
        magnitude: 0.5,
        duration: 3,
        location_id: location,
        product_id: None,
        route_id: None,
        parent_id: None,
        starts_at_day: 1,
        ends_at_day: 4,
        active: false,
        is_guaranteed: false,
        resolved_at_day: None,
        resolved_by: None,
        resolution_cost: None,
        meta: BTreeMap::new(),
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let response = build_router(Arc::clone(state))
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post(state: &Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let response = build_router(Arc::clone(state))
        .oneshot(Request::post(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_status_at_day_zero() {
    let fixture = make_fixture();
    let (status, json) = get(&fixture.state, "/api/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["day"], 0);
    assert_eq!(json["locations"], 8);
    assert_eq!(json["routes"], 12);
    assert_eq!(json["active_spikes"], 0);
    assert_eq!(json["scheduled_spikes"], 2);
}

#[tokio::test]
async fn test_get_path_between_vendor_and_store() {
    let fixture = make_fixture();
    let uri = format!(
        "/api/path?source={}&target={}",
        fixture.ids.harbor_vendor, fixture.ids.downtown_store
    );
    let (status, json) = get(&fixture.state, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["reachable"], true);
    assert!(json["totalCost"].as_f64().unwrap() > 0.0);
    let legs = json["path"].as_array().unwrap();
    assert!(!legs.is_empty());
    assert!(legs[0].get("routeId").is_some());
    assert!(legs[0].get("isPremium").is_some());
}

#[tokio::test]
async fn test_get_path_unknown_location_is_unsuccessful() {
    let fixture = make_fixture();
    let uri = format!(
        "/api/path?source={}&target={}",
        fixture.ids.harbor_vendor,
        uuid::Uuid::now_v7()
    );
    let (status, json) = get(&fixture.state, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["reachable"], false);
}

#[tokio::test]
async fn test_get_path_from_store_is_unreachable() {
    let fixture = make_fixture();
    let uri = format!(
        "/api/path?source={}&target={}",
        fixture.ids.downtown_store, fixture.ids.harbor_vendor
    );
    let (_, json) = get(&fixture.state, &uri).await;

    assert_eq!(json["success"], true);
    assert_eq!(json["reachable"], false);
    assert_eq!(json["path"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_get_path_rejects_bad_uuid() {
    let fixture = make_fixture();
    let (status, json) = get(&fixture.state, "/api/path?source=nope&target=nope").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_get_path_requires_both_endpoints() {
    let fixture = make_fixture();
    let uri = format!("/api/path?source={}", fixture.ids.harbor_vendor);
    let (status, _) = get(&fixture.state, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_locations() {
    let fixture = make_fixture();
    let (status, json) = get(&fixture.state, "/api/locations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 8);
    let locations = json["locations"].as_array().unwrap();
    assert!(locations.iter().all(|l| l["reachable"] == true));
    assert!(locations.iter().all(|l| l["demand_multiplier"] == 1.0));
}

#[tokio::test]
async fn test_advance_applies_spikes_and_broadcasts() {
    let fixture = make_fixture();
    let mut rx = fixture.state.subscribe();

    let (status, json) = post(&fixture.state, "/api/advance").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["day"], 1);
    assert_eq!(json["spikes_started"].as_array().unwrap().len(), 2);
    let events = json["events"].as_array().unwrap();
    assert_eq!(events.last().unwrap()["type"], "time_advanced");

    let broadcast = rx.try_recv().unwrap();
    assert_eq!(broadcast.day, 1);
    assert_eq!(broadcast.spikes_started.len(), 2);

    let (_, locations) = get(&fixture.state, "/api/locations").await;
    let downtown = fixture.ids.downtown_store.to_string();
    let entry = locations["locations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["id"] == downtown.as_str())
        .unwrap()
        .clone();
    assert_eq!(entry["demand_multiplier"], 1.5);
}

#[tokio::test]
async fn test_list_spikes() {
    let fixture = make_fixture();
    let _ = post(&fixture.state, "/api/advance").await;
    let (status, json) = get(&fixture.state, "/api/spikes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    let spikes = json["spikes"].as_array().unwrap();
    assert!(spikes.iter().all(|s| s["active"] == true));
}

#[tokio::test]
async fn test_resolve_breakdown() {
    let fixture = make_fixture();
    let _ = post(&fixture.state, "/api/advance").await;

    let uri = format!("/api/spikes/{}/resolve", fixture.breakdown);
    let (status, json) = post(&fixture.state, &uri).await;

    assert_eq!(status, StatusCode::OK);
    // Base 500 per day, days 1..4 leaves 3 days.
    assert_eq!(json["cost"], "1500");
    assert_eq!(json["spike"]["resolved_by"], "player");
    assert_eq!(json["spike"]["active"], false);

    let simulation = fixture.state.simulation.read().await;
    let storage = simulation
        .state()
        .graph
        .location(fixture.ids.south_warehouse)
        .map(|l| l.max_storage);
    assert_eq!(storage, Some(3_000));
}

#[tokio::test]
async fn test_resolve_demand_spike_is_rejected() {
    let fixture = make_fixture();
    let _ = post(&fixture.state, "/api/advance").await;

    let uri = format!("/api/spikes/{}/resolve", fixture.demand);
    let (status, json) = post(&fixture.state, &uri).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("cannot be resolved"));
}

#[tokio::test]
async fn test_resolve_unknown_spike_returns_404() {
    let fixture = make_fixture();
    let uri = format!("/api/spikes/{}/resolve", uuid::Uuid::now_v7());
    let (status, json) = post(&fixture.state, &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_alerts_empty_in_connected_world() {
    let fixture = make_fixture();
    let _ = post(&fixture.state, "/api/advance").await;
    let (status, json) = get(&fixture.state, "/api/alerts?unresolved=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 0);
}
