//! Default starting network for the Logisim simulation.
//!
//! Eight locations: two vendors, two warehouses, a cross-dock hub, and
//! three stores, wired with a mix of cheap weather-exposed road lanes and
//! pricier sheltered or premium alternatives so that disruptions have
//! somewhere to reroute.

use logisim_types::{Location, LocationId, LocationType, Route, RouteId, TransportMode};

use crate::error::WorldError;
use crate::graph::LocationGraph;

/// Helper to build a [`Location`].
fn loc(name: &str, location_type: LocationType, max_storage: u32) -> Location {
    Location {
        id: LocationId::new(),
        name: name.to_owned(),
        location_type,
        max_storage,
    }
}

/// Lane parameters for [`lane`].
struct LaneSpec {
    mode: TransportMode,
    base_cost: u64,
    transit_days: u32,
    capacity: u32,
    weather_vulnerable: bool,
}

/// Helper to build an active [`Route`].
fn lane(source: LocationId, target: LocationId, spec: &LaneSpec) -> Route {
    Route {
        id: RouteId::new(),
        source_id: source,
        target_id: target,
        transport_mode: spec.mode,
        base_cost: spec.base_cost,
        transit_days: spec.transit_days,
        capacity: spec.capacity,
        active: true,
        weather_vulnerable: spec.weather_vulnerable,
    }
}

const ROAD: LaneSpec = LaneSpec {
    mode: TransportMode::Truck,
    base_cost: 100,
    transit_days: 2,
    capacity: 400,
    weather_vulnerable: true,
};

const RAIL: LaneSpec = LaneSpec {
    mode: TransportMode::Rail,
    base_cost: 140,
    transit_days: 3,
    capacity: 1200,
    weather_vulnerable: false,
};

const LOCAL: LaneSpec = LaneSpec {
    mode: TransportMode::Truck,
    base_cost: 40,
    transit_days: 1,
    capacity: 250,
    weather_vulnerable: true,
};

const EXPRESS: LaneSpec = LaneSpec {
    mode: TransportMode::Express,
    base_cost: 90,
    transit_days: 1,
    capacity: 80,
    weather_vulnerable: false,
};

const AIR: LaneSpec = LaneSpec {
    mode: TransportMode::Air,
    base_cost: 320,
    transit_days: 1,
    capacity: 150,
    weather_vulnerable: true,
};

/// Identifiers for all starting locations.
#[derive(Debug, Clone, Copy)]
pub struct StartingLocationIds {
    /// Overseas bulk vendor.
    pub harbor_vendor: LocationId,
    /// Regional vendor close to the stores.
    pub valley_vendor: LocationId,
    /// Primary distribution warehouse.
    pub north_warehouse: LocationId,
    /// Secondary warehouse.
    pub south_warehouse: LocationId,
    /// Cross-dock hub between warehouses and stores.
    pub crossdock_hub: LocationId,
    /// Downtown store, served via the hub.
    pub downtown_store: LocationId,
    /// Riverside store, served by the south warehouse.
    pub riverside_store: LocationId,
    /// Mountain store with a single road lane plus air.
    pub mountain_store: LocationId,
}

/// Create the default starting network.
///
/// # Errors
///
/// Returns [`WorldError`] if graph construction fails (should not happen
/// with valid hard-coded data).
pub fn create_starting_world() -> Result<(LocationGraph, StartingLocationIds), WorldError> {
    let mut graph = LocationGraph::new();

    let harbor_vendor = loc("Harbor Vendor", LocationType::Vendor, 100_000);
    let valley_vendor = loc("Valley Vendor", LocationType::Vendor, 50_000);
    let north_warehouse = loc("North Warehouse", LocationType::Warehouse, 5_000);
    let south_warehouse = loc("South Warehouse", LocationType::Warehouse, 3_000);
    let crossdock_hub = loc("Crossdock Hub", LocationType::Hub, 1_500);
    let downtown_store = loc("Downtown Store", LocationType::Store, 600);
    let riverside_store = loc("Riverside Store", LocationType::Store, 500);
    let mountain_store = loc("Mountain Store", LocationType::Store, 400);

    let ids = StartingLocationIds {
        harbor_vendor: harbor_vendor.id,
        valley_vendor: valley_vendor.id,
        north_warehouse: north_warehouse.id,
        south_warehouse: south_warehouse.id,
        crossdock_hub: crossdock_hub.id,
        downtown_store: downtown_store.id,
        riverside_store: riverside_store.id,
        mountain_store: mountain_store.id,
    };

    for location in [
        harbor_vendor,
        valley_vendor,
        north_warehouse,
        south_warehouse,
        crossdock_hub,
        downtown_store,
        riverside_store,
        mountain_store,
    ] {
        graph.add_location(location)?;
    }

    let lanes = [
        // Inbound from vendors.
        (ids.harbor_vendor, ids.north_warehouse, &RAIL),
        (ids.harbor_vendor, ids.north_warehouse, &ROAD),
        (ids.valley_vendor, ids.south_warehouse, &ROAD),
        (ids.valley_vendor, ids.downtown_store, &EXPRESS),
        // Warehouse network.
        (ids.north_warehouse, ids.crossdock_hub, &LOCAL),
        (ids.north_warehouse, ids.south_warehouse, &RAIL),
        (ids.south_warehouse, ids.crossdock_hub, &LOCAL),
        (ids.south_warehouse, ids.riverside_store, &LOCAL),
        // Last mile.
        (ids.crossdock_hub, ids.downtown_store, &LOCAL),
        (ids.crossdock_hub, ids.riverside_store, &LOCAL),
        (ids.north_warehouse, ids.mountain_store, &ROAD),
        (ids.north_warehouse, ids.mountain_store, &AIR),
    ];
    for (source, target, spec) in lanes {
        graph.add_route(lane(source, target, spec))?;
    }

    Ok((graph, ids))
}
