//! Location graph: locations as nodes, routes as directed edges.
//!
//! The [`LocationGraph`] is the spatial backbone of the simulation. It
//! stores every [`Location`] and [`Route`], indexes outbound and inbound
//! routes per location, and enforces route uniqueness per
//! `(source, target, transport_mode)`.
//!
//! Internally, adjacency maps index routes per location:
//! `BTreeMap<LocationId, Vec<RouteId>>`, in insertion order.

use std::collections::BTreeMap;

use logisim_types::{Location, LocationId, Route, RouteId};

use crate::error::WorldError;

/// The graph holding all locations and routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocationGraph {
    /// All locations indexed by their identifier.
    locations: BTreeMap<LocationId, Location>,
    /// All routes indexed by their identifier.
    routes: BTreeMap<RouteId, Route>,
    /// Outbound adjacency: location -> routes departing from it.
    outbound: BTreeMap<LocationId, Vec<RouteId>>,
    /// Inbound adjacency: location -> routes arriving at it.
    inbound: BTreeMap<LocationId, Vec<RouteId>>,
}

impl LocationGraph {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self {
            locations: BTreeMap::new(),
            routes: BTreeMap::new(),
            outbound: BTreeMap::new(),
            inbound: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Locations
    // -------------------------------------------------------------------

    /// Add a location to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateLocation`] if the ID is taken.
    pub fn add_location(&mut self, location: Location) -> Result<(), WorldError> {
        let id = location.id;
        if self.locations.contains_key(&id) {
            return Err(WorldError::DuplicateLocation(id));
        }
        self.locations.insert(id, location);
        self.outbound.entry(id).or_default();
        self.inbound.entry(id).or_default();
        Ok(())
    }

    /// Get a location by ID.
    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    /// Get a mutable location by ID.
    pub fn location_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.get_mut(&id)
    }

    /// Whether the location exists.
    pub fn contains_location(&self, id: LocationId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Number of locations.
    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// All location IDs in key order.
    pub fn location_ids(&self) -> Vec<LocationId> {
        self.locations.keys().copied().collect()
    }

    /// Iterate over all locations.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    // -------------------------------------------------------------------
    // Routes
    // -------------------------------------------------------------------

    /// Add a route to the graph.
    ///
    /// Both endpoints must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::LocationNotFound`] if an endpoint is missing,
    /// [`WorldError::DuplicateRoute`] if the ID is taken, or
    /// [`WorldError::DuplicateLane`] if another route already connects the
    /// same endpoints with the same transport mode.
    pub fn add_route(&mut self, route: Route) -> Result<(), WorldError> {
        if !self.locations.contains_key(&route.source_id) {
            return Err(WorldError::LocationNotFound(route.source_id));
        }
        if !self.locations.contains_key(&route.target_id) {
            return Err(WorldError::LocationNotFound(route.target_id));
        }
        if self.routes.contains_key(&route.id) {
            return Err(WorldError::DuplicateRoute(route.id));
        }
        let lane_taken = self
            .routes_between(route.source_id, route.target_id)
            .any(|r| r.transport_mode == route.transport_mode);
        if lane_taken {
            return Err(WorldError::DuplicateLane {
                source_id: route.source_id,
                target_id: route.target_id,
                mode: route.transport_mode,
            });
        }

        let id = route.id;
        self.outbound.entry(route.source_id).or_default().push(id);
        self.inbound.entry(route.target_id).or_default().push(id);
        self.routes.insert(id, route);
        Ok(())
    }

    /// Get a route by ID.
    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(&id)
    }

    /// Get a mutable route by ID.
    pub fn route_mut(&mut self, id: RouteId) -> Option<&mut Route> {
        self.routes.get_mut(&id)
    }

    /// Number of routes.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Iterate over all routes.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    /// Iterate over all routes mutably.
    pub fn routes_mut(&mut self) -> impl Iterator<Item = &mut Route> {
        self.routes.values_mut()
    }

    // -------------------------------------------------------------------
    // Adjacency
    // -------------------------------------------------------------------

    /// Routes departing from `location`, in insertion order.
    pub fn outbound_routes(&self, location: LocationId) -> impl Iterator<Item = &Route> {
        self.outbound
            .get(&location)
            .into_iter()
            .flatten()
            .filter_map(|id| self.routes.get(id))
    }

    /// Routes arriving at `location`, in insertion order.
    pub fn inbound_routes(&self, location: LocationId) -> impl Iterator<Item = &Route> {
        self.inbound
            .get(&location)
            .into_iter()
            .flatten()
            .filter_map(|id| self.routes.get(id))
    }

    /// Routes from `source` to `target` (one direction only).
    pub fn routes_between(
        &self,
        source: LocationId,
        target: LocationId,
    ) -> impl Iterator<Item = &Route> {
        self.outbound_routes(source)
            .filter(move |r| r.target_id == target)
    }

    /// IDs of routes with `location` at either end.
    pub fn routes_touching(&self, location: LocationId) -> Vec<RouteId> {
        self.outbound_routes(location)
            .chain(self.inbound_routes(location))
            .map(|r| r.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use logisim_types::{LocationType, TransportMode};

    use super::*;

    fn location(name: &str, location_type: LocationType) -> Location {
        Location {
            id: LocationId::new(),
            name: name.to_owned(),
            location_type,
            max_storage: 1000,
        }
    }

    fn route(source: LocationId, target: LocationId, mode: TransportMode) -> Route {
        Route {
            id: RouteId::new(),
            source_id: source,
            target_id: target,
            transport_mode: mode,
            base_cost: 100,
            transit_days: 2,
            capacity: 500,
            active: true,
            weather_vulnerable: false,
        }
    }

    fn two_node_graph() -> (LocationGraph, LocationId, LocationId) {
        let mut graph = LocationGraph::new();
        let a = location("A", LocationType::Warehouse);
        let b = location("B", LocationType::Store);
        let (a_id, b_id) = (a.id, b.id);
        assert!(graph.add_location(a).is_ok());
        assert!(graph.add_location(b).is_ok());
        (graph, a_id, b_id)
    }

    #[test]
    fn duplicate_location_rejected() {
        let mut graph = LocationGraph::new();
        let a = location("A", LocationType::Hub);
        assert!(graph.add_location(a.clone()).is_ok());
        assert!(matches!(
            graph.add_location(a),
            Err(WorldError::DuplicateLocation(_))
        ));
    }

    #[test]
    fn route_requires_both_endpoints() {
        let (mut graph, a, _) = two_node_graph();
        let dangling = route(a, LocationId::new(), TransportMode::Truck);
        assert!(matches!(
            graph.add_route(dangling),
            Err(WorldError::LocationNotFound(_))
        ));
    }

    #[test]
    fn lane_unique_per_mode() {
        let (mut graph, a, b) = two_node_graph();
        assert!(graph.add_route(route(a, b, TransportMode::Truck)).is_ok());
        assert!(graph.add_route(route(a, b, TransportMode::Air)).is_ok());
        assert!(matches!(
            graph.add_route(route(a, b, TransportMode::Truck)),
            Err(WorldError::DuplicateLane { .. })
        ));
        // Reverse direction is a different lane.
        assert!(graph.add_route(route(b, a, TransportMode::Truck)).is_ok());
        assert_eq!(graph.route_count(), 3);
    }

    #[test]
    fn adjacency_is_directional() {
        let (mut graph, a, b) = two_node_graph();
        assert!(graph.add_route(route(a, b, TransportMode::Rail)).is_ok());
        assert_eq!(graph.outbound_routes(a).count(), 1);
        assert_eq!(graph.inbound_routes(a).count(), 0);
        assert_eq!(graph.inbound_routes(b).count(), 1);
        assert_eq!(graph.routes_between(b, a).count(), 0);
        assert_eq!(graph.routes_touching(b).len(), 1);
    }
}
