//! Pathfinding and reachability over the location graph.
//!
//! A [`Router`] borrows a [`LocationGraph`] together with the spikes that
//! are active right now and answers three questions:
//!
//! - **Shortest path** -- Dijkstra over active routes, edge weight is the
//!   effective cost `base_cost * (1 + sum of magnitudes of active spikes
//!   scoped to the route)`.
//! - **Reachability from supply** -- backward BFS along inbound active
//!   routes until a warehouse or vendor is visited.
//! - **Premium detection** -- premium transport modes, or a base cost above
//!   the cheapest active alternative on the same lane.
//!
//! Transit quotes stretch `transit_days` by every active delay spike that
//! matches the route (by route, by either endpoint, or unscoped).
//!
//! The router never mutates anything; callers hand it a committed snapshot.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};

use logisim_types::{LocationId, PathLeg, PathQuery, Route, RouteId, SpikeEvent, SpikeType};
use tracing::debug;

use crate::error::RouteError;
use crate::graph::LocationGraph;

/// A resolved path between two locations.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    /// Routes in travel order. Empty when source equals target.
    pub route_ids: Vec<RouteId>,
    /// Sum of effective costs.
    pub total_cost: f64,
    /// Sum of quoted transit days.
    pub transit_days: u32,
    /// Smallest route capacity along the path (`None` for an empty path).
    pub bottleneck_capacity: Option<u32>,
}

/// Priority queue entry: min-heap on cost, ties go to the earlier push.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    seq: u64,
    location: LocationId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the cheapest, then the first seen.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Read-only routing view over a graph and its live disruptions.
#[derive(Debug, Clone)]
pub struct Router<'a> {
    graph: &'a LocationGraph,
    /// Summed magnitudes of active spikes scoped to each route.
    cost_surcharge: BTreeMap<RouteId, f64>,
    /// Active delay spikes, kept for per-route transit matching.
    delays: Vec<&'a SpikeEvent>,
}

impl<'a> Router<'a> {
    /// A router that ignores disruptions.
    pub const fn new(graph: &'a LocationGraph) -> Self {
        Self {
            graph,
            cost_surcharge: BTreeMap::new(),
            delays: Vec::new(),
        }
    }

    /// A router that prices routes under the given spikes.
    ///
    /// Inactive spikes in the iterator are ignored, so callers may pass the
    /// whole spike arena.
    pub fn with_spikes<I>(graph: &'a LocationGraph, spikes: I) -> Self
    where
        I: IntoIterator<Item = &'a SpikeEvent>,
    {
        let mut cost_surcharge: BTreeMap<RouteId, f64> = BTreeMap::new();
        let mut delays = Vec::new();
        for spike in spikes.into_iter().filter(|s| s.active) {
            if let Some(route_id) = spike.route_id {
                *cost_surcharge.entry(route_id).or_insert(0.0) += spike.magnitude;
            }
            if spike.spike_type == SpikeType::Delay {
                delays.push(spike);
            }
        }
        Self {
            graph,
            cost_surcharge,
            delays,
        }
    }

    /// The graph this router reads.
    pub const fn graph(&self) -> &'a LocationGraph {
        self.graph
    }

    // -------------------------------------------------------------------
    // Costs and quotes
    // -------------------------------------------------------------------

    /// Spike-adjusted cost of traversing `route`.
    #[allow(clippy::cast_precision_loss)]
    pub fn effective_cost(&self, route: &Route) -> f64 {
        let surcharge = self.cost_surcharge.get(&route.id).copied().unwrap_or(0.0);
        route.base_cost as f64 * (1.0 + surcharge)
    }

    /// Delay-adjusted transit days for `route`, rounded up.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn quoted_transit_days(&self, route: &Route) -> u32 {
        let stretch: f64 = self
            .delays
            .iter()
            .filter(|s| delay_matches(s, route))
            .map(|s| s.magnitude)
            .sum();
        if stretch <= 0.0 {
            return route.transit_days;
        }
        let quoted = (f64::from(route.transit_days) * (1.0 + stretch)).ceil();
        if quoted >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            quoted as u32
        }
    }

    // -------------------------------------------------------------------
    // Shortest path
    // -------------------------------------------------------------------

    /// Cheapest path from `source` to `target` through active routes.
    ///
    /// Ties between equal-cost frontiers go to whichever was discovered
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnknownLocation`] if an endpoint is missing, or
    /// [`RouteError::NoPath`] if the active subgraph does not connect them.
    pub fn shortest_path(
        &self,
        source: LocationId,
        target: LocationId,
    ) -> Result<ShortestPath, RouteError> {
        for id in [source, target] {
            if !self.graph.contains_location(id) {
                return Err(RouteError::UnknownLocation(id));
            }
        }
        if source == target {
            return Ok(ShortestPath {
                route_ids: Vec::new(),
                total_cost: 0.0,
                transit_days: 0,
                bottleneck_capacity: None,
            });
        }

        let mut dist: BTreeMap<LocationId, f64> = BTreeMap::new();
        let mut via: BTreeMap<LocationId, RouteId> = BTreeMap::new();
        let mut settled: BTreeSet<LocationId> = BTreeSet::new();
        let mut queue = BinaryHeap::new();
        let mut seq: u64 = 0;

        dist.insert(source, 0.0);
        queue.push(Frontier {
            cost: 0.0,
            seq,
            location: source,
        });

        while let Some(Frontier { cost, location, .. }) = queue.pop() {
            if !settled.insert(location) {
                continue; // Stale entry.
            }
            if location == target {
                break;
            }

            for route in self.graph.outbound_routes(location).filter(|r| r.active) {
                let next = route.target_id;
                if settled.contains(&next) {
                    continue;
                }
                let candidate = cost + self.effective_cost(route);
                let improves = dist
                    .get(&next)
                    .is_none_or(|&known| candidate < known);
                if improves {
                    dist.insert(next, candidate);
                    via.insert(next, route.id);
                    seq = seq.saturating_add(1);
                    queue.push(Frontier {
                        cost: candidate,
                        seq,
                        location: next,
                    });
                }
            }
        }

        if !settled.contains(&target) {
            debug!(%source, %target, "no active path");
            return Err(RouteError::NoPath {
                from: source,
                to: target,
            });
        }

        self.reconstruct(source, target, &via, dist.get(&target).copied().unwrap_or(0.0))
    }

    /// Walk the predecessor map back from `target` and total up the legs.
    fn reconstruct(
        &self,
        source: LocationId,
        target: LocationId,
        via: &BTreeMap<LocationId, RouteId>,
        total_cost: f64,
    ) -> Result<ShortestPath, RouteError> {
        let no_path = || RouteError::NoPath {
            from: source,
            to: target,
        };
        let mut legs = VecDeque::new();
        let mut current = target;
        while current != source {
            let route_id = via.get(&current).copied().ok_or_else(no_path)?;
            let route = self.graph.route(route_id).ok_or_else(no_path)?;
            legs.push_front(route);
            current = route.source_id;
        }

        let transit_days = legs
            .iter()
            .map(|r| self.quoted_transit_days(r))
            .fold(0_u32, u32::saturating_add);
        let bottleneck_capacity = legs.iter().map(|r| r.capacity).min();

        Ok(ShortestPath {
            route_ids: legs.iter().map(|r| r.id).collect(),
            total_cost,
            transit_days,
            bottleneck_capacity,
        })
    }

    // -------------------------------------------------------------------
    // Reachability
    // -------------------------------------------------------------------

    /// Whether any warehouse or vendor can ship to `location` over active
    /// routes. A supply source is trivially reachable from itself.
    ///
    /// Unknown locations are unreachable.
    pub fn is_reachable_from_supply(&self, location: LocationId) -> bool {
        if !self.graph.contains_location(location) {
            return false;
        }
        let mut visited: BTreeSet<LocationId> = BTreeSet::new();
        let mut queue: VecDeque<LocationId> = VecDeque::new();
        visited.insert(location);
        queue.push_back(location);

        while let Some(current) = queue.pop_front() {
            let is_supply = self
                .graph
                .location(current)
                .is_some_and(|l| l.location_type.is_supply_source());
            if is_supply {
                return true;
            }
            for route in self.graph.inbound_routes(current).filter(|r| r.active) {
                if visited.insert(route.source_id) {
                    queue.push_back(route.source_id);
                }
            }
        }
        false
    }

    // -------------------------------------------------------------------
    // Premium detection
    // -------------------------------------------------------------------

    /// Whether `route` is a premium option.
    ///
    /// True for premium transport modes, or when the route's base cost
    /// exceeds the cheapest active route on the same `(source, target)`.
    pub fn is_premium(&self, route: &Route) -> bool {
        if route.transport_mode.is_premium() {
            return true;
        }
        self.graph
            .routes_between(route.source_id, route.target_id)
            .filter(|r| r.active)
            .map(|r| r.base_cost)
            .min()
            .is_some_and(|cheapest| route.base_cost > cheapest)
    }

    // -------------------------------------------------------------------
    // GetPath
    // -------------------------------------------------------------------

    /// The presentation-facing path query.
    ///
    /// `success` is false only when an endpoint does not exist; an
    /// unreachable target is a successful query with `reachable = false`.
    pub fn get_path(&self, source: LocationId, target: LocationId) -> PathQuery {
        match self.shortest_path(source, target) {
            Ok(found) => {
                let path = found
                    .route_ids
                    .iter()
                    .filter_map(|id| self.graph.route(*id))
                    .map(|route| PathLeg {
                        route_id: route.id,
                        cost: self.effective_cost(route),
                        transit_days: self.quoted_transit_days(route),
                        is_premium: self.is_premium(route),
                    })
                    .collect();
                PathQuery {
                    success: true,
                    reachable: true,
                    total_cost: found.total_cost,
                    path,
                }
            }
            Err(RouteError::NoPath { .. }) => PathQuery {
                success: true,
                reachable: false,
                total_cost: 0.0,
                path: Vec::new(),
            },
            Err(RouteError::UnknownLocation(_)) => PathQuery {
                success: false,
                reachable: false,
                total_cost: 0.0,
                path: Vec::new(),
            },
        }
    }
}

/// Whether a delay spike stretches transit on `route`.
fn delay_matches(spike: &SpikeEvent, route: &Route) -> bool {
    match (spike.route_id, spike.location_id) {
        (Some(route_id), _) => route_id == route.id,
        (None, Some(location)) => location == route.source_id || location == route.target_id,
        (None, None) => true,
    }
}
