//! Error types for the `logisim-world` crate.
//!
//! Graph construction failures surface as [`WorldError`]; routing failures
//! that a caller can correct (no path, unknown endpoint) as [`RouteError`].

use logisim_types::{LocationId, RouteId, TransportMode};

/// Errors that can occur while building or mutating the location graph.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A location was not found in the graph.
    #[error("location not found: {0}")]
    LocationNotFound(LocationId),

    /// A route was not found in the graph.
    #[error("route not found: {0}")]
    RouteNotFound(RouteId),

    /// A location with the same ID already exists.
    #[error("duplicate location id: {0}")]
    DuplicateLocation(LocationId),

    /// A route with the same ID already exists.
    #[error("duplicate route id: {0}")]
    DuplicateRoute(RouteId),

    /// A route already connects the same endpoints with the same mode.
    #[error("route {source_id} -> {target_id} by {mode:?} already exists")]
    DuplicateLane {
        /// Origin location.
        source_id: LocationId,
        /// Destination location.
        target_id: LocationId,
        /// Transport mode shared by both routes.
        mode: TransportMode,
    },
}

/// Errors returned by routing queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// One of the endpoints does not exist.
    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    /// No path exists through active routes.
    #[error("no path found from {from} to {to}")]
    NoPath {
        /// Origin location.
        from: LocationId,
        /// Destination location.
        to: LocationId,
    },
}
