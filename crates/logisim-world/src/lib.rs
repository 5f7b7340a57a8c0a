//! Location graph, routing, and reachability for the Logisim simulation.
//!
//! This crate models the physical network: locations as nodes, routes as
//! directed edges with cost, transit time, capacity, and an active flag,
//! plus the read-only [`Router`] that prices paths under live disruptions.
//!
//! # Modules
//!
//! - [`error`] -- Error types for graph construction and routing.
//! - [`graph`] -- [`LocationGraph`]: nodes, edges, adjacency indexes.
//! - [`router`] -- Dijkstra shortest path, backward-BFS reachability from
//!   supply, premium detection, transit quotes, and `GetPath`.
//! - [`starting_world`] -- Default eight-location starting network.

pub mod error;
pub mod graph;
pub mod router;
pub mod starting_world;

// Re-export primary types at crate root.
pub use error::{RouteError, WorldError};
pub use graph::LocationGraph;
pub use router::{Router, ShortestPath};
pub use starting_world::{StartingLocationIds, create_starting_world};
