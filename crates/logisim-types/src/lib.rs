//! Shared type definitions for the Logisim supply-chain simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Logisim workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the presentation layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Location, transport, spike, lifecycle, and alert enums
//! - [`structs`] -- Entity structs (locations, routes, spikes, orders, alerts)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AlertKind, AlertSeverity, LedgerEntryKind, LocationType, OrderStatus, ResolvedBy, SpikeType,
    TransferStatus, TransportMode, UnknownSpikeType,
};
pub use ids::{AlertId, LedgerEntryId, LocationId, OrderId, ProductId, RouteId, SpikeId, TransferId};
pub use structs::{
    Alert, LedgerEntry, Location, Order, OrderLine, PathLeg, PathQuery, Product, Route,
    SpikeEvent, Transfer, TransferLine,
};
