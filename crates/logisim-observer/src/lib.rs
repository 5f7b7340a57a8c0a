//! Observer API server for the Logisim simulation.
//!
//! This crate provides an Axum HTTP server over a shared [`Simulation`]:
//!
//! - **Query endpoints** for status, `GetPath`, locations with
//!   reachability, spikes, and isolation alerts
//! - **Command endpoints** to advance a day or pay to resolve a spike
//!
//! # Architecture
//!
//! The simulation sits behind a [`tokio::sync::RwLock`] in [`AppState`].
//! Queries share the read lock and see only committed state; each command
//! holds the write lock for exactly one transaction. Committed days are
//! also published on a broadcast channel as [`DayBroadcast`]s.
//!
//! [`Simulation`]: logisim_core::Simulation

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, DayBroadcast};
