//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the simulation behind a read-write lock and a
//! broadcast channel for day summaries. Queries take the read lock and so
//! always see committed state; commands and day-advances take the write
//! lock for the duration of their transaction.

use std::collections::BTreeMap;

use logisim_core::{Simulation, TickSummary};
use logisim_types::{AlertId, LocationId, SpikeId};
use tokio::sync::{RwLock, broadcast};

/// Capacity of the broadcast channel for day summaries.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// Compact, JSON-serializable projection of a committed day.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DayBroadcast {
    /// The new day.
    pub day: u64,
    /// Spikes activated.
    pub spikes_started: Vec<SpikeId>,
    /// Spikes ended.
    pub spikes_ended: Vec<SpikeId>,
    /// Orders delivered.
    pub orders_delivered: usize,
    /// Transfers completed.
    pub transfers_completed: usize,
    /// Reachability from supply per location.
    pub reachability: BTreeMap<LocationId, bool>,
    /// Isolation alerts raised.
    pub alerts_raised: Vec<AlertId>,
    /// Isolation alerts resolved.
    pub alerts_resolved: Vec<AlertId>,
}

impl From<&TickSummary> for DayBroadcast {
    fn from(summary: &TickSummary) -> Self {
        Self {
            day: summary.day,
            spikes_started: summary.spikes_started.clone(),
            spikes_ended: summary.spikes_ended.clone(),
            orders_delivered: summary.orders_delivered.len(),
            transfers_completed: summary.transfers_completed.len(),
            reachability: summary.reachability.clone(),
            alerts_raised: summary.alerts_raised.clone(),
            alerts_resolved: summary.alerts_resolved.clone(),
        }
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug)]
pub struct AppState {
    /// The simulation.
    pub simulation: RwLock<Simulation>,
    /// Broadcast sender for day summaries.
    pub tx: broadcast::Sender<DayBroadcast>,
}

impl AppState {
    /// Serve `simulation`.
    pub fn new(simulation: Simulation) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            simulation: RwLock::new(simulation),
            tx,
        }
    }

    /// Subscribe to day summaries.
    pub fn subscribe(&self) -> broadcast::Receiver<DayBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a committed day to all subscribers.
    ///
    /// Returns the number of receivers that got the message; 0 when nobody
    /// is listening.
    pub fn broadcast(&self, summary: &TickSummary) -> usize {
        self.tx.send(DayBroadcast::from(summary)).unwrap_or(0)
    }
}
