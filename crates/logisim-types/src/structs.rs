//! Core entity structs for the Logisim simulation.
//!
//! These are the persisted shapes: locations, routes, products, spikes,
//! orders, transfers, alerts, and ledger entries. Behavior lives in the
//! downstream crates; the only methods here are pure window and total
//! helpers that every consumer needs to agree on.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    AlertKind, AlertSeverity, LedgerEntryKind, LocationType, OrderStatus, ResolvedBy, SpikeType,
    TransferStatus, TransportMode,
};
use crate::ids::{
    AlertId, LedgerEntryId, LocationId, OrderId, ProductId, RouteId, SpikeId, TransferId,
};

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A node in the logistics graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Location {
    /// Unique location identifier.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Role in the network.
    pub location_type: LocationType,
    /// Storage capacity in units. Mutated only by breakdown spikes.
    pub max_storage: u32,
}

/// A directed edge between two locations.
///
/// Unique per `(source_id, target_id, transport_mode)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Route {
    /// Unique route identifier.
    pub id: RouteId,
    /// Origin location.
    pub source_id: LocationId,
    /// Destination location.
    pub target_id: LocationId,
    /// How goods travel.
    pub transport_mode: TransportMode,
    /// Cost before spike adjustment.
    pub base_cost: u64,
    /// Transit time in days before delay adjustment.
    pub transit_days: u32,
    /// Maximum units per shipment.
    pub capacity: u32,
    /// Whether the route can currently carry goods. Toggled by blizzards.
    pub active: bool,
    /// Whether blizzards may target this route.
    pub weather_vulnerable: bool,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Vendor list price per unit.
    #[ts(as = "String")]
    pub unit_price: Decimal,
}

// ---------------------------------------------------------------------------
// Spikes
// ---------------------------------------------------------------------------

/// A time-windowed disruption.
///
/// The window is half-open: the spike covers `starts_at_day..ends_at_day`.
/// `active` is the lifecycle flag set by the event tick and is distinct
/// from the window test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpikeEvent {
    /// Unique spike identifier.
    pub id: SpikeId,
    /// Kind of disruption.
    pub spike_type: SpikeType,
    /// Strength; semantics depend on the type.
    pub magnitude: f64,
    /// Length of the window in days.
    pub duration: u32,
    /// Location scope (`None` = not location-scoped).
    pub location_id: Option<LocationId>,
    /// Product scope (`None` = all products).
    pub product_id: Option<ProductId>,
    /// Route scope (`None` = not route-scoped).
    pub route_id: Option<RouteId>,
    /// Non-owning reference to the spike this one was spawned from.
    pub parent_id: Option<SpikeId>,
    /// First day of the window.
    pub starts_at_day: u64,
    /// First day after the window.
    pub ends_at_day: u64,
    /// Whether the effect is currently applied.
    pub active: bool,
    /// Whether the spike came from guaranteed generation.
    pub is_guaranteed: bool,
    /// Day the spike ended.
    pub resolved_at_day: Option<u64>,
    /// Who ended the spike.
    pub resolved_by: Option<ResolvedBy>,
    /// What the player paid to end it early.
    #[ts(as = "Option<String>")]
    pub resolution_cost: Option<Decimal>,
    /// Free-form state stashed for rollback (e.g. original storage).
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl SpikeEvent {
    /// Whether `day` falls inside the half-open window.
    pub const fn covers(&self, day: u64) -> bool {
        self.starts_at_day <= day && day < self.ends_at_day
    }

    /// Whether the spike has been ended, by time or by the player.
    pub const fn is_resolved(&self) -> bool {
        self.resolved_at_day.is_some()
    }

    /// Days left in the window counting `day` itself.
    pub const fn remaining_days(&self, day: u64) -> u64 {
        self.ends_at_day.saturating_sub(day)
    }
}

// ---------------------------------------------------------------------------
// Orders and transfers
// ---------------------------------------------------------------------------

/// One product line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OrderLine {
    /// Product ordered.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: u32,
    /// Price per unit at order time.
    #[ts(as = "String")]
    pub unit_price: Decimal,
}

/// A purchase order from a vendor to one of the player's locations.
///
/// `status` is written only by the order state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Vendor the goods come from.
    pub vendor_id: LocationId,
    /// Location the goods go to.
    pub destination_id: LocationId,
    /// Ordered lines.
    pub lines: Vec<OrderLine>,
    /// Routes the shipment follows, in order.
    pub route_ids: Vec<RouteId>,
    /// Goods plus shipping.
    #[ts(as = "String")]
    pub total_cost: Decimal,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// Day the order was created.
    pub created_day: u64,
    /// Day the order is due, set when it ships.
    pub delivery_day: Option<u64>,
}

impl Order {
    /// Total units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// One product line on a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TransferLine {
    /// Product moved.
    pub product_id: ProductId,
    /// Units moved.
    pub quantity: u32,
}

/// A stock movement between two of the player's locations.
///
/// `status` is written only by the transfer state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Transfer {
    /// Unique transfer identifier.
    pub id: TransferId,
    /// Location the stock leaves.
    pub source_id: LocationId,
    /// Location the stock arrives at.
    pub target_id: LocationId,
    /// Moved lines.
    pub lines: Vec<TransferLine>,
    /// Routes the shipment follows, in order.
    pub route_ids: Vec<RouteId>,
    /// Shipping fee.
    #[ts(as = "String")]
    pub total_cost: Decimal,
    /// Lifecycle state.
    pub status: TransferStatus,
    /// Day the transfer was created.
    pub created_day: u64,
    /// Day the transfer is due, set on dispatch.
    pub delivery_day: Option<u64>,
}

impl Transfer {
    /// Total units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

// ---------------------------------------------------------------------------
// Alerts and ledger
// ---------------------------------------------------------------------------

/// An alert raised by the analysis tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Alert {
    /// Unique alert identifier.
    pub id: AlertId,
    /// Category.
    pub kind: AlertKind,
    /// Severity.
    pub severity: AlertSeverity,
    /// Location the alert concerns.
    pub location_id: LocationId,
    /// Spike most plausibly responsible (non-owning).
    pub spike_event_id: Option<SpikeId>,
    /// Human-readable message.
    pub message: String,
    /// Day the alert was raised.
    pub created_day: u64,
    /// Whether the condition has cleared.
    pub resolved: bool,
    /// Day the condition cleared.
    pub resolved_day: Option<u64>,
}

/// One movement of funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,
    /// Simulation day of the movement.
    pub day: u64,
    /// Why funds moved.
    pub kind: LedgerEntryKind,
    /// Signed amount: negative for debits, positive for credits.
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Balance after the movement.
    #[ts(as = "String")]
    pub balance_after: Decimal,
    /// Related entity (order, transfer, spike), if any.
    pub reference_id: Option<uuid::Uuid>,
}

// ---------------------------------------------------------------------------
// Path query
// ---------------------------------------------------------------------------

/// One leg of a path returned by `GetPath`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PathLeg {
    /// Route taken.
    pub route_id: RouteId,
    /// Effective (spike-adjusted) cost of this leg.
    pub cost: f64,
    /// Quoted (delay-adjusted) transit days of this leg.
    pub transit_days: u32,
    /// Whether the leg uses a premium route.
    pub is_premium: bool,
}

/// Result of the `GetPath` query consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PathQuery {
    /// Whether the query itself was valid (both endpoints exist).
    pub success: bool,
    /// Whether any active path exists.
    pub reachable: bool,
    /// Sum of leg costs.
    pub total_cost: f64,
    /// Legs from source to target.
    pub path: Vec<PathLeg>,
}
