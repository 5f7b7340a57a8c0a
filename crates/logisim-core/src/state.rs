//! The complete mutable state of one simulation.
//!
//! Every operation takes the state explicitly; there is no ambient global.
//! The state is `Clone` so a transaction can work on a private copy and
//! swap it in on commit (see [`UnitOfWork`](crate::unit_of_work::UnitOfWork)).

use std::collections::BTreeMap;

use logisim_ledger::Treasury;
use logisim_spikes::SpikeArena;
use logisim_types::{
    Alert, AlertKind, LocationId, Order, OrderId, Product, ProductId, Transfer, TransferId,
};
use logisim_world::{LocationGraph, Router};

use crate::clock::DayClock;

/// Not enough stock to remove the requested quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("only {available} units available")]
pub struct StockShortfall {
    /// Units on hand.
    pub available: u32,
}

/// Everything one simulation owns.
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    /// Current day.
    pub clock: DayClock,
    /// Locations and routes.
    pub graph: LocationGraph,
    /// Every spike ever generated.
    pub spikes: SpikeArena,
    /// Product catalog.
    pub products: BTreeMap<ProductId, Product>,
    /// Units on hand per location and product.
    pub inventory: BTreeMap<LocationId, BTreeMap<ProductId, u32>>,
    /// Every purchase order.
    pub orders: BTreeMap<OrderId, Order>,
    /// Every transfer.
    pub transfers: BTreeMap<TransferId, Transfer>,
    /// Every alert, oldest first.
    pub alerts: Vec<Alert>,
    /// Funds and ledger.
    pub treasury: Treasury,
    /// Reachability from supply as of the last analysis tick.
    pub reachability: BTreeMap<LocationId, bool>,
}

impl SimulationState {
    /// A state with no world (tests and listeners that need a placeholder).
    pub fn empty() -> Self {
        Self::default()
    }

    /// A day-0 state over `graph`.
    pub fn new(graph: LocationGraph, products: Vec<Product>, treasury: Treasury) -> Self {
        Self {
            graph,
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            treasury,
            ..Self::default()
        }
    }

    /// The current day.
    pub const fn day(&self) -> u64 {
        self.clock.day()
    }

    /// A router over the current graph and active spikes.
    pub fn router(&self) -> Router<'_> {
        Router::with_spikes(&self.graph, self.spikes.iter())
    }

    /// Product IDs in catalog order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.products.keys().copied().collect()
    }

    // -------------------------------------------------------------------
    // Inventory
    // -------------------------------------------------------------------

    /// Total units of every product at `location`.
    pub fn stock(&self, location: LocationId) -> u64 {
        self.inventory
            .get(&location)
            .map_or(0, |items| items.values().map(|q| u64::from(*q)).sum())
    }

    /// Units of `product` at `location`.
    pub fn stock_of(&self, location: LocationId, product: ProductId) -> u32 {
        self.inventory
            .get(&location)
            .and_then(|items| items.get(&product))
            .copied()
            .unwrap_or(0)
    }

    /// Add units, saturating at `u32::MAX`.
    pub fn add_stock(&mut self, location: LocationId, product: ProductId, quantity: u32) {
        let slot = self
            .inventory
            .entry(location)
            .or_default()
            .entry(product)
            .or_insert(0);
        *slot = slot.saturating_add(quantity);
    }

    /// Remove units; all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StockShortfall`] if fewer than `quantity` are on hand.
    pub fn remove_stock(
        &mut self,
        location: LocationId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), StockShortfall> {
        let available = self.stock_of(location, product);
        let remaining = available
            .checked_sub(quantity)
            .ok_or(StockShortfall { available })?;
        if let Some(items) = self.inventory.get_mut(&location) {
            items.insert(product, remaining);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Alerts
    // -------------------------------------------------------------------

    /// The open isolation alert for `location`, if any.
    pub fn open_isolation_alert(&self, location: LocationId) -> Option<&Alert> {
        self.alerts
            .iter()
            .find(|a| a.kind == AlertKind::Isolation && a.location_id == location && !a.resolved)
    }

    /// Alerts not yet resolved.
    pub fn unresolved_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| !a.resolved)
    }
}
