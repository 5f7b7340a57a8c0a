//! Day-0 world: starting network, product catalog, stock, and funds.

use logisim_ledger::{LedgerError, Treasury};
use logisim_types::{LocationType, Product, ProductId};
use logisim_world::{StartingLocationIds, WorldError, create_starting_world};
use rust_decimal::Decimal;
use tracing::info;

use crate::config::SimulationConfig;
use crate::state::SimulationState;

/// Errors that can occur while building the starting state.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The starting network could not be built.
    #[error("world seed failed: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The opening balance was rejected.
    #[error("treasury seed failed: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}

/// The seeded state plus handles to its well-known entities.
#[derive(Debug, Clone)]
pub struct StartingWorld {
    /// Day-0 state.
    pub state: SimulationState,
    /// Starting location IDs.
    pub locations: StartingLocationIds,
    /// Product IDs in catalog order.
    pub products: Vec<ProductId>,
}

/// Units per product stocked at each location type on day 0.
const fn opening_stock(location_type: LocationType) -> u32 {
    match location_type {
        LocationType::Warehouse => 300,
        LocationType::Store => 25,
        LocationType::Hub | LocationType::Vendor => 0,
    }
}

fn catalog() -> Vec<Product> {
    [
        ("Canned Goods", Decimal::new(450, 2)),
        ("Bottled Water", Decimal::new(120, 2)),
        ("Batteries", Decimal::new(875, 2)),
    ]
    .into_iter()
    .map(|(name, unit_price)| Product {
        id: ProductId::new(),
        name: name.to_owned(),
        unit_price,
    })
    .collect()
}

/// Build the day-0 state.
///
/// The mountain store starts with a thin shelf so that losing its
/// weather-exposed lanes puts it under the default alert threshold.
///
/// # Errors
///
/// Returns [`SeedError`] if the network or treasury cannot be built.
pub fn create_starting_state(config: &SimulationConfig) -> Result<StartingWorld, SeedError> {
    let (graph, locations) = create_starting_world()?;
    let products = catalog();
    let product_ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
    let treasury = Treasury::with_opening_balance(config.world.starting_funds)?;
    let mut state = SimulationState::new(graph, products, treasury);

    let stocked: Vec<(_, u32)> = state
        .graph
        .locations()
        .map(|l| {
            let units = if l.id == locations.mountain_store {
                10
            } else {
                opening_stock(l.location_type)
            };
            (l.id, units)
        })
        .filter(|(_, units)| *units > 0)
        .collect();
    for (location, units) in stocked {
        for product in &product_ids {
            state.add_stock(location, *product, units);
        }
    }

    info!(
        world = %config.world.name,
        locations = state.graph.location_count(),
        routes = state.graph.route_count(),
        products = product_ids.len(),
        funds = %state.treasury.balance(),
        "starting state created"
    );
    Ok(StartingWorld {
        state,
        locations,
        products: product_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_state_is_stocked_and_funded() {
        let result = create_starting_state(&SimulationConfig::default());
        assert!(result.is_ok());
        if let Ok(world) = result {
            let state = &world.state;
            assert_eq!(state.day(), 0);
            assert_eq!(state.products.len(), 3);
            assert_eq!(state.treasury.balance(), Decimal::new(25_000, 0));
            assert_eq!(state.stock(world.locations.north_warehouse), 900);
            assert_eq!(state.stock(world.locations.downtown_store), 75);
            assert_eq!(state.stock(world.locations.mountain_store), 30);
            assert_eq!(state.stock(world.locations.harbor_vendor), 0);
            assert!(state.spikes.is_empty());
        }
    }
}
