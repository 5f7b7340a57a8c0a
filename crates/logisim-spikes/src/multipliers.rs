//! Live multiplier queries.
//!
//! Demand and price spikes mutate nothing on apply. Consumers ask for the
//! multiplier that applies to their scope right now, computed by
//! scanning the active spikes. A spike matches a scope when each of its
//! scoping fields is either unset (global) or equal to the queried value.

use logisim_types::{LocationId, ProductId, SpikeEvent, SpikeType};

use crate::arena::SpikeArena;

fn matches_scope(
    spike: &SpikeEvent,
    location: Option<LocationId>,
    product: Option<ProductId>,
) -> bool {
    let location_ok = spike.location_id.is_none_or(|l| Some(l) == location);
    let product_ok = spike.product_id.is_none_or(|p| Some(p) == product);
    location_ok && product_ok
}

fn sum_active(
    arena: &SpikeArena,
    spike_type: SpikeType,
    location: Option<LocationId>,
    product: Option<ProductId>,
) -> f64 {
    arena
        .active()
        .filter(|s| s.spike_type == spike_type)
        .filter(|s| matches_scope(s, location, product))
        .map(|s| s.magnitude)
        .sum()
}

/// Demand multiplier for a product at a location: `1 + Σ magnitudes`.
pub fn demand_multiplier(
    arena: &SpikeArena,
    location: Option<LocationId>,
    product: Option<ProductId>,
) -> f64 {
    1.0 + sum_active(arena, SpikeType::Demand, location, product)
}

/// Purchase price multiplier for a product at a location.
pub fn price_multiplier(
    arena: &SpikeArena,
    location: Option<LocationId>,
    product: Option<ProductId>,
) -> f64 {
    1.0 + sum_active(arena, SpikeType::Price, location, product)
}
