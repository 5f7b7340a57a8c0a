//! Reversible world effects, one strategy per spike type.
//!
//! [`SpikeEffectEngine`] is a lookup table from [`SpikeType`] to a
//! [`SpikeEffect`] strategy. `apply` and `rollback` must be exact inverses:
//!
//! | Type | Apply | Rollback |
//! |------|-------|----------|
//! | `breakdown` | `max_storage *= 1 - magnitude`, original stashed in meta | restore stashed value |
//! | `blizzard` | close scoped weather-vulnerable routes, prior flags stashed | restore each flag |
//! | `demand`, `price` | none (multipliers read live) | none |
//! | `delay` | none (transit stretched at quote time) | none |
//!
//! A type with no registered strategy is a fatal configuration error.

use std::collections::BTreeMap;
use std::fmt::Debug;

use logisim_types::{RouteId, SpikeEvent, SpikeType};
use logisim_world::LocationGraph;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::SpikeError;

/// Meta key holding a breakdown's pre-apply storage capacity.
pub const ORIGINAL_MAX_STORAGE: &str = "original_max_storage";

/// Meta key holding a blizzard's pre-apply route flags.
pub const ORIGINAL_ROUTE_STATES: &str = "original_route_states";

/// A type-specific world effect.
pub trait SpikeEffect: Debug + Send + Sync {
    /// Apply the effect to the world, stashing whatever rollback needs in
    /// `spike.meta`.
    ///
    /// # Errors
    ///
    /// Returns [`SpikeError`] if the spike's scope is missing or dangling.
    fn apply(&self, spike: &mut SpikeEvent, graph: &mut LocationGraph) -> Result<(), SpikeError>;

    /// Undo a previous [`apply`](SpikeEffect::apply) exactly.
    ///
    /// # Errors
    ///
    /// Returns [`SpikeError`] if the stashed state is missing.
    fn rollback(&self, spike: &mut SpikeEvent, graph: &mut LocationGraph)
    -> Result<(), SpikeError>;
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Reduces a location's storage capacity by `magnitude` (a fraction).
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakdownEffect;

impl SpikeEffect for BreakdownEffect {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn apply(&self, spike: &mut SpikeEvent, graph: &mut LocationGraph) -> Result<(), SpikeError> {
        if spike.meta.contains_key(ORIGINAL_MAX_STORAGE) {
            return Err(SpikeError::AlreadyApplied(spike.id));
        }
        let location_id = spike.location_id.ok_or(SpikeError::MissingScope {
            spike: spike.id,
            spike_type: spike.spike_type,
            scope: "location",
        })?;
        let location = graph
            .location_mut(location_id)
            .ok_or(SpikeError::LocationNotFound {
                spike: spike.id,
                location: location_id,
            })?;

        let original = location.max_storage;
        let remaining = (1.0 - spike.magnitude.clamp(0.0, 1.0)).max(0.0);
        // Product of a u32 and a factor in [0, 1] always fits back in u32.
        let reduced = (f64::from(original) * remaining).floor() as u32;
        location.max_storage = reduced;
        spike
            .meta
            .insert(ORIGINAL_MAX_STORAGE.to_owned(), Value::from(original));
        info!(spike = %spike.id, location = %location_id, original, reduced, "breakdown applied");
        Ok(())
    }

    fn rollback(
        &self,
        spike: &mut SpikeEvent,
        graph: &mut LocationGraph,
    ) -> Result<(), SpikeError> {
        let missing = SpikeError::MissingRollbackState {
            spike: spike.id,
            key: ORIGINAL_MAX_STORAGE,
        };
        let original = spike
            .meta
            .get(ORIGINAL_MAX_STORAGE)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| missing.clone())?;
        let location_id = spike.location_id.ok_or(missing)?;
        let location = graph
            .location_mut(location_id)
            .ok_or(SpikeError::LocationNotFound {
                spike: spike.id,
                location: location_id,
            })?;
        location.max_storage = original;
        spike.meta.remove(ORIGINAL_MAX_STORAGE);
        info!(spike = %spike.id, location = %location_id, restored = original, "breakdown rolled back");
        Ok(())
    }
}

/// Closes weather-vulnerable routes.
///
/// Scope resolution: the scoped route if any, otherwise every
/// weather-vulnerable route touching the scoped location, otherwise every
/// weather-vulnerable route in the graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlizzardEffect;

impl BlizzardEffect {
    fn targets(spike: &SpikeEvent, graph: &LocationGraph) -> Result<Vec<RouteId>, SpikeError> {
        if let Some(route_id) = spike.route_id {
            if graph.route(route_id).is_none() {
                return Err(SpikeError::RouteNotFound {
                    spike: spike.id,
                    route: route_id,
                });
            }
            return Ok(vec![route_id]);
        }
        if let Some(location_id) = spike.location_id {
            if !graph.contains_location(location_id) {
                return Err(SpikeError::LocationNotFound {
                    spike: spike.id,
                    location: location_id,
                });
            }
            return Ok(graph
                .routes_touching(location_id)
                .into_iter()
                .filter(|id| graph.route(*id).is_some_and(|r| r.weather_vulnerable))
                .collect());
        }
        Ok(graph
            .routes()
            .filter(|r| r.weather_vulnerable)
            .map(|r| r.id)
            .collect())
    }
}

impl SpikeEffect for BlizzardEffect {
    fn apply(&self, spike: &mut SpikeEvent, graph: &mut LocationGraph) -> Result<(), SpikeError> {
        if spike.meta.contains_key(ORIGINAL_ROUTE_STATES) {
            return Err(SpikeError::AlreadyApplied(spike.id));
        }
        let targets = Self::targets(spike, graph)?;
        let mut original = serde_json::Map::new();
        for route_id in &targets {
            if let Some(route) = graph.route_mut(*route_id) {
                original.insert(route_id.to_string(), Value::Bool(route.active));
                route.active = false;
            }
        }
        info!(spike = %spike.id, closed = original.len(), "blizzard applied");
        spike
            .meta
            .insert(ORIGINAL_ROUTE_STATES.to_owned(), Value::Object(original));
        Ok(())
    }

    fn rollback(
        &self,
        spike: &mut SpikeEvent,
        graph: &mut LocationGraph,
    ) -> Result<(), SpikeError> {
        let Some(Value::Object(original)) = spike.meta.remove(ORIGINAL_ROUTE_STATES) else {
            return Err(SpikeError::MissingRollbackState {
                spike: spike.id,
                key: ORIGINAL_ROUTE_STATES,
            });
        };
        let mut restored = 0_usize;
        for (key, was_active) in &original {
            let Ok(route_id) = key.parse::<RouteId>() else {
                continue;
            };
            if let Some(route) = graph.route_mut(route_id) {
                route.active = was_active.as_bool().unwrap_or(true);
                restored = restored.saturating_add(1);
            }
        }
        info!(spike = %spike.id, restored, "blizzard rolled back");
        Ok(())
    }
}

/// Effect with no persisted mutation: consumers read the spike live.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveReadEffect;

impl SpikeEffect for LiveReadEffect {
    fn apply(&self, spike: &mut SpikeEvent, _graph: &mut LocationGraph) -> Result<(), SpikeError> {
        debug!(spike = %spike.id, spike_type = %spike.spike_type, "live-read spike activated");
        Ok(())
    }

    fn rollback(
        &self,
        spike: &mut SpikeEvent,
        _graph: &mut LocationGraph,
    ) -> Result<(), SpikeError> {
        debug!(spike = %spike.id, spike_type = %spike.spike_type, "live-read spike deactivated");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Strategy table dispatching apply/rollback by spike type.
#[derive(Debug, Default)]
pub struct SpikeEffectEngine {
    strategies: BTreeMap<SpikeType, Box<dyn SpikeEffect>>,
}

impl SpikeEffectEngine {
    /// An engine with no strategies. Every dispatch fails until types are
    /// registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The engine with a strategy for every built-in type.
    pub fn standard() -> Self {
        let mut engine = Self::empty();
        engine.register(SpikeType::Breakdown, Box::new(BreakdownEffect));
        engine.register(SpikeType::Blizzard, Box::new(BlizzardEffect));
        engine.register(SpikeType::Demand, Box::new(LiveReadEffect));
        engine.register(SpikeType::Price, Box::new(LiveReadEffect));
        engine.register(SpikeType::Delay, Box::new(LiveReadEffect));
        engine
    }

    /// Register (or replace) the strategy for `spike_type`.
    pub fn register(&mut self, spike_type: SpikeType, effect: Box<dyn SpikeEffect>) {
        self.strategies.insert(spike_type, effect);
    }

    fn strategy(&self, spike_type: SpikeType) -> Result<&dyn SpikeEffect, SpikeError> {
        self.strategies
            .get(&spike_type)
            .map(AsRef::as_ref)
            .ok_or_else(|| SpikeError::UnknownSpikeType(spike_type.to_string()))
    }

    /// Apply `spike`'s effect.
    ///
    /// # Errors
    ///
    /// Returns [`SpikeError::UnknownSpikeType`] if no strategy is
    /// registered, or whatever the strategy reports.
    pub fn apply(&self, spike: &mut SpikeEvent, graph: &mut LocationGraph) -> Result<(), SpikeError> {
        self.strategy(spike.spike_type)?.apply(spike, graph)
    }

    /// Roll `spike`'s effect back.
    ///
    /// # Errors
    ///
    /// Returns [`SpikeError::UnknownSpikeType`] if no strategy is
    /// registered, or whatever the strategy reports.
    pub fn rollback(
        &self,
        spike: &mut SpikeEvent,
        graph: &mut LocationGraph,
    ) -> Result<(), SpikeError> {
        self.strategy(spike.spike_type)?.rollback(spike, graph)
    }
}
