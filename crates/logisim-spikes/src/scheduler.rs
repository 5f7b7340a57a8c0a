//! Random and guaranteed spike generation.
//!
//! Both generators share one pipeline:
//!
//! 1. Pick a duration and check the concurrency cap over the window.
//! 2. Narrow the candidate types by cooldown.
//! 3. Weighted-random type selection.
//! 4. Roll a magnitude from the type's range and pick a scope.
//!
//! Random spikes start the day after generation. Guaranteed spikes start
//! on the generation day, ignore the random roll, relax cooldown when it
//! would exclude every type, and retry other types when a type has no
//! valid target. A failed step is reported as [`ScheduleOutcome::Skipped`],
//! never as an error.
//!
//! The scheduler only inserts spikes into the arena. Activation and effect
//! application belong to the caller.

use std::collections::{BTreeMap, BTreeSet};

use logisim_types::{LocationId, LocationType, ProductId, RouteId, SpikeEvent, SpikeId, SpikeType};
use logisim_world::LocationGraph;
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::arena::SpikeArena;
use crate::constraints::SpikeConstraintChecker;
use crate::error::SpikeError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Inclusive magnitude range for one spike type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeRange {
    /// Smallest magnitude.
    pub min: f64,
    /// Largest magnitude.
    pub max: f64,
}

impl MagnitudeRange {
    /// Build a range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Spike generation settings (`spikes:` section of the config file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Most spike windows allowed to cover any single day.
    #[serde(default = "default_max_active_spikes")]
    pub max_active_spikes: usize,

    /// Minimum gap in days between starts of the same type.
    #[serde(default = "default_cooldown_days")]
    pub cooldown_days: u64,

    /// Probability that a random spike is attempted on a given day.
    #[serde(default = "default_random_chance")]
    pub random_chance: f64,

    /// Type weights for random generation.
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<SpikeType, u32>,

    /// Type weights for guaranteed generation and seeding.
    #[serde(default = "default_guaranteed_weights")]
    pub guaranteed_weights: BTreeMap<SpikeType, u32>,

    /// Shortest spike in days.
    #[serde(default = "default_min_duration")]
    pub min_duration: u32,

    /// Longest spike in days.
    #[serde(default = "default_max_duration")]
    pub max_duration: u32,

    /// Days on which guaranteed generation never fires (`day <= grace`).
    #[serde(default = "default_tutorial_grace_days")]
    pub tutorial_grace_days: u64,

    /// Quiet days after which the day cycle forces a guaranteed spike.
    #[serde(default = "default_guaranteed_gap_days")]
    pub guaranteed_gap_days: u64,

    /// Fewest spikes seeded at world creation.
    #[serde(default = "default_seed_min_count")]
    pub seed_min_count: u32,

    /// Most spikes seeded at world creation.
    #[serde(default = "default_seed_max_count")]
    pub seed_max_count: u32,

    /// First day a seeded spike may start.
    #[serde(default = "default_seed_first_day")]
    pub seed_first_day: u64,

    /// Last day a seeded spike may start.
    #[serde(default = "default_seed_last_day")]
    pub seed_last_day: u64,

    /// Magnitude range per type.
    #[serde(default = "default_magnitudes")]
    pub magnitudes: BTreeMap<SpikeType, MagnitudeRange>,

    /// Daily cost of ending a spike early, per player-resolvable type.
    #[serde(default = "default_resolution_base_costs")]
    pub resolution_base_costs: BTreeMap<SpikeType, Decimal>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_active_spikes: default_max_active_spikes(),
            cooldown_days: default_cooldown_days(),
            random_chance: default_random_chance(),
            weights: default_weights(),
            guaranteed_weights: default_guaranteed_weights(),
            min_duration: default_min_duration(),
            max_duration: default_max_duration(),
            tutorial_grace_days: default_tutorial_grace_days(),
            guaranteed_gap_days: default_guaranteed_gap_days(),
            seed_min_count: default_seed_min_count(),
            seed_max_count: default_seed_max_count(),
            seed_first_day: default_seed_first_day(),
            seed_last_day: default_seed_last_day(),
            magnitudes: default_magnitudes(),
            resolution_base_costs: default_resolution_base_costs(),
        }
    }
}

impl SchedulerConfig {
    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SpikeError::InvalidConfig`] naming the first bad setting.
    pub fn validate(&self) -> Result<(), SpikeError> {
        let fail = |msg: &str| Err(SpikeError::InvalidConfig(msg.to_owned()));
        if self.max_active_spikes == 0 {
            return fail("max_active_spikes must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.random_chance) {
            return fail("random_chance must be within 0..=1");
        }
        if self.min_duration == 0 || self.min_duration > self.max_duration {
            return fail("durations must satisfy 1 <= min_duration <= max_duration");
        }
        if self.weights.values().all(|w| *w == 0) {
            return fail("weights must contain a positive entry");
        }
        if self.guaranteed_weights.values().all(|w| *w == 0) {
            return fail("guaranteed_weights must contain a positive entry");
        }
        if self.seed_min_count > self.seed_max_count {
            return fail("seed_min_count must not exceed seed_max_count");
        }
        if self.seed_first_day > self.seed_last_day {
            return fail("seed_first_day must not exceed seed_last_day");
        }
        if self
            .magnitudes
            .values()
            .any(|r| !r.min.is_finite() || !r.max.is_finite() || r.min > r.max)
        {
            return fail("magnitude ranges must be finite with min <= max");
        }
        if self.resolution_base_costs.values().any(Decimal::is_sign_negative) {
            return fail("resolution_base_costs must not be negative");
        }
        Ok(())
    }

    /// The magnitude range for `spike_type`, `0.5..=0.5` if unconfigured.
    pub fn magnitude_range(&self, spike_type: SpikeType) -> MagnitudeRange {
        self.magnitudes
            .get(&spike_type)
            .copied()
            .unwrap_or(MagnitudeRange::new(0.5, 0.5))
    }
}

const fn default_max_active_spikes() -> usize {
    2
}

const fn default_cooldown_days() -> u64 {
    2
}

const fn default_random_chance() -> f64 {
    0.35
}

fn default_weights() -> BTreeMap<SpikeType, u32> {
    BTreeMap::from([
        (SpikeType::Demand, 40),
        (SpikeType::Delay, 20),
        (SpikeType::Price, 30),
        (SpikeType::Breakdown, 10),
    ])
}

fn default_guaranteed_weights() -> BTreeMap<SpikeType, u32> {
    BTreeMap::from([
        (SpikeType::Demand, 30),
        (SpikeType::Delay, 20),
        (SpikeType::Price, 20),
        (SpikeType::Breakdown, 15),
        (SpikeType::Blizzard, 15),
    ])
}

const fn default_min_duration() -> u32 {
    2
}

const fn default_max_duration() -> u32 {
    5
}

const fn default_tutorial_grace_days() -> u64 {
    1
}

const fn default_guaranteed_gap_days() -> u64 {
    3
}

const fn default_seed_min_count() -> u32 {
    3
}

const fn default_seed_max_count() -> u32 {
    5
}

const fn default_seed_first_day() -> u64 {
    2
}

const fn default_seed_last_day() -> u64 {
    15
}

fn default_magnitudes() -> BTreeMap<SpikeType, MagnitudeRange> {
    BTreeMap::from([
        (SpikeType::Demand, MagnitudeRange::new(0.2, 0.6)),
        (SpikeType::Delay, MagnitudeRange::new(0.3, 1.0)),
        (SpikeType::Price, MagnitudeRange::new(0.1, 0.4)),
        (SpikeType::Breakdown, MagnitudeRange::new(0.2, 0.5)),
        (SpikeType::Blizzard, MagnitudeRange::new(1.0, 1.0)),
    ])
}

fn default_resolution_base_costs() -> BTreeMap<SpikeType, Decimal> {
    BTreeMap::from([
        (SpikeType::Breakdown, Decimal::new(500, 0)),
        (SpikeType::Blizzard, Decimal::new(750, 0)),
    ])
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a generation attempt produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The random roll failed.
    NotRolled,
    /// A day in the window already hosts the maximum number of spikes.
    AtCapacity,
    /// Cooldown excluded every candidate type.
    CooldownExhausted,
    /// No valid location or route exists for the chosen type(s).
    NoTarget,
    /// Guaranteed generation is suppressed during the opening days.
    TutorialGrace,
}

/// Result of a generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A spike was inserted into the arena.
    Generated(SpikeId),
    /// Nothing was generated.
    Skipped(SkipReason),
}

impl ScheduleOutcome {
    /// The generated spike, if any.
    pub const fn spike_id(self) -> Option<SpikeId> {
        match self {
            Self::Generated(id) => Some(id),
            Self::Skipped(_) => None,
        }
    }
}

/// Where a spike applies.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    location_id: Option<LocationId>,
    product_id: Option<ProductId>,
    route_id: Option<RouteId>,
}

/// Everything generation reads besides the arena.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    /// The location graph, for scope selection.
    pub graph: &'a LocationGraph,
    /// Products eligible for product-scoped spikes.
    pub products: &'a [ProductId],
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Spike generator bound to a configuration.
#[derive(Debug, Clone, Default)]
pub struct SpikeScheduler {
    config: SchedulerConfig,
}

impl SpikeScheduler {
    /// Create a scheduler after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SpikeError::InvalidConfig`] if the config is inconsistent.
    pub fn new(config: SchedulerConfig) -> Result<Self, SpikeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// A constraint checker over `arena` using this scheduler's limits.
    pub const fn checker<'a>(&self, arena: &'a SpikeArena) -> SpikeConstraintChecker<'a> {
        SpikeConstraintChecker::new(arena, self.config.max_active_spikes, self.config.cooldown_days)
    }

    /// Attempt a random spike for `day`. The window starts on `day + 1`.
    pub fn generate_random(
        &self,
        day: u64,
        world: WorldView<'_>,
        arena: &mut SpikeArena,
        rng: &mut impl Rng,
    ) -> ScheduleOutcome {
        if !rng.random_bool(self.config.random_chance) {
            return ScheduleOutcome::Skipped(SkipReason::NotRolled);
        }
        let duration = self.roll_duration(rng);
        let start = day.saturating_add(1);
        let checker = self.checker(arena);
        if !checker.can_schedule(start, duration) {
            debug!(day, start, duration, "random spike skipped: at capacity");
            return ScheduleOutcome::Skipped(SkipReason::AtCapacity);
        }
        let allowed = checker.allowed_types(start, positive_types(&self.config.weights));
        let Some(spike_type) = pick_weighted(&self.config.weights, &allowed, rng) else {
            debug!(day, start, "random spike skipped: every type cooling down");
            return ScheduleOutcome::Skipped(SkipReason::CooldownExhausted);
        };
        let end = start.saturating_add(u64::from(duration));
        let Some(scope) = choose_scope(spike_type, day, end, world, arena, rng) else {
            debug!(day, %spike_type, "random spike skipped: no valid target");
            return ScheduleOutcome::Skipped(SkipReason::NoTarget);
        };
        let spike = self.build(spike_type, start, duration, scope, false, rng);
        let id = arena.insert(spike);
        info!(spike = %id, %spike_type, start, end, "random spike generated");
        ScheduleOutcome::Generated(id)
    }

    /// Attempt a guaranteed spike starting on `day`.
    pub fn generate_guaranteed(
        &self,
        day: u64,
        world: WorldView<'_>,
        arena: &mut SpikeArena,
        rng: &mut impl Rng,
    ) -> ScheduleOutcome {
        if day <= self.config.tutorial_grace_days {
            return ScheduleOutcome::Skipped(SkipReason::TutorialGrace);
        }
        let duration = self.roll_duration(rng);
        let checker = self.checker(arena);
        if !checker.can_schedule(day, duration) {
            debug!(day, duration, "guaranteed spike skipped: at capacity");
            return ScheduleOutcome::Skipped(SkipReason::AtCapacity);
        }

        let candidates: BTreeSet<SpikeType> =
            positive_types(&self.config.guaranteed_weights).collect();
        let mut allowed = checker.allowed_types(day, candidates.iter().copied());
        if allowed.is_empty() {
            debug!(day, "cooldown excluded every type, relaxing to full set");
            allowed = candidates;
        }

        let end = day.saturating_add(u64::from(duration));
        while let Some(spike_type) = pick_weighted(&self.config.guaranteed_weights, &allowed, rng) {
            let Some(scope) = choose_scope(spike_type, day, end, world, arena, rng) else {
                allowed.remove(&spike_type);
                continue;
            };
            let spike = self.build(spike_type, day, duration, scope, true, rng);
            let id = arena.insert(spike);
            info!(spike = %id, %spike_type, start = day, end, "guaranteed spike generated");
            return ScheduleOutcome::Generated(id);
        }
        debug!(day, "guaranteed spike skipped: no type has a valid target");
        ScheduleOutcome::Skipped(SkipReason::NoTarget)
    }

    /// Pre-populate the early game with guaranteed spikes on random days in
    /// the seeding range. Returns the IDs generated, at most
    /// `seed_max_count`; attempts are bounded so a crowded range simply
    /// yields fewer spikes.
    pub fn seed_guaranteed(
        &self,
        world: WorldView<'_>,
        arena: &mut SpikeArena,
        rng: &mut impl Rng,
    ) -> Vec<SpikeId> {
        let target = rng.random_range(self.config.seed_min_count..=self.config.seed_max_count);
        let max_attempts = target.saturating_mul(10);
        let mut seeded = Vec::new();
        let mut attempts = 0_u32;
        while u32::try_from(seeded.len()).unwrap_or(u32::MAX) < target && attempts < max_attempts {
            attempts = attempts.saturating_add(1);
            let day = rng.random_range(self.config.seed_first_day..=self.config.seed_last_day);
            if let ScheduleOutcome::Generated(id) = self.generate_guaranteed(day, world, arena, rng)
            {
                seeded.push(id);
            }
        }
        info!(target, seeded = seeded.len(), attempts, "guaranteed spikes seeded");
        seeded
    }

    /// What the player pays to end `spike` early on `day`: the type's base
    /// cost times the remaining days (at least one).
    ///
    /// # Errors
    ///
    /// Returns [`SpikeError::NotPlayerResolvable`] for types that cannot be
    /// ended early or have no configured base cost.
    pub fn resolution_cost(&self, spike: &SpikeEvent, day: u64) -> Result<Decimal, SpikeError> {
        if !spike.spike_type.is_player_resolvable() {
            return Err(SpikeError::NotPlayerResolvable(spike.spike_type));
        }
        let base = self
            .config
            .resolution_base_costs
            .get(&spike.spike_type)
            .copied()
            .ok_or(SpikeError::NotPlayerResolvable(spike.spike_type))?;
        let days = Decimal::from(spike.remaining_days(day).max(1));
        base.checked_mul(days)
            .ok_or_else(|| SpikeError::InvalidConfig("resolution cost overflow".to_owned()))
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    fn roll_duration(&self, rng: &mut impl Rng) -> u32 {
        rng.random_range(self.config.min_duration..=self.config.max_duration)
    }

    fn roll_magnitude(&self, spike_type: SpikeType, rng: &mut impl Rng) -> f64 {
        let range = self.config.magnitude_range(spike_type);
        let raw = if range.min < range.max {
            rng.random_range(range.min..=range.max)
        } else {
            range.min
        };
        (raw * 100.0).round() / 100.0
    }

    fn build(
        &self,
        spike_type: SpikeType,
        start: u64,
        duration: u32,
        scope: Scope,
        is_guaranteed: bool,
        rng: &mut impl Rng,
    ) -> SpikeEvent {
        SpikeEvent {
            id: SpikeId::new(),
            spike_type,
            magnitude: self.roll_magnitude(spike_type, rng),
            duration,
            location_id: scope.location_id,
            product_id: scope.product_id,
            route_id: scope.route_id,
            parent_id: None,
            starts_at_day: start,
            ends_at_day: start.saturating_add(u64::from(duration)),
            active: false,
            is_guaranteed,
            resolved_at_day: None,
            resolved_by: None,
            resolution_cost: None,
            meta: BTreeMap::new(),
        }
    }
}

fn positive_types(weights: &BTreeMap<SpikeType, u32>) -> impl Iterator<Item = SpikeType> + '_ {
    weights.iter().filter(|(_, w)| **w > 0).map(|(t, _)| *t)
}

/// Weighted pick among `allowed` types. `None` if nothing has weight.
fn pick_weighted(
    weights: &BTreeMap<SpikeType, u32>,
    allowed: &BTreeSet<SpikeType>,
    rng: &mut impl Rng,
) -> Option<SpikeType> {
    let pool: Vec<(SpikeType, u64)> = allowed
        .iter()
        .filter_map(|t| weights.get(t).map(|w| (*t, u64::from(*w))))
        .filter(|(_, w)| *w > 0)
        .collect();
    let total: u64 = pool.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for (spike_type, weight) in &pool {
        if roll < *weight {
            return Some(*spike_type);
        }
        roll = roll.saturating_sub(*weight);
    }
    pool.last().map(|(t, _)| *t)
}

/// Whether an unfinished spike's lifetime overlaps `from..end`.
fn overlaps(spike: &SpikeEvent, from: u64, end: u64) -> bool {
    !spike.is_resolved() && (spike.active || (spike.starts_at_day < end && from < spike.ends_at_day))
}

/// Pick a scope for `spike_type`. Breakdowns and blizzards avoid targets
/// already held by an overlapping spike of the same type, so stashed
/// originals never nest.
fn choose_scope(
    spike_type: SpikeType,
    from: u64,
    end: u64,
    world: WorldView<'_>,
    arena: &SpikeArena,
    rng: &mut impl Rng,
) -> Option<Scope> {
    let graph = world.graph;
    match spike_type {
        SpikeType::Demand | SpikeType::Price => {
            let stores: Vec<LocationId> = graph
                .locations()
                .filter(|l| l.location_type == LocationType::Store)
                .map(|l| l.id)
                .collect();
            let location_id = if rng.random_bool(0.5) {
                stores.choose(rng).copied()
            } else {
                None
            };
            let product_id = if rng.random_bool(0.5) {
                world.products.choose(rng).copied()
            } else {
                None
            };
            Some(Scope {
                location_id,
                product_id,
                route_id: None,
            })
        }
        SpikeType::Delay => {
            let routes: Vec<RouteId> = graph.routes().filter(|r| r.active).map(|r| r.id).collect();
            let route_id = if rng.random_bool(0.5) {
                routes.choose(rng).copied()
            } else {
                None
            };
            Some(Scope {
                route_id,
                ..Scope::default()
            })
        }
        SpikeType::Breakdown => {
            let candidates: Vec<LocationId> = graph
                .locations()
                .filter(|l| l.location_type != LocationType::Vendor)
                .filter(|l| {
                    !arena.iter().any(|s| {
                        s.spike_type == SpikeType::Breakdown
                            && s.location_id == Some(l.id)
                            && overlaps(s, from, end)
                    })
                })
                .map(|l| l.id)
                .collect();
            candidates.choose(rng).map(|id| Scope {
                location_id: Some(*id),
                ..Scope::default()
            })
        }
        SpikeType::Blizzard => {
            let candidates: Vec<RouteId> = graph
                .routes()
                .filter(|r| r.active && r.weather_vulnerable)
                .filter(|r| {
                    !arena.iter().any(|s| {
                        s.spike_type == SpikeType::Blizzard
                            && s.route_id == Some(r.id)
                            && overlaps(s, from, end)
                    })
                })
                .map(|r| r.id)
                .collect();
            candidates.choose(rng).map(|id| Scope {
                route_id: Some(*id),
                ..Scope::default()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use logisim_types::{Location, Route, TransportMode};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    use super::*;

    fn world() -> (LocationGraph, Vec<ProductId>) {
        let mut graph = LocationGraph::new();
        let mut ids = Vec::new();
        for (name, location_type) in [
            ("vendor", LocationType::Vendor),
            ("warehouse", LocationType::Warehouse),
            ("store", LocationType::Store),
        ] {
            let location = Location {
                id: LocationId::new(),
                name: name.to_owned(),
                location_type,
                max_storage: 500,
            };
            ids.push(location.id);
            assert!(graph.add_location(location).is_ok());
        }
        for pair in ids.windows(2) {
            if let [source, target] = pair {
                let route = Route {
                    id: RouteId::new(),
                    source_id: *source,
                    target_id: *target,
                    transport_mode: TransportMode::Truck,
                    base_cost: 100,
                    transit_days: 2,
                    capacity: 100,
                    active: true,
                    weather_vulnerable: true,
                };
                assert!(graph.add_route(route).is_ok());
            }
        }
        (graph, vec![ProductId::new(), ProductId::new()])
    }

    fn existing(spike_type: SpikeType, start: u64, end: u64) -> SpikeEvent {
        SpikeEvent {
            id: SpikeId::new(),
            spike_type,
            magnitude: 0.5,
            duration: u32::try_from(end.saturating_sub(start)).unwrap_or(0),
            location_id: None,
            product_id: None,
            route_id: None,
            parent_id: None,
            starts_at_day: start,
            ends_at_day: end,
            active: false,
            is_guaranteed: false,
            resolved_at_day: None,
            resolved_by: None,
            resolution_cost: None,
            meta: BTreeMap::new(),
        }
    }

    fn always() -> SchedulerConfig {
        SchedulerConfig {
            random_chance: 1.0,
            ..SchedulerConfig::default()
        }
    }

    fn scheduler(config: SchedulerConfig) -> SpikeScheduler {
        SpikeScheduler::new(config).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    #[test]
    fn defaults_are_valid() {
        assert!(SchedulerConfig::default().validate().is_ok());
        let config = SchedulerConfig::default();
        assert_eq!(config.weights.get(&SpikeType::Demand), Some(&40));
        assert_eq!(config.weights.get(&SpikeType::Blizzard), None);
        assert_eq!((config.min_duration, config.max_duration), (2, 5));
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = "max_active_spikes: 3\nweights:\n  demand: 1\n";
        let parsed: Result<SchedulerConfig, _> = serde_yml::from_str(yaml);
        assert!(parsed.is_ok());
        if let Ok(config) = parsed {
            assert_eq!(config.max_active_spikes, 3);
            assert_eq!(config.weights.len(), 1);
            assert_eq!(config.cooldown_days, 2);
        }
    }

    #[test]
    fn invalid_durations_rejected() {
        let config = SchedulerConfig {
            min_duration: 6,
            ..SchedulerConfig::default()
        };
        assert!(matches!(
            SpikeScheduler::new(config),
            Err(SpikeError::InvalidConfig(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Random generation
    // -----------------------------------------------------------------------

    #[test]
    fn zero_chance_never_rolls() {
        let (graph, products) = world();
        let world = WorldView { graph: &graph, products: &products };
        let s = scheduler(SchedulerConfig {
            random_chance: 0.0,
            ..SchedulerConfig::default()
        });
        let mut arena = SpikeArena::new();
        let mut rng = StdRng::seed_from_u64(1);
        for day in 1..50 {
            assert_eq!(
                s.generate_random(day, world, &mut arena, &mut rng),
                ScheduleOutcome::Skipped(SkipReason::NotRolled)
            );
        }
        assert!(arena.is_empty());
    }

    #[test]
    fn random_spike_starts_next_day_within_bounds() {
        let (graph, products) = world();
        let world = WorldView { graph: &graph, products: &products };
        let s = scheduler(always());
        let mut arena = SpikeArena::new();
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = s.generate_random(4, world, &mut arena, &mut rng);
        let spike = outcome.spike_id().and_then(|id| arena.get(id));
        assert!(spike.is_some());
        if let Some(spike) = spike {
            assert_eq!(spike.starts_at_day, 5);
            assert!((2..=5).contains(&spike.duration));
            assert_eq!(spike.ends_at_day, 5 + u64::from(spike.duration));
            assert!(!spike.is_guaranteed);
            assert!(!spike.active);
            assert_ne!(spike.spike_type, SpikeType::Blizzard);
            let range = s.config().magnitude_range(spike.spike_type);
            assert!(spike.magnitude >= range.min && spike.magnitude <= range.max);
        }
    }

    #[test]
    fn random_generation_never_exceeds_cap() {
        let (graph, products) = world();
        let world = WorldView { graph: &graph, products: &products };
        let s = scheduler(always());
        let mut arena = SpikeArena::new();
        let mut rng = StdRng::seed_from_u64(42);
        for day in 1..200 {
            let _ = s.generate_random(day, world, &mut arena, &mut rng);
        }
        assert!(!arena.is_empty());
        let checker = s.checker(&arena);
        for day in 1..210 {
            assert!(checker.windows_covering(day) <= 2, "day {day} over cap");
        }
    }

    #[test]
    fn random_generation_respects_cooldown() {
        let (graph, products) = world();
        let world = WorldView { graph: &graph, products: &products };
        let s = scheduler(always());
        let mut arena = SpikeArena::new();
        let mut rng = StdRng::seed_from_u64(99);
        for day in 1..200 {
            let _ = s.generate_random(day, world, &mut arena, &mut rng);
        }
        let spikes: Vec<&SpikeEvent> = arena.iter().collect();
        for a in &spikes {
            for b in &spikes {
                if a.id != b.id && a.spike_type == b.spike_type {
                    assert!(a.starts_at_day.abs_diff(b.starts_at_day) > 2);
                }
            }
        }
    }

    #[test]
    fn breakdown_without_target_is_skipped() {
        let mut graph = LocationGraph::new();
        let vendor = Location {
            id: LocationId::new(),
            name: "only vendor".to_owned(),
            location_type: LocationType::Vendor,
            max_storage: 10,
        };
        assert!(graph.add_location(vendor).is_ok());
        let world = WorldView { graph: &graph, products: &[] };
        let s = scheduler(SchedulerConfig {
            weights: BTreeMap::from([(SpikeType::Breakdown, 1)]),
            ..always()
        });
        let mut arena = SpikeArena::new();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            s.generate_random(5, world, &mut arena, &mut rng),
            ScheduleOutcome::Skipped(SkipReason::NoTarget)
        );
        assert!(arena.is_empty());
    }

    // -----------------------------------------------------------------------
    // Guaranteed generation
    // -----------------------------------------------------------------------

    #[test]
    fn guaranteed_skipped_during_grace() {
        let (graph, products) = world();
        let world = WorldView { graph: &graph, products: &products };
        let s = scheduler(SchedulerConfig::default());
        let mut arena = SpikeArena::new();
        let mut rng = StdRng::seed_from_u64(5);
        for day in 0..=1 {
            assert_eq!(
                s.generate_guaranteed(day, world, &mut arena, &mut rng),
                ScheduleOutcome::Skipped(SkipReason::TutorialGrace)
            );
        }
    }

    #[test]
    fn guaranteed_starts_on_day_and_is_flagged() {
        let (graph, products) = world();
        let world = WorldView { graph: &graph, products: &products };
        let s = scheduler(SchedulerConfig::default());
        let mut arena = SpikeArena::new();
        let mut rng = StdRng::seed_from_u64(11);
        let outcome = s.generate_guaranteed(6, world, &mut arena, &mut rng);
        let spike = outcome.spike_id().and_then(|id| arena.get(id));
        assert!(spike.is_some_and(|s| s.starts_at_day == 6 && s.is_guaranteed));
    }

    #[test]
    fn guaranteed_at_cap_returns_nothing() {
        let (graph, products) = world();
        let world = WorldView { graph: &graph, products: &products };
        let s = scheduler(SchedulerConfig::default());
        let mut arena = SpikeArena::new();
        arena.insert(existing(SpikeType::Demand, 2, 10));
        arena.insert(existing(SpikeType::Price, 2, 10));
        let mut rng = StdRng::seed_from_u64(13);

        assert_eq!(
            s.generate_guaranteed(2, world, &mut arena, &mut rng),
            ScheduleOutcome::Skipped(SkipReason::AtCapacity)
        );
        assert_eq!(s.checker(&arena).windows_covering(2), 2);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn guaranteed_relaxes_cooldown_when_everything_excluded() {
        let (graph, products) = world();
        let world = WorldView { graph: &graph, products: &products };
        let s = scheduler(SchedulerConfig {
            max_active_spikes: 10,
            ..SchedulerConfig::default()
        });
        let mut arena = SpikeArena::new();
        for t in SpikeType::ALL {
            arena.insert(existing(t, 9, 10));
        }
        assert!(s.checker(&arena).allowed_types(10, SpikeType::ALL).is_empty());

        let mut rng = StdRng::seed_from_u64(17);
        let outcome = s.generate_guaranteed(10, world, &mut arena, &mut rng);
        assert!(matches!(outcome, ScheduleOutcome::Generated(_)));
    }

    #[test]
    fn guaranteed_falls_through_to_type_with_target() {
        let mut graph = LocationGraph::new();
        let vendor = Location {
            id: LocationId::new(),
            name: "vendor".to_owned(),
            location_type: LocationType::Vendor,
            max_storage: 10,
        };
        assert!(graph.add_location(vendor).is_ok());
        let world = WorldView { graph: &graph, products: &[] };
        // Breakdown and blizzard have no targets here; demand always does.
        let s = scheduler(SchedulerConfig {
            guaranteed_weights: BTreeMap::from([
                (SpikeType::Breakdown, 1000),
                (SpikeType::Blizzard, 1000),
                (SpikeType::Demand, 1),
            ]),
            ..SchedulerConfig::default()
        });
        let mut arena = SpikeArena::new();
        let mut rng = StdRng::seed_from_u64(19);
        let outcome = s.generate_guaranteed(4, world, &mut arena, &mut rng);
        let spike = outcome.spike_id().and_then(|id| arena.get(id));
        assert!(spike.is_some_and(|s| s.spike_type == SpikeType::Demand));
    }

    #[test]
    fn scoped_breakdowns_never_overlap_on_one_location() {
        let (graph, products) = world();
        let world = WorldView { graph: &graph, products: &products };
        let s = scheduler(SchedulerConfig {
            max_active_spikes: 10,
            cooldown_days: 0,
            guaranteed_weights: BTreeMap::from([(SpikeType::Breakdown, 1)]),
            ..SchedulerConfig::default()
        });
        let mut arena = SpikeArena::new();
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..5 {
            let _ = s.generate_guaranteed(4, world, &mut arena, &mut rng);
        }
        // Two non-vendor locations, so only two breakdowns fit.
        assert_eq!(arena.len(), 2);
        let targets: BTreeSet<Option<LocationId>> = arena.iter().map(|s| s.location_id).collect();
        assert_eq!(targets.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Seeding and resolution cost
    // -----------------------------------------------------------------------

    #[test]
    fn seeding_places_spikes_in_range() {
        let (graph, products) = world();
        let world = WorldView { graph: &graph, products: &products };
        let s = scheduler(SchedulerConfig::default());
        let mut arena = SpikeArena::new();
        let mut rng = StdRng::seed_from_u64(29);
        let seeded = s.seed_guaranteed(world, &mut arena, &mut rng);

        assert!(!seeded.is_empty());
        assert!(seeded.len() <= 5);
        for id in &seeded {
            let spike = arena.get(*id);
            assert!(spike.is_some_and(|s| s.is_guaranteed && (2..=15).contains(&s.starts_at_day)));
        }
        let checker = s.checker(&arena);
        for day in 0..25 {
            assert!(checker.windows_covering(day) <= 2);
        }
    }

    #[test]
    fn resolution_cost_scales_with_remaining_days() {
        let s = scheduler(SchedulerConfig::default());
        let breakdown = existing(SpikeType::Breakdown, 4, 8);
        assert_eq!(s.resolution_cost(&breakdown, 5), Ok(dec!(1500)));
        // Past the window still costs one day.
        assert_eq!(s.resolution_cost(&breakdown, 9), Ok(dec!(500)));

        let demand = existing(SpikeType::Demand, 4, 8);
        assert_eq!(
            s.resolution_cost(&demand, 5),
            Err(SpikeError::NotPlayerResolvable(SpikeType::Demand))
        );
    }
}
