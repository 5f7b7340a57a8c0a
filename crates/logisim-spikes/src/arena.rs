//! Flat spike storage keyed by ID.
//!
//! Spikes are never deleted. A child spike refers to its parent by
//! [`SpikeId`] only; lookups go through the arena, so there are no owning
//! references between spikes. The arena also keeps the per-type history of
//! the latest start day used by cooldown checks.

use std::collections::BTreeMap;

use logisim_types::{SpikeEvent, SpikeId, SpikeType};

/// Latest start day seen per spike type.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CooldownTracker {
    last_start: BTreeMap<SpikeType, u64>,
}

impl CooldownTracker {
    /// Record a spike of `spike_type` starting on `day`.
    pub fn record(&mut self, spike_type: SpikeType, day: u64) {
        let entry = self.last_start.entry(spike_type).or_insert(day);
        if day > *entry {
            *entry = day;
        }
    }

    /// The most recent start day recorded for `spike_type`.
    pub fn last_start(&self, spike_type: SpikeType) -> Option<u64> {
        self.last_start.get(&spike_type).copied()
    }
}

/// Every spike in the simulation.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpikeArena {
    spikes: BTreeMap<SpikeId, SpikeEvent>,
    cooldowns: CooldownTracker,
}

impl SpikeArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a spike and record its start in the cooldown history.
    pub fn insert(&mut self, spike: SpikeEvent) -> SpikeId {
        let id = spike.id;
        self.cooldowns.record(spike.spike_type, spike.starts_at_day);
        self.spikes.insert(id, spike);
        id
    }

    /// Get a spike by ID.
    pub fn get(&self, id: SpikeId) -> Option<&SpikeEvent> {
        self.spikes.get(&id)
    }

    /// Get a mutable spike by ID.
    pub fn get_mut(&mut self, id: SpikeId) -> Option<&mut SpikeEvent> {
        self.spikes.get_mut(&id)
    }

    /// Number of spikes ever created.
    pub fn len(&self) -> usize {
        self.spikes.len()
    }

    /// Whether no spike was ever created.
    pub fn is_empty(&self) -> bool {
        self.spikes.is_empty()
    }

    /// Iterate over all spikes in key order.
    pub fn iter(&self) -> impl Iterator<Item = &SpikeEvent> {
        self.spikes.values()
    }

    /// Spikes whose effect is currently applied.
    pub fn active(&self) -> impl Iterator<Item = &SpikeEvent> {
        self.spikes.values().filter(|s| s.active)
    }

    /// IDs of spikes matching `predicate`, collected so the caller can
    /// mutate them afterwards.
    pub fn ids_where(&self, predicate: impl Fn(&SpikeEvent) -> bool) -> Vec<SpikeId> {
        self.spikes
            .values()
            .filter(|s| predicate(s))
            .map(|s| s.id)
            .collect()
    }

    /// Spikes spawned from `parent`.
    pub fn children_of(&self, parent: SpikeId) -> impl Iterator<Item = &SpikeEvent> {
        self.spikes
            .values()
            .filter(move |s| s.parent_id == Some(parent))
    }

    /// Per-type start history.
    pub const fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike(spike_type: SpikeType, start: u64) -> SpikeEvent {
        SpikeEvent {
            id: SpikeId::new(),
            spike_type,
            magnitude: 0.3,
            duration: 3,
            location_id: None,
            product_id: None,
            route_id: None,
            parent_id: None,
            starts_at_day: start,
            ends_at_day: start.saturating_add(3),
            active: false,
            is_guaranteed: false,
            resolved_at_day: None,
            resolved_by: None,
            resolution_cost: None,
            meta: BTreeMap::new(),
        }
    }

    #[test]
    fn insert_records_latest_start() {
        let mut arena = SpikeArena::new();
        arena.insert(spike(SpikeType::Demand, 7));
        arena.insert(spike(SpikeType::Demand, 4));
        assert_eq!(arena.cooldowns().last_start(SpikeType::Demand), Some(7));
        assert_eq!(arena.cooldowns().last_start(SpikeType::Price), None);
    }

    #[test]
    fn children_found_by_parent_id() {
        let mut arena = SpikeArena::new();
        let parent = arena.insert(spike(SpikeType::Blizzard, 3));
        let mut child = spike(SpikeType::Delay, 3);
        child.parent_id = Some(parent);
        let child_id = arena.insert(child);
        arena.insert(spike(SpikeType::Delay, 3));

        let children: Vec<SpikeId> = arena.children_of(parent).map(|s| s.id).collect();
        assert_eq!(children, vec![child_id]);
    }

    #[test]
    fn active_filters_lifecycle_flag() {
        let mut arena = SpikeArena::new();
        let id = arena.insert(spike(SpikeType::Price, 1));
        arena.insert(spike(SpikeType::Price, 9));
        if let Some(s) = arena.get_mut(id) {
            s.active = true;
        }
        assert_eq!(arena.active().count(), 1);
        assert_eq!(arena.len(), 2);
    }
}
