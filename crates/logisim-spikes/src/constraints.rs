//! Concurrency cap and per-type cooldown checks.
//!
//! Two rules govern when a new spike may be scheduled:
//!
//! - **Cap** -- no day may be covered by more than `max_active_spikes`
//!   spike windows. Windows of spikes the player already resolved do not
//!   count.
//! - **Cooldown** -- a type is unavailable on `day` if a spike of that type
//!   starts within `cooldown_days` of `day` (either direction), or if the
//!   type's recorded last start is not more than `cooldown_days` before
//!   `day`.

use std::collections::BTreeSet;

use logisim_types::{ResolvedBy, SpikeType};

use crate::arena::SpikeArena;

/// Read-only constraint view over the spike arena.
#[derive(Debug, Clone, Copy)]
pub struct SpikeConstraintChecker<'a> {
    arena: &'a SpikeArena,
    max_active_spikes: usize,
    cooldown_days: u64,
}

impl<'a> SpikeConstraintChecker<'a> {
    /// Build a checker with explicit limits.
    pub const fn new(arena: &'a SpikeArena, max_active_spikes: usize, cooldown_days: u64) -> Self {
        Self {
            arena,
            max_active_spikes,
            cooldown_days,
        }
    }

    /// Number of live spike windows covering `day`.
    pub fn windows_covering(&self, day: u64) -> usize {
        self.arena
            .iter()
            .filter(|s| s.resolved_by != Some(ResolvedBy::Player))
            .filter(|s| s.covers(day))
            .count()
    }

    /// Whether a spike spanning `day..day + duration` keeps every covered
    /// day under the cap.
    pub fn can_schedule(&self, day: u64, duration: u32) -> bool {
        let end = day.saturating_add(u64::from(duration));
        (day..end).all(|d| self.windows_covering(d) < self.max_active_spikes)
    }

    /// Whether `spike_type` is out of cooldown on `day`.
    pub fn is_type_allowed(&self, spike_type: SpikeType, day: u64) -> bool {
        let nearby = self.arena.iter().any(|s| {
            s.spike_type == spike_type && s.starts_at_day.abs_diff(day) <= self.cooldown_days
        });
        if nearby {
            return false;
        }
        self.arena
            .cooldowns()
            .last_start(spike_type)
            .is_none_or(|last| day.checked_sub(last).is_some_and(|gap| gap > self.cooldown_days))
    }

    /// The subset of `candidates` out of cooldown on `day`.
    ///
    /// May be empty; callers that must produce a spike relax to the full
    /// candidate set themselves.
    pub fn allowed_types(
        &self,
        day: u64,
        candidates: impl IntoIterator<Item = SpikeType>,
    ) -> BTreeSet<SpikeType> {
        candidates
            .into_iter()
            .filter(|t| self.is_type_allowed(*t, day))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use logisim_types::{SpikeEvent, SpikeId};

    use super::*;

    fn spike(spike_type: SpikeType, start: u64, end: u64) -> SpikeEvent {
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

    #[test]
    fn two_windows_block_overlapping_schedule() {
        let mut arena = SpikeArena::new();
        arena.insert(spike(SpikeType::Demand, 2, 10));
        arena.insert(spike(SpikeType::Price, 2, 10));
        let checker = SpikeConstraintChecker::new(&arena, 2, 2);
        assert_eq!(checker.windows_covering(2), 2);
        assert!(!checker.can_schedule(2, 3));
        assert!(!checker.can_schedule(9, 1));
        // Day 10 is outside the half-open window.
        assert!(checker.can_schedule(10, 5));
    }

    #[test]
    fn any_single_capped_day_blocks() {
        let mut arena = SpikeArena::new();
        arena.insert(spike(SpikeType::Demand, 1, 4));
        arena.insert(spike(SpikeType::Price, 6, 8));
        arena.insert(spike(SpikeType::Delay, 7, 9));
        let checker = SpikeConstraintChecker::new(&arena, 2, 2);
        assert!(checker.can_schedule(1, 5));
        assert!(!checker.can_schedule(3, 5)); // day 7 already hosts two.
    }

    #[test]
    fn player_resolved_windows_do_not_count() {
        let mut arena = SpikeArena::new();
        arena.insert(spike(SpikeType::Demand, 2, 10));
        let mut fixed = spike(SpikeType::Breakdown, 2, 10);
        fixed.resolved_by = Some(ResolvedBy::Player);
        fixed.resolved_at_day = Some(3);
        arena.insert(fixed);
        let checker = SpikeConstraintChecker::new(&arena, 2, 2);
        assert!(checker.can_schedule(4, 2));
    }

    #[test]
    fn cooldown_excludes_nearby_starts_in_both_directions() {
        let mut arena = SpikeArena::new();
        arena.insert(spike(SpikeType::Demand, 10, 12));
        let checker = SpikeConstraintChecker::new(&arena, 2, 2);
        assert!(!checker.is_type_allowed(SpikeType::Demand, 8));
        assert!(!checker.is_type_allowed(SpikeType::Demand, 12));
        assert!(checker.is_type_allowed(SpikeType::Demand, 13));
        assert!(checker.is_type_allowed(SpikeType::Price, 10));
    }

    #[test]
    fn history_blocks_days_before_last_start() {
        let mut arena = SpikeArena::new();
        arena.insert(spike(SpikeType::Delay, 20, 22));
        let checker = SpikeConstraintChecker::new(&arena, 2, 2);
        // Far before the seeded start: window check passes, history does not.
        assert!(!checker.is_type_allowed(SpikeType::Delay, 5));
        assert!(checker.is_type_allowed(SpikeType::Delay, 23));
    }

    #[test]
    fn allowed_types_can_be_empty() {
        let mut arena = SpikeArena::new();
        for t in SpikeType::ALL {
            arena.insert(spike(t, 5, 7));
        }
        let checker = SpikeConstraintChecker::new(&arena, 10, 2);
        assert!(checker.allowed_types(6, SpikeType::ALL).is_empty());
        assert_eq!(checker.allowed_types(8, SpikeType::ALL).len(), 5);
    }
}
