//! Multi-day loop with post-commit observers.
//!
//! [`run_days`] drives [`Simulation::advance_day`] repeatedly and hands each
//! committed [`TickSummary`] to a [`TickCallback`]. Callbacks run after the
//! transaction has committed, so unlike in-transaction listeners they cannot
//! veto a day.

use tracing::info;

use crate::simulation::Simulation;
use crate::state::SimulationState;
use crate::tick::{TickError, TickSummary};

/// Called after each day commits.
pub trait TickCallback: Send {
    /// Observe the committed summary and state.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A tick callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Why [`run_days`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// The requested number of days ran.
    DaysCompleted,
    /// The clock reached the configured last day.
    MaxDaysReached,
}

/// Outcome of [`run_days`].
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Why the loop stopped.
    pub end_reason: RunEndReason,
    /// The last committed summary, if any day ran.
    pub final_summary: Option<TickSummary>,
    /// Days advanced.
    pub days_run: u64,
}

impl<A: TickCallback, B: TickCallback> TickCallback for (A, B) {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        self.0.on_tick(summary, state);
        self.1.on_tick(summary, state);
    }
}

/// Outcome of one [`step_day`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStep {
    /// A day committed; carries the new day.
    Advanced(u64),
    /// The clock already stands at `max_day`; nothing ran.
    Finished,
}

const fn max_reached(day: u64, max_day: u64) -> bool {
    max_day > 0 && day >= max_day
}

/// Advance exactly one day unless the clock has reached `max_day`
/// (0 for no limit), notifying `callback` after commit.
///
/// An aborted day is returned as-is. Aborts are deterministic for a given
/// state, so callers driving a clock must stop rather than retry.
///
/// # Errors
///
/// Returns the [`TickError`] of the aborted day; the simulation is left
/// exactly as it was.
pub fn step_day(
    simulation: &mut Simulation,
    max_day: u64,
    callback: &mut dyn TickCallback,
) -> Result<ClockStep, TickError> {
    if max_reached(simulation.day(), max_day) {
        return Ok(ClockStep::Finished);
    }
    let summary = simulation.advance_day()?;
    callback.on_tick(&summary, simulation.state());
    Ok(ClockStep::Advanced(summary.day))
}

/// Advance up to `days` days, stopping early once the clock reaches
/// `max_day` (0 for no limit).
///
/// # Errors
///
/// Returns the [`TickError`] of the first aborted day. Days committed
/// before it stay committed.
pub fn run_days(
    simulation: &mut Simulation,
    days: u64,
    max_day: u64,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, TickError> {
    let mut final_summary = None;
    let mut days_run: u64 = 0;
    info!(start = simulation.day(), days, max_day, "run starting");

    let end_reason = loop {
        if max_reached(simulation.day(), max_day) {
            break RunEndReason::MaxDaysReached;
        }
        if days_run >= days {
            break RunEndReason::DaysCompleted;
        }
        let summary = simulation.advance_day()?;
        days_run = days_run.saturating_add(1);
        callback.on_tick(&summary, simulation.state());
        final_summary = Some(summary);
    };

    info!(
        reason = ?end_reason,
        days_run,
        day = simulation.day(),
        funds = %simulation.state().treasury.balance(),
        "run ended"
    );
    Ok(RunResult {
        end_reason,
        final_summary,
        days_run,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use logisim_spikes::{SpikeEffectEngine, SpikeError, SpikeScheduler};
    use logisim_types::{SpikeEvent, SpikeId, SpikeType};

    use super::*;
    use crate::alerts::IsolationAlertGenerator;
    use crate::config::SimulationConfig;
    use crate::events::EventBus;
    use crate::seed::create_starting_state;
    use crate::tick::{PhaseError, TickOrchestrator};

    #[derive(Default)]
    struct Recorder {
        days: Vec<u64>,
    }

    impl TickCallback for Recorder {
        fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
            assert_eq!(summary.day, state.day());
            self.days.push(summary.day);
        }
    }

    fn simulation() -> Simulation {
        Simulation::seeded(&SimulationConfig::default())
            .unwrap_or_else(|e| panic!("seeded: {e}"))
            .simulation
    }

    /// A world holding a breakdown on day 1 but no effect registered for it,
    /// so every attempt to enter day 1 aborts.
    fn broken_simulation() -> Simulation {
        let mut config = SimulationConfig::default();
        config.spikes.random_chance = 0.0;
        config.spikes.guaranteed_gap_days = 0;
        let mut world = create_starting_state(&config).unwrap_or_else(|e| panic!("seed: {e}"));
        world.state.spikes.insert(SpikeEvent {
            id: SpikeId::new(),
            spike_type: SpikeType::Breakdown,
            magnitude: 0.5,
            duration: 2,
            location_id: Some(world.locations.south_warehouse),
            product_id: None,
            route_id: None,
            parent_id: None,
            starts_at_day: 1,
            ends_at_day: 3,
            active: false,
            is_guaranteed: false,
            resolved_at_day: None,
            resolved_by: None,
            resolution_cost: None,
            meta: BTreeMap::new(),
        });
        let orchestrator = TickOrchestrator::new(
            SpikeScheduler::new(config.spikes.clone()).unwrap_or_default(),
            SpikeEffectEngine::empty(),
            IsolationAlertGenerator::new(config.alerts.low_stock_threshold),
            EventBus::new(),
            config.world.seed,
        );
        Simulation::new(world.state, orchestrator)
    }

    #[test]
    fn step_advances_one_day_then_finishes_at_max() {
        let mut sim = simulation();
        let mut recorder = Recorder::default();
        assert_eq!(step_day(&mut sim, 2, &mut recorder), Ok(ClockStep::Advanced(1)));
        assert_eq!(step_day(&mut sim, 2, &mut recorder), Ok(ClockStep::Advanced(2)));
        assert_eq!(step_day(&mut sim, 2, &mut recorder), Ok(ClockStep::Finished));
        assert_eq!(recorder.days, vec![1, 2]);
    }

    #[test]
    fn step_reports_abort_without_notifying() {
        let mut sim = broken_simulation();
        let mut recorder = Recorder::default();
        let result = step_day(&mut sim, 0, &mut recorder);
        assert!(matches!(
            result,
            Err(TickError::Aborted {
                day: 1,
                source: PhaseError::Spike {
                    source: SpikeError::UnknownSpikeType(_)
                }
            })
        ));
        assert_eq!(sim.day(), 0);
        assert!(recorder.days.is_empty());
    }

    #[test]
    fn run_stops_at_first_abort() {
        let mut sim = broken_simulation();
        let mut recorder = Recorder::default();
        let result = run_days(&mut sim, 10, 0, &mut recorder);
        assert!(matches!(result, Err(TickError::Aborted { day: 1, .. })));
        assert_eq!(sim.day(), 0);
        assert!(recorder.days.is_empty());
    }

    #[test]
    fn paired_callbacks_both_observe() {
        let mut sim = simulation();
        let mut pair = (Recorder::default(), Recorder::default());
        let result = run_days(&mut sim, 2, 0, &mut pair);
        assert!(result.is_ok());
        assert_eq!(pair.0.days, vec![1, 2]);
        assert_eq!(pair.1.days, vec![1, 2]);
    }

    #[test]
    fn runs_requested_days_and_notifies_after_commit() {
        let mut sim = simulation();
        let mut recorder = Recorder::default();
        let result = run_days(&mut sim, 5, 0, &mut recorder);
        assert!(result.is_ok());
        if let Ok(result) = result {
            assert_eq!(result.end_reason, RunEndReason::DaysCompleted);
            assert_eq!(result.days_run, 5);
            assert_eq!(result.final_summary.map(|s| s.day), Some(5));
        }
        assert_eq!(recorder.days, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn stops_at_max_day() {
        let mut sim = simulation();
        let result = run_days(&mut sim, 100, 3, &mut NoOpCallback);
        assert!(result.is_ok_and(|r| r.end_reason == RunEndReason::MaxDaysReached
            && r.days_run == 3));
        assert_eq!(sim.day(), 3);
    }
}
