//! The day cycle: one atomic three-phase tick per simulated day.
//!
//! [`TickOrchestrator::advance_day`] opens a [`UnitOfWork`] and runs, on the
//! working copy:
//!
//! 1. **Clock** -- increment the day.
//! 2. **Event tick** -- end spikes whose window closed (rollback, then
//!    `SpikeEnded`), start spikes whose window opened (apply, then
//!    `SpikeOccurred`), attempt a random spike, and fall back to a
//!    guaranteed spike after a quiet stretch.
//! 3. **Physics tick** -- complete due transfers and deliver due orders.
//! 4. **Analysis tick** -- recompute reachability from supply for every
//!    location and run the isolation alert generator.
//! 5. **`TimeAdvanced`** -- a single notification for the new day.
//!
//! Listeners run inside the transaction. If any phase or listener fails,
//! the working copy is discarded and the caller sees
//! [`TickError::Aborted`] with the committed state exactly as before.
//!
//! Randomness comes from an RNG seeded from the world seed and the day, so
//! a given state advances identically on every run.

use std::collections::BTreeMap;

use logisim_orders::{OrderError, OrderStateMachine, TransferStateMachine};
use logisim_spikes::{
    ScheduleOutcome, SkipReason, SpikeEffectEngine, SpikeError, SpikeScheduler, WorldView,
};
use logisim_types::{AlertId, LocationId, OrderId, ResolvedBy, SpikeId, TransferId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alerts::IsolationAlertGenerator;
use crate::clock::ClockError;
use crate::config::SimulationConfig;
use crate::events::{EventBus, ListenerError, SimEvent, SimListener};
use crate::inventory::InventoryListener;
use crate::state::SimulationState;
use crate::unit_of_work::UnitOfWork;

/// A failure inside one phase of the day cycle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhaseError {
    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A spike effect failed to apply or roll back.
    #[error("spike error: {source}")]
    Spike {
        /// The underlying spike error.
        #[from]
        source: SpikeError,
    },

    /// An order or transfer transition was rejected.
    #[error("state machine error: {source}")]
    StateMachine {
        /// The underlying transition error.
        #[from]
        source: OrderError,
    },

    /// A listener failed.
    #[error("listener error: {source}")]
    Listener {
        /// The underlying listener error.
        #[from]
        source: ListenerError,
    },

    /// An ID collected earlier in the phase no longer resolves.
    #[error("{kind} {id} vanished mid-tick")]
    Vanished {
        /// Entity kind.
        kind: &'static str,
        /// The missing ID.
        id: uuid::Uuid,
    },
}

/// Errors returned by [`TickOrchestrator::advance_day`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TickError {
    /// The day-advance failed and every change was discarded.
    #[error("advance to day {day} aborted: {source}")]
    Aborted {
        /// The day that was being entered.
        day: u64,
        /// What failed.
        source: PhaseError,
    },
}

/// What one day-advance did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickSummary {
    /// The new day.
    pub day: u64,
    /// Spikes activated this day, including freshly generated ones.
    pub spikes_started: Vec<SpikeId>,
    /// Spikes whose window closed this day.
    pub spikes_ended: Vec<SpikeId>,
    /// Why random (and, if attempted, guaranteed) generation produced
    /// nothing.
    pub generation_skipped: Vec<SkipReason>,
    /// Transfers completed.
    pub transfers_completed: Vec<TransferId>,
    /// Orders delivered.
    pub orders_delivered: Vec<OrderId>,
    /// Reachability from supply per location after the analysis tick.
    pub reachability: BTreeMap<LocationId, bool>,
    /// Isolation alerts raised.
    pub alerts_raised: Vec<AlertId>,
    /// Isolation alerts resolved.
    pub alerts_resolved: Vec<AlertId>,
    /// Every event dispatched, in order.
    pub events: Vec<SimEvent>,
}

/// Runs the day cycle and owns the machinery it needs.
#[derive(Debug)]
pub struct TickOrchestrator {
    scheduler: SpikeScheduler,
    effects: SpikeEffectEngine,
    alerts: IsolationAlertGenerator,
    bus: EventBus,
    seed: u64,
}

impl TickOrchestrator {
    /// Assemble an orchestrator from explicit parts.
    pub const fn new(
        scheduler: SpikeScheduler,
        effects: SpikeEffectEngine,
        alerts: IsolationAlertGenerator,
        bus: EventBus,
        seed: u64,
    ) -> Self {
        Self {
            scheduler,
            effects,
            alerts,
            bus,
            seed,
        }
    }

    /// The standard orchestrator for `config`: every built-in spike effect
    /// and the inventory listener.
    ///
    /// # Errors
    ///
    /// Returns [`SpikeError::InvalidConfig`] for inconsistent spike settings.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SpikeError> {
        let scheduler = SpikeScheduler::new(config.spikes.clone())?;
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(InventoryListener));
        Ok(Self::new(
            scheduler,
            SpikeEffectEngine::standard(),
            IsolationAlertGenerator::new(config.alerts.low_stock_threshold),
            bus,
            config.world.seed,
        ))
    }

    /// Add an in-transaction listener.
    pub fn subscribe(&mut self, listener: Box<dyn SimListener>) {
        self.bus.subscribe(listener);
    }

    /// The spike scheduler.
    pub const fn scheduler(&self) -> &SpikeScheduler {
        &self.scheduler
    }

    /// The spike effect table.
    pub const fn effects(&self) -> &SpikeEffectEngine {
        &self.effects
    }

    /// Dispatch `event` on the working state and record it.
    pub(crate) fn emit(
        &mut self,
        event: SimEvent,
        state: &mut SimulationState,
        log: &mut Vec<SimEvent>,
    ) -> Result<(), ListenerError> {
        self.bus.dispatch(&event, state)?;
        log.push(event);
        Ok(())
    }

    /// Seed the early game with guaranteed spikes. Called once at world
    /// creation, before day 1.
    pub fn seed_spikes(&self, state: &mut SimulationState) -> Vec<SpikeId> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let products = state.product_ids();
        let world = WorldView {
            graph: &state.graph,
            products: &products,
        };
        self.scheduler
            .seed_guaranteed(world, &mut state.spikes, &mut rng)
    }

    fn day_rng(&self, day: u64) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ day.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    // -------------------------------------------------------------------
    // AdvanceDay
    // -------------------------------------------------------------------

    /// Advance `state` by one day, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Aborted`] if any phase or listener fails. The
    /// state is then exactly as it was before the call.
    pub fn advance_day(&mut self, state: &mut SimulationState) -> Result<TickSummary, TickError> {
        let attempted = state.day().saturating_add(1);
        let mut uow = UnitOfWork::begin(state);
        match self.run_phases(uow.state_mut()) {
            Ok(summary) => {
                uow.commit();
                info!(
                    day = summary.day,
                    started = summary.spikes_started.len(),
                    ended = summary.spikes_ended.len(),
                    transfers = summary.transfers_completed.len(),
                    orders = summary.orders_delivered.len(),
                    alerts_raised = summary.alerts_raised.len(),
                    alerts_resolved = summary.alerts_resolved.len(),
                    "day advanced"
                );
                Ok(summary)
            }
            Err(source) => {
                uow.rollback();
                warn!(day = attempted, error = %source, "day advance aborted");
                Err(TickError::Aborted {
                    day: attempted,
                    source,
                })
            }
        }
    }

    fn run_phases(&mut self, state: &mut SimulationState) -> Result<TickSummary, PhaseError> {
        let day = state.clock.advance()?;
        let mut summary = TickSummary {
            day,
            ..TickSummary::default()
        };
        let mut rng = self.day_rng(day);

        self.event_tick(state, day, &mut rng, &mut summary)?;
        self.physics_tick(state, day, &mut summary)?;
        self.analysis_tick(state, day, &mut summary)?;

        self.emit(SimEvent::TimeAdvanced { day }, state, &mut summary.events)?;
        Ok(summary)
    }

    // -------------------------------------------------------------------
    // Event tick
    // -------------------------------------------------------------------

    fn event_tick(
        &mut self,
        state: &mut SimulationState,
        day: u64,
        rng: &mut StdRng,
        summary: &mut TickSummary,
    ) -> Result<(), PhaseError> {
        let ending = state.spikes.ids_where(|s| s.active && s.ends_at_day <= day);
        for id in ending {
            self.end_spike(state, id, day, ResolvedBy::Time, &mut summary.events)?;
            summary.spikes_ended.push(id);
        }

        let starting = state
            .spikes
            .ids_where(|s| !s.active && !s.is_resolved() && s.covers(day));
        for id in starting {
            self.start_spike(state, id, &mut summary.events)?;
            summary.spikes_started.push(id);
        }

        let products = state.product_ids();
        let world = WorldView {
            graph: &state.graph,
            products: &products,
        };
        let outcome = self
            .scheduler
            .generate_random(day, world, &mut state.spikes, rng);
        match outcome {
            ScheduleOutcome::Generated(id) => {
                self.start_spike(state, id, &mut summary.events)?;
                summary.spikes_started.push(id);
            }
            ScheduleOutcome::Skipped(reason) => {
                debug!(day, ?reason, "no random spike");
                summary.generation_skipped.push(reason);
                if self.is_quiet(state, day) {
                    self.force_guaranteed(state, day, rng, summary)?;
                }
            }
        }
        Ok(())
    }

    /// Whether no spike started within the last `guaranteed_gap_days`.
    fn is_quiet(&self, state: &SimulationState, day: u64) -> bool {
        let gap = self.scheduler.config().guaranteed_gap_days;
        if gap == 0 {
            return false;
        }
        let since = day.saturating_sub(gap);
        !state
            .spikes
            .iter()
            .any(|s| s.starts_at_day > since && s.starts_at_day <= day)
    }

    fn force_guaranteed(
        &mut self,
        state: &mut SimulationState,
        day: u64,
        rng: &mut StdRng,
        summary: &mut TickSummary,
    ) -> Result<(), PhaseError> {
        let products = state.product_ids();
        let world = WorldView {
            graph: &state.graph,
            products: &products,
        };
        match self
            .scheduler
            .generate_guaranteed(day, world, &mut state.spikes, rng)
        {
            ScheduleOutcome::Generated(id) => {
                self.start_spike(state, id, &mut summary.events)?;
                summary.spikes_started.push(id);
            }
            ScheduleOutcome::Skipped(reason) => {
                debug!(day, ?reason, "no guaranteed spike");
                summary.generation_skipped.push(reason);
            }
        }
        Ok(())
    }

    /// Apply a spike's effect, mark it active, and emit `SpikeOccurred`.
    pub(crate) fn start_spike(
        &mut self,
        state: &mut SimulationState,
        id: SpikeId,
        log: &mut Vec<SimEvent>,
    ) -> Result<(), PhaseError> {
        let spike = state.spikes.get_mut(id).ok_or(PhaseError::Vanished {
            kind: "spike",
            id: id.into_inner(),
        })?;
        self.effects.apply(spike, &mut state.graph)?;
        spike.active = true;
        info!(
            spike = %id,
            spike_type = %spike.spike_type,
            magnitude = spike.magnitude,
            start = spike.starts_at_day,
            end = spike.ends_at_day,
            guaranteed = spike.is_guaranteed,
            "spike occurred"
        );
        let snapshot = spike.clone();
        self.emit(SimEvent::SpikeOccurred { spike: snapshot }, state, log)?;
        Ok(())
    }

    /// Roll a spike's effect back, mark it ended, and emit `SpikeEnded`.
    pub(crate) fn end_spike(
        &mut self,
        state: &mut SimulationState,
        id: SpikeId,
        day: u64,
        resolved_by: ResolvedBy,
        log: &mut Vec<SimEvent>,
    ) -> Result<(), PhaseError> {
        let spike = state.spikes.get_mut(id).ok_or(PhaseError::Vanished {
            kind: "spike",
            id: id.into_inner(),
        })?;
        if spike.active {
            self.effects.rollback(spike, &mut state.graph)?;
            spike.active = false;
        }
        spike.resolved_at_day = Some(day);
        spike.resolved_by = Some(resolved_by);
        info!(spike = %id, spike_type = %spike.spike_type, day, ?resolved_by, "spike ended");
        let snapshot = spike.clone();
        self.emit(SimEvent::SpikeEnded { spike: snapshot }, state, log)?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Physics tick
    // -------------------------------------------------------------------

    fn physics_tick(
        &mut self,
        state: &mut SimulationState,
        day: u64,
        summary: &mut TickSummary,
    ) -> Result<(), PhaseError> {
        let due_transfers: Vec<TransferId> = state
            .transfers
            .values()
            .filter(|t| TransferStateMachine::is_due(t, day))
            .map(|t| t.id)
            .collect();
        for id in due_transfers {
            let transfer = state.transfers.get_mut(&id).ok_or(PhaseError::Vanished {
                kind: "transfer",
                id: id.into_inner(),
            })?;
            TransferStateMachine::complete(transfer, day)?;
            let snapshot = transfer.clone();
            self.emit(
                SimEvent::TransferCompleted { transfer: snapshot },
                state,
                &mut summary.events,
            )?;
            summary.transfers_completed.push(id);
        }

        let due_orders: Vec<OrderId> = state
            .orders
            .values()
            .filter(|o| OrderStateMachine::is_due(o, day))
            .map(|o| o.id)
            .collect();
        for id in due_orders {
            let order = state.orders.get_mut(&id).ok_or(PhaseError::Vanished {
                kind: "order",
                id: id.into_inner(),
            })?;
            OrderStateMachine::deliver(order, day)?;
            let snapshot = order.clone();
            self.emit(
                SimEvent::OrderDelivered { order: snapshot },
                state,
                &mut summary.events,
            )?;
            summary.orders_delivered.push(id);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Analysis tick
    // -------------------------------------------------------------------

    fn analysis_tick(
        &mut self,
        state: &mut SimulationState,
        day: u64,
        summary: &mut TickSummary,
    ) -> Result<(), PhaseError> {
        let reachability: BTreeMap<LocationId, bool> = {
            let router = state.router();
            state
                .graph
                .location_ids()
                .into_iter()
                .map(|id| (id, router.is_reachable_from_supply(id)))
                .collect()
        };
        let cut_off = reachability.values().filter(|r| !**r).count();
        debug!(day, cut_off, "reachability recomputed");
        state.reachability.clone_from(&reachability);
        summary.reachability = reachability;

        let changes = self.alerts.evaluate(state, day);
        for alert in changes.raised {
            summary.alerts_raised.push(alert.id);
            self.emit(SimEvent::IsolationDetected { alert }, state, &mut summary.events)?;
        }
        for alert in changes.resolved {
            summary.alerts_resolved.push(alert.id);
            self.emit(SimEvent::IsolationResolved { alert }, state, &mut summary.events)?;
        }
        Ok(())
    }
}
