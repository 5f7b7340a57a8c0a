//! A simulation instance: committed state plus the machinery that advances
//! it.
//!
//! [`Simulation`] is the single owner of a [`SimulationState`]. Queries read
//! the committed state; the day cycle and player commands (see
//! [`commands`](crate::commands)) each run in their own transaction.

use logisim_spikes::SpikeError;
use logisim_types::{LocationId, PathQuery, SpikeId};
use logisim_world::StartingLocationIds;
use tracing::info;

use crate::config::SimulationConfig;
use crate::events::SimListener;
use crate::seed::{SeedError, create_starting_state};
use crate::state::SimulationState;
use crate::tick::{TickError, TickOrchestrator, TickSummary};

/// Errors that can occur while setting up a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The starting world could not be built.
    #[error("seed error: {source}")]
    Seed {
        /// The underlying seed error.
        #[from]
        source: SeedError,
    },

    /// The spike settings are inconsistent.
    #[error("spike config error: {source}")]
    Spikes {
        /// The underlying spike error.
        #[from]
        source: SpikeError,
    },
}

/// A freshly seeded simulation and the handles a caller needs to drive it.
#[derive(Debug)]
pub struct SeededSimulation {
    /// The simulation at day 0.
    pub simulation: Simulation,
    /// IDs of the starting locations.
    pub locations: StartingLocationIds,
    /// Guaranteed spikes pre-scheduled for the early game.
    pub seeded_spikes: Vec<SpikeId>,
}

/// Committed state and the orchestrator that advances it.
#[derive(Debug)]
pub struct Simulation {
    pub(crate) state: SimulationState,
    pub(crate) orchestrator: TickOrchestrator,
}

impl Simulation {
    /// Wrap an existing state.
    pub const fn new(state: SimulationState, orchestrator: TickOrchestrator) -> Self {
        Self {
            state,
            orchestrator,
        }
    }

    /// Build the starting world for `config` and seed its guaranteed
    /// spikes.
    pub fn seeded(config: &SimulationConfig) -> Result<SeededSimulation, SetupError> {
        let orchestrator = TickOrchestrator::from_config(config)?;
        let world = create_starting_state(config)?;
        let mut state = world.state;
        let seeded_spikes = orchestrator.seed_spikes(&mut state);
        info!(
            name = %config.world.name,
            seed = config.world.seed,
            locations = state.graph.location_count(),
            routes = state.graph.route_count(),
            products = state.products.len(),
            seeded_spikes = seeded_spikes.len(),
            "simulation seeded"
        );
        Ok(SeededSimulation {
            simulation: Self::new(state, orchestrator),
            locations: world.locations,
            seeded_spikes,
        })
    }

    /// The committed state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The current day.
    pub const fn day(&self) -> u64 {
        self.state.day()
    }

    /// The orchestrator.
    pub const fn orchestrator(&self) -> &TickOrchestrator {
        &self.orchestrator
    }

    /// Add an in-transaction listener.
    pub fn subscribe(&mut self, listener: Box<dyn SimListener>) {
        self.orchestrator.subscribe(listener);
    }

    /// Run one atomic day-advance.
    pub fn advance_day(&mut self) -> Result<TickSummary, TickError> {
        self.orchestrator.advance_day(&mut self.state)
    }

    /// Cheapest path between two locations under the current spikes.
    pub fn get_path(&self, source: LocationId, target: LocationId) -> PathQuery {
        self.state.router().get_path(source, target)
    }
}
