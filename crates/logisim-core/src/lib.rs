//! Day clock, transactional tick cycle, and player commands for the Logisim
//! simulation.
//!
//! This crate owns the day cycle that drives the simulation: an Event tick
//! (spike lifecycle), a Physics tick (deliveries), and an Analysis tick
//! (reachability and isolation alerts), run atomically per day.
//!
//! # Modules
//!
//! - [`alerts`] -- [`IsolationAlertGenerator`]: raises and resolves
//!   isolation alerts from the reachability map.
//! - [`clock`] -- [`DayClock`] with checked day arithmetic.
//! - [`commands`] -- Player commands: place, ship, and cancel orders,
//!   create transfers, resolve spikes.
//! - [`config`] -- Configuration loading from `logisim-config.yaml` into
//!   strongly-typed structs.
//! - [`events`] -- [`SimEvent`], [`SimListener`], and the [`EventBus`].
//! - [`inventory`] -- [`InventoryListener`]: restocks on delivery.
//! - [`runner`] -- Multi-day loop with post-commit [`TickCallback`]s.
//! - [`seed`] -- The starting world with catalog, stock, and funds.
//! - [`simulation`] -- [`Simulation`]: committed state plus orchestrator.
//! - [`state`] -- [`SimulationState`], the complete mutable state.
//! - [`tick`] -- [`TickOrchestrator`] and the three-phase day cycle.
//! - [`unit_of_work`] -- [`UnitOfWork`]: clone, mutate, commit or discard.

pub mod alerts;
pub mod clock;
pub mod commands;
pub mod config;
pub mod events;
pub mod inventory;
pub mod runner;
pub mod seed;
pub mod simulation;
pub mod state;
pub mod tick;
pub mod unit_of_work;

pub use alerts::{AlertChanges, IsolationAlertGenerator};
pub use clock::{ClockError, DayClock};
pub use commands::{CommandError, LineRequest};
pub use config::{
    AlertConfig, ConfigError, LoggingConfig, ObserverConfig, SimulationConfig, WorldConfig,
};
pub use events::{EventBus, ListenerError, SimEvent, SimListener};
pub use inventory::InventoryListener;
pub use runner::{
    ClockStep, NoOpCallback, RunEndReason, RunResult, TickCallback, run_days, step_day,
};
pub use seed::{SeedError, StartingWorld, create_starting_state};
pub use simulation::{SeededSimulation, SetupError, Simulation};
pub use state::{SimulationState, StockShortfall};
pub use tick::{PhaseError, TickError, TickOrchestrator, TickSummary};
pub use unit_of_work::UnitOfWork;
