//! Disruption spikes for the Logisim simulation.
//!
//! A spike is a time-windowed disruption with a type-specific effect on the
//! world. This crate stores spikes, decides when new ones may start, and
//! applies or rolls back their effects.
//!
//! # Modules
//!
//! - [`arena`] -- [`SpikeArena`]: flat ID-keyed storage plus cooldown history.
//! - [`constraints`] -- [`SpikeConstraintChecker`]: concurrency cap and
//!   per-type cooldown.
//! - [`effects`] -- [`SpikeEffectEngine`]: strategy table of reversible
//!   apply/rollback per type.
//! - [`multipliers`] -- Live demand and price multipliers.
//! - [`scheduler`] -- [`SpikeScheduler`]: random, guaranteed, and seeded
//!   generation; player resolution cost.
//! - [`error`] -- [`SpikeError`].

pub mod arena;
pub mod constraints;
pub mod effects;
pub mod error;
pub mod multipliers;
pub mod scheduler;

pub use arena::{CooldownTracker, SpikeArena};
pub use constraints::SpikeConstraintChecker;
pub use effects::{BlizzardEffect, BreakdownEffect, LiveReadEffect, SpikeEffect, SpikeEffectEngine};
pub use error::SpikeError;
pub use multipliers::{demand_multiplier, price_multiplier};
pub use scheduler::{
    MagnitudeRange, ScheduleOutcome, SchedulerConfig, SkipReason, SpikeScheduler, WorldView,
};
