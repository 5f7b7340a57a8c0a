//! Error types for the `logisim-spikes` crate.
//!
//! Everything here is a domain invariant or configuration failure. An
//! over-cap or cooling-down schedule is not an error: the scheduler reports
//! it as [`ScheduleOutcome::Skipped`](crate::scheduler::ScheduleOutcome).

use logisim_types::{LocationId, RouteId, SpikeId, SpikeType};

/// Errors raised while applying, rolling back, or configuring spikes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpikeError {
    /// No effect strategy is registered for the type, or a persisted type
    /// string could not be parsed.
    #[error("unknown spike type: {0}")]
    UnknownSpikeType(String),

    /// The spike lacks the scope its type requires.
    #[error("{spike_type} spike {spike} has no {scope} scope")]
    MissingScope {
        /// The spike.
        spike: SpikeId,
        /// Its type.
        spike_type: SpikeType,
        /// The missing scope ("location" or "route").
        scope: &'static str,
    },

    /// The scoped location does not exist.
    #[error("spike {spike} targets unknown location {location}")]
    LocationNotFound {
        /// The spike.
        spike: SpikeId,
        /// The missing location.
        location: LocationId,
    },

    /// The scoped route does not exist.
    #[error("spike {spike} targets unknown route {route}")]
    RouteNotFound {
        /// The spike.
        spike: SpikeId,
        /// The missing route.
        route: RouteId,
    },

    /// Apply was called on a spike whose effect is already stashed.
    #[error("spike {0} effect is already applied")]
    AlreadyApplied(SpikeId),

    /// Rollback found no stashed original state.
    #[error("spike {spike} has no rollback state under `{key}`")]
    MissingRollbackState {
        /// The spike.
        spike: SpikeId,
        /// The meta key that should have been present.
        key: &'static str,
    },

    /// The spike does not exist in the arena.
    #[error("spike not found: {0}")]
    SpikeNotFound(SpikeId),

    /// Only breakdowns and blizzards can be ended early.
    #[error("{0} spikes cannot be resolved early")]
    NotPlayerResolvable(SpikeType),

    /// Scheduler configuration is inconsistent.
    #[error("invalid spike configuration: {0}")]
    InvalidConfig(String),
}
