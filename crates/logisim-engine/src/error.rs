//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: logisim_core::ConfigError,
    },

    /// The starting world or spike settings were rejected.
    #[error("setup error: {source}")]
    Setup {
        /// The underlying setup error.
        #[from]
        source: logisim_core::SetupError,
    },

    /// A day-advance aborted.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: logisim_core::TickError,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },

    /// Observer API server failed.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: logisim_observer::ServerError,
    },
}
