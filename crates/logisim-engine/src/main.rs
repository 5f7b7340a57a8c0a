//! Engine binary for the Logisim simulation.
//!
//! This is the main entry point that wires together configuration, the
//! starting world, guaranteed-spike seeding, and either a headless day
//! loop or the Observer API with an auto-advancing clock.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `logisim-config.yaml` (or the path given as
//!    the first argument) and apply environment overrides
//! 2. Initialize structured logging (tracing)
//! 3. Build the starting world and seed early guaranteed spikes
//! 4. Serve the Observer API and advance one day per tick interval, or
//!    run headless until `max_days`

mod callbacks;
mod clock;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use logisim_core::{LoggingConfig, Simulation, SimulationConfig, run_days};
use logisim_observer::{AppState, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::callbacks::AlertLogCallback;
use crate::clock::run_clock;
use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "logisim-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let mut config = load_config(&config_path)?;
    config.apply_overrides(|key| std::env::var(key).ok());

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        config = %config_path.display(),
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_days = config.world.max_days,
        "logisim-engine starting"
    );

    // 3. Build the world and seed guaranteed spikes.
    let seeded = Simulation::seeded(&config).map_err(EngineError::from)?;
    info!(
        seeded_spikes = seeded.seeded_spikes.len(),
        funds = %seeded.simulation.state().treasury.balance(),
        "Starting world created"
    );

    // 4. Run.
    if config.observer.enabled {
        serve(seeded.simulation, &config).await?;
    } else {
        let days = if config.world.max_days == 0 {
            u64::MAX
        } else {
            config.world.max_days
        };
        let mut simulation = seeded.simulation;
        let result = run_days(
            &mut simulation,
            days,
            config.world.max_days,
            &mut AlertLogCallback,
        )
        .map_err(EngineError::from)?;
        info!(
            end_reason = ?result.end_reason,
            days_run = result.days_run,
            "logisim-engine shutdown complete"
        );
    }

    Ok(())
}

/// Serve the Observer API while a background task advances one day per
/// tick interval. An aborted day stops the clock and shuts the engine down
/// with that error; reaching `max_days` only stops the clock.
async fn serve(simulation: Simulation, config: &SimulationConfig) -> Result<(), EngineError> {
    let app_state = Arc::new(AppState::new(simulation));
    let interval = Duration::from_millis(config.world.tick_interval_ms.max(1));
    let clock = tokio::spawn(run_clock(
        Arc::clone(&app_state),
        interval,
        config.world.max_days,
    ));

    let server_config = ServerConfig::from(&config.observer);
    let server = logisim_observer::start_server(&server_config, app_state);
    tokio::pin!(server);

    tokio::select! {
        served = &mut server => served?,
        ticked = clock => {
            match ticked {
                Ok(Err(e)) => return Err(EngineError::from(e)),
                Ok(Ok(day)) => info!(day, "clock finished, still serving"),
                Err(e) => warn!(error = %e, "clock task ended unexpectedly, still serving"),
            }
            server.await?;
        }
    }
    Ok(())
}

/// Load the simulation configuration, falling back to defaults when the
/// file does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        eprintln!("config file {} not found, using defaults", path.display());
        Ok(SimulationConfig::default())
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}
