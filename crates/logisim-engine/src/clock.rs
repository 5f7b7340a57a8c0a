//! Wall-clock driver that advances the served simulation.
//!
//! [`run_clock`] sleeps one tick interval, then takes the write lock and
//! steps a single day. It returns once the configured last day is reached
//! or on the first aborted day; an abort is never retried.

use std::sync::Arc;
use std::time::Duration;

use logisim_core::{ClockStep, TickError, step_day};
use logisim_observer::AppState;
use tracing::{error, info};

use crate::callbacks::{AlertLogCallback, ObserverCallback};

/// Advance `state`'s simulation once per `interval` until `max_days`
/// (0 for no limit). Returns the final day.
///
/// # Errors
///
/// Returns the [`TickError`] of the first aborted day. The simulation
/// stays at the last committed day.
pub async fn run_clock(
    state: Arc<AppState>,
    interval: Duration,
    max_days: u64,
) -> Result<u64, TickError> {
    let mut callbacks = (ObserverCallback::new(Arc::clone(&state)), AlertLogCallback);
    loop {
        tokio::time::sleep(interval).await;
        let mut simulation = state.simulation.write().await;
        match step_day(&mut simulation, max_days, &mut callbacks) {
            Ok(ClockStep::Advanced(_)) => {}
            Ok(ClockStep::Finished) => {
                let day = simulation.day();
                info!(day, "max days reached, clock stopped");
                return Ok(day);
            }
            Err(e) => {
                error!(day = simulation.day(), error = %e, "day advance aborted, clock stopped");
                return Err(e);
            }
        }
    }
}
