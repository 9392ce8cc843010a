//! Sequential recipe execution.
//!
//! Runs one action at a time against an [`ActuatorPort`], pausing for a
//! settle interval after every step. The first failing step aborts the rest
//! of the recipe; nothing is rolled back or retried.

use crate::{
    Action, ActuatorPort, CoreError, CoreResult, DeviceCommand, Recipe, RecipeReport,
    RecipeRunState,
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Pause after every step so device and session changes can propagate.
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_millis(100);

/// Drives recipes step by step; at most one recipe at a time.
pub struct RecipeExecutor {
    settle_interval: Duration,
    state_tx: watch::Sender<RecipeRunState>,
}

/// Returns the executor to `Idle` when a run ends, however it ends.
struct RunGuard<'a> {
    state_tx: &'a watch::Sender<RecipeRunState>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state_tx.send_replace(RecipeRunState::Idle);
    }
}

impl RecipeExecutor {
    /// Creates an idle executor with the given settle interval.
    pub fn new(settle_interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(RecipeRunState::Idle);
        Self {
            settle_interval,
            state_tx,
        }
    }

    /// Current run state.
    pub fn state(&self) -> RecipeRunState {
        *self.state_tx.borrow()
    }

    /// Whether a recipe is executing.
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<RecipeRunState> {
        self.state_tx.subscribe()
    }

    /// Executes `recipe` against `port`, in order.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidAction`] if the recipe fails validation; nothing
    ///   runs.
    /// - [`CoreError::RecipeAlreadyRunning`] if another run is in progress.
    /// - [`CoreError::RecipeAborted`] wrapping the first step failure; steps
    ///   before it have taken effect, steps after it never run.
    #[instrument(skip(self, recipe, port), fields(steps = recipe.len()))]
    pub async fn run<P>(&self, recipe: &Recipe, port: &mut P) -> CoreResult<RecipeReport>
    where
        P: ActuatorPort + ?Sized,
    {
        recipe.validate()?;

        let run_id = Uuid::new_v4();
        let total = recipe.len();

        // Claim Running atomically so a concurrent caller sees it.
        let claimed = self.state_tx.send_if_modified(|state| {
            if state.is_running() {
                return false;
            }
            *state = RecipeRunState::Running {
                run_id,
                current_index: 0,
                total,
            };
            true
        });

        if !claimed {
            warn!("Recipe rejected, another recipe is running");
            return Err(CoreError::RecipeAlreadyRunning {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let _guard = RunGuard {
            state_tx: &self.state_tx,
        };

        info!(run_id = %run_id, total, "Recipe started");

        for (index, action) in recipe.actions().iter().enumerate() {
            self.state_tx.send_modify(|state| {
                if let RecipeRunState::Running { current_index, .. } = state {
                    *current_index = index;
                }
            });

            debug!(
                run_id = %run_id,
                step = index + 1,
                total,
                action = %action,
                "Executing step"
            );

            if let Err(source) = self.execute(action, port).await {
                warn!(
                    run_id = %run_id,
                    step = index + 1,
                    action = %action,
                    error = %source,
                    "Recipe aborted"
                );
                return Err(CoreError::RecipeAborted {
                    step: index,
                    action: action.clone(),
                    source: Box::new(source),
                    location: ErrorLocation::from(Location::caller()),
                });
            }

            tokio::time::sleep(self.settle_interval).await;
        }

        info!(run_id = %run_id, total, "Recipe completed");

        Ok(RecipeReport {
            run_id,
            actions_completed: total,
        })
    }

    async fn execute<P>(&self, action: &Action, port: &mut P) -> CoreResult<()>
    where
        P: ActuatorPort + ?Sized,
    {
        match action {
            Action::StartFlicker => {
                if port.session_active() {
                    debug!("Session already active, skipping start");
                    return Ok(());
                }
                port.start_session().await
            }
            Action::EndFlicker => {
                if !port.session_active() {
                    debug!("No active session, skipping stop");
                    return Ok(());
                }
                port.stop_session().await
            }
            Action::ConnectDevice => port.send_command(DeviceCommand::Connect).await,
            Action::DisconnectDevice => port.send_command(DeviceCommand::Disconnect).await,
            Action::Sleep => port.send_command(DeviceCommand::Sleep).await,
            Action::Wake => port.send_command(DeviceCommand::Wake).await,
            Action::Delay { seconds } => {
                let duration =
                    Duration::try_from_secs_f64(*seconds).map_err(|e| CoreError::InvalidAction {
                        reason: format!("delay of {seconds} seconds: {e}"),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
                tokio::time::sleep(duration).await;
                Ok(())
            }
        }
    }
}

impl Default for RecipeExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_INTERVAL)
    }
}

/// One-line, human-readable outcome of a recipe run.
pub fn status_line(result: &CoreResult<RecipeReport>) -> String {
    match result {
        Ok(report) => format!(
            "Recipe completed: {} action(s) executed",
            report.actions_completed
        ),
        Err(CoreError::RecipeAborted {
            step,
            action,
            source,
            ..
        }) => format!(
            "Recipe aborted at step {} ({action}): {}",
            step + 1,
            failure_reason(source)
        ),
        Err(e) => format!("Recipe not started: {}", failure_reason(e)),
    }
}

fn failure_reason(error: &CoreError) -> String {
    match error {
        CoreError::ConnectionError { reason, .. }
        | CoreError::SessionError { reason, .. }
        | CoreError::InvalidAction { reason, .. }
        | CoreError::MalformedSample { reason, .. } => reason.clone(),
        CoreError::CommandError {
            command, reason, ..
        } => format!("command '{command}': {reason}"),
        CoreError::RecipeAborted { source, .. } => failure_reason(source),
        CoreError::RecipeAlreadyRunning { .. } => "a recipe is already running".to_string(),
        CoreError::SinkError { path, source, .. } => format!("{}: {source}", path.display()),
    }
}
