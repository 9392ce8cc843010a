use crate::{CoreError, CoreResult};

use std::{fmt, panic::Location, time::Duration};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// One recipe step.
///
/// Serialized with a `type` tag, e.g. `{ type = "delay", seconds = 5.0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Start a detection session unless one is running.
    StartFlicker,
    /// Stop the running detection session, if any.
    EndFlicker,
    /// Send `c` to the device.
    ConnectDevice,
    /// Send `d` to the device.
    DisconnectDevice,
    /// Send `s` to the device.
    Sleep,
    /// Send `w` to the device.
    Wake,
    /// Pause without touching the device.
    Delay {
        /// Pause length in seconds.
        seconds: f64,
    },
}

impl Action {
    /// Builds a delay step, rejecting negative or non-finite lengths.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAction`] for an unusable duration.
    #[track_caller]
    pub fn delay(seconds: f64) -> CoreResult<Self> {
        let action = Action::Delay { seconds };
        action.validate()?;
        Ok(action)
    }

    /// Checks that the step can be executed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAction`] for a delay that is negative,
    /// not finite, or too large to represent.
    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        if let Action::Delay { seconds } = self {
            Duration::try_from_secs_f64(*seconds).map_err(|e| CoreError::InvalidAction {
                reason: format!("delay of {seconds} seconds: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }
        Ok(())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::StartFlicker => f.write_str("Start Flicker"),
            Action::EndFlicker => f.write_str("End Flicker"),
            Action::ConnectDevice => f.write_str("Connect Device"),
            Action::DisconnectDevice => f.write_str("Disconnect Device"),
            Action::Sleep => f.write_str("Sleep"),
            Action::Wake => f.write_str("Wake"),
            Action::Delay { seconds } => write!(f, "Delay {seconds}s"),
        }
    }
}
