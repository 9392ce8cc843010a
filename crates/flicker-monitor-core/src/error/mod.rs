use crate::recipe::Action;

use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

/// Flicker monitoring errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Serial port unavailable, failed to open, or closed underneath us.
    #[error("Connection error: {reason} {location}")]
    ConnectionError {
        /// Description of the connection failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A device command could not be written or was not acknowledged.
    #[error("Command '{command}' failed: {reason} {location}")]
    CommandError {
        /// Command byte that was being sent.
        command: char,
        /// Description of the write or acknowledgment failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Starting or stopping a detection session failed.
    #[error("Session error: {reason} {location}")]
    SessionError {
        /// Description of the session failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recipe step failed and the remaining steps were skipped.
    #[error("Recipe aborted at step {} ({action}): {source} {location}", .step + 1)]
    RecipeAborted {
        /// Zero-based index of the failing step.
        step: usize,
        /// The action that failed.
        action: Action,
        /// Underlying failure reported by the step.
        #[source]
        source: Box<CoreError>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recipe was submitted while another one is still executing.
    #[error("A recipe is already running {location}")]
    RecipeAlreadyRunning {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recipe action carries parameters that cannot be executed.
    #[error("Invalid action: {reason} {location}")]
    InvalidAction {
        /// Description of the invalid parameter.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A line from the device could not be parsed into a sample.
    #[error("Malformed sample {line:?}: {reason} {location}")]
    MalformedSample {
        /// The raw line as received.
        line: String,
        /// Why the line was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing to a log file failed.
    #[error("Log sink error at {path:?}: {source} {location}")]
    SinkError {
        /// File that was being written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
