use flicker_monitor_core::Sample;

use uuid::Uuid;

/// Live view of the monitor, republished after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorStatus {
    /// Connected serial port, if any.
    pub port: Option<String>,
    /// Identifier of the running detection session, if any.
    pub session_id: Option<Uuid>,
    /// Most recent parsed sample, shown whether or not a session runs.
    pub last_sample: Option<Sample>,
    /// Closed flicker runs per sensor since the session started.
    pub flicker_counts: [u64; 2],
    /// Whether each sensor has an open run.
    pub open_runs: [bool; 2],
    /// Device lines dropped because they did not parse.
    pub dropped_lines: u64,
}

impl MonitorStatus {
    /// Whether a detection session is running.
    pub fn session_active(&self) -> bool {
        self.session_id.is_some()
    }
}
