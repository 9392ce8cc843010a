use crate::config::{default_baud_rate, default_poll_interval_ms, default_read_timeout_ms};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serial link configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port to connect to when none is given on the command line.
    #[serde(default)]
    pub port: Option<String>,

    /// Baud rate of the device.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Interval between `s` poll commands while connected.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Read timeout of the serial reader thread.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Upper bound on waiting for a command acknowledgment (None = wait forever).
    #[serde(default)]
    pub ack_timeout_ms: Option<u64>,
}

impl SerialConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn ack_timeout(&self) -> Option<Duration> {
        self.ack_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            poll_interval_ms: default_poll_interval_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            ack_timeout_ms: None,
        }
    }
}
