use flicker_monitor_core::{CoreResult, DeviceCommand};

use tokio::sync::oneshot;

/// Reply channel carrying the outcome of one command.
pub type Reply = oneshot::Sender<CoreResult<()>>;

/// Requests handled by the [`Monitor`](super::Monitor) actor, one at a time.
#[derive(Debug)]
pub enum MonitorCommand {
    /// Open the serial connection on `port`.
    Connect {
        /// Port identifier as listed by the link.
        port: String,
        /// Outcome of the connect.
        reply: Reply,
    },
    /// Close the serial connection.
    Disconnect {
        /// Outcome of the disconnect.
        reply: Reply,
    },
    /// Write one control byte to the device.
    SendCommand {
        /// Command to send.
        command: DeviceCommand,
        /// Outcome once the write completed.
        reply: Reply,
    },
    /// Start a detection session with fresh logs.
    StartSession {
        /// Outcome of the start.
        reply: Reply,
    },
    /// Stop the running detection session.
    StopSession {
        /// Outcome of the stop.
        reply: Reply,
    },
    /// End the session, disconnect and stop the actor.
    Shutdown,
}
