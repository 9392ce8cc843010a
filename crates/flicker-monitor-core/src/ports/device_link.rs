use crate::{CoreResult, DeviceCommand};

use tokio::sync::mpsc;

/// Serial connection to the sensor device.
///
/// Received text lines are pushed, in arrival order, into the sender given
/// to [`DeviceLink::connect`]. The link drops that sender when the
/// connection closes, which is how the consumer observes link loss.
pub trait DeviceLink: Send {
    /// Identifiers of the ports that can be connected to.
    fn list_ports(&self) -> CoreResult<Vec<String>>;

    /// Opens `port` and starts forwarding lines into `lines`.
    ///
    /// An existing connection is closed first.
    fn connect(&mut self, port: &str, lines: mpsc::Sender<String>) -> CoreResult<()>;

    /// Closes the connection. Closing an idle link is a no-op.
    fn disconnect(&mut self) -> CoreResult<()>;

    /// Whether a connection is open.
    fn is_connected(&self) -> bool;

    /// Writes one command byte and waits for the write to complete.
    fn send_command(&mut self, command: DeviceCommand) -> CoreResult<()>;
}
