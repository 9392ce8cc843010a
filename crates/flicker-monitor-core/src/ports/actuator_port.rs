use crate::{CoreResult, DeviceCommand};

use async_trait::async_trait;

/// Operations a recipe drives, one at a time.
///
/// Every method resolves once the operation has been acknowledged.
#[async_trait]
pub trait ActuatorPort: Send {
    /// Whether a detection session is currently running.
    fn session_active(&self) -> bool;

    /// Starts a detection session. On success the detector has been reset.
    async fn start_session(&mut self) -> CoreResult<()>;

    /// Stops the running detection session.
    async fn stop_session(&mut self) -> CoreResult<()>;

    /// Sends a single-byte control command to the device.
    async fn send_command(&mut self, command: DeviceCommand) -> CoreResult<()>;
}
