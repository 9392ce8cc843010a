use crate::{AppError, AppResult, MonitorCommand, MonitorStatus, monitor::monitor_command::Reply};

use flicker_monitor_core::{ActuatorPort, CoreError, CoreResult, DeviceCommand};

use std::{panic::Location, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::instrument;

/// Cloneable client of the [`Monitor`](super::Monitor) actor.
///
/// Every request resolves once the actor has executed it. With an
/// acknowledgment timeout configured, a request that is not answered in time
/// fails, although the actor may still execute it later.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    command_tx: mpsc::Sender<MonitorCommand>,
    status_rx: watch::Receiver<MonitorStatus>,
    ack_timeout: Option<Duration>,
}

impl MonitorHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<MonitorCommand>,
        status_rx: watch::Receiver<MonitorStatus>,
        ack_timeout: Option<Duration>,
    ) -> Self {
        Self {
            command_tx,
            status_rx,
            ack_timeout,
        }
    }

    /// Snapshot of the current monitor status.
    pub fn status(&self) -> MonitorStatus {
        self.status_rx.borrow().clone()
    }

    /// Receiver observing every status change.
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status_rx.clone()
    }

    /// Open the serial connection on `port`.
    #[instrument(skip(self))]
    pub async fn connect(&self, port: &str) -> CoreResult<()> {
        self.request(
            |reply| MonitorCommand::Connect {
                port: port.to_string(),
                reply,
            },
            connection_failure,
        )
        .await
    }

    /// Close the serial connection.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) -> CoreResult<()> {
        self.request(
            |reply| MonitorCommand::Disconnect { reply },
            connection_failure,
        )
        .await
    }

    /// Ask the actor to stop its session, disconnect and exit.
    pub async fn shutdown(&self) -> AppResult<()> {
        self.command_tx
            .send(MonitorCommand::Shutdown)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send Shutdown: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn request<B, F>(&self, build: B, failure: F) -> CoreResult<()>
    where
        B: FnOnce(Reply) -> MonitorCommand,
        F: Fn(String) -> CoreError,
    {
        let (reply, response) = oneshot::channel();

        self.command_tx
            .send(build(reply))
            .await
            .map_err(|_| failure("monitor is not running".to_string()))?;

        let outcome = match self.ack_timeout {
            Some(limit) => tokio::time::timeout(limit, response)
                .await
                .map_err(|_| failure(format!("no acknowledgment within {limit:?}")))?,
            None => response.await,
        };

        outcome.map_err(|_| failure("monitor dropped the request".to_string()))?
    }
}

#[async_trait]
impl ActuatorPort for MonitorHandle {
    fn session_active(&self) -> bool {
        self.status_rx.borrow().session_active()
    }

    async fn start_session(&mut self) -> CoreResult<()> {
        self.request(
            |reply| MonitorCommand::StartSession { reply },
            session_failure,
        )
        .await
    }

    async fn stop_session(&mut self) -> CoreResult<()> {
        self.request(
            |reply| MonitorCommand::StopSession { reply },
            session_failure,
        )
        .await
    }

    async fn send_command(&mut self, command: DeviceCommand) -> CoreResult<()> {
        self.request(
            |reply| MonitorCommand::SendCommand { command, reply },
            |reason| CoreError::CommandError {
                command: command.as_char(),
                reason,
                location: ErrorLocation::from(Location::caller()),
            },
        )
        .await
    }
}

#[track_caller]
fn connection_failure(reason: String) -> CoreError {
    CoreError::ConnectionError {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

#[track_caller]
fn session_failure(reason: String) -> CoreError {
    CoreError::SessionError {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}
