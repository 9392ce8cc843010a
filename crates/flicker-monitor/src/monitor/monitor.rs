//! Monitor actor owning the device link, the detector and the session logs.
//!
//! Everything that touches detector state or the serial line goes through
//! this task, one message at a time: control commands, device lines and the
//! poll heartbeat. Commands and polls therefore never interleave on the wire.

use crate::{MonitorCommand, MonitorHandle, MonitorStatus};

use flicker_monitor_core::{
    CoreError, CoreResult, CsvFileSink, DeviceCommand, DeviceLink, EventSink, FlickerDetector,
    Sample, SensorId,
};

use std::{panic::Location, path::PathBuf, time::Duration};

use chrono::Utc;
use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Capacity of the device line channel. At ~10 lines/sec this absorbs
/// several seconds of backlog before the reader thread blocks.
const LINE_BUFFER: usize = 64;

/// Capacity of the control command channel.
const COMMAND_BUFFER: usize = 32;

/// Runtime parameters of a [`Monitor`].
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Flicker threshold in percent.
    pub threshold_percent: f64,
    /// Interval between `s` poll commands while connected.
    pub poll_interval: Duration,
    /// Directory receiving session CSV files.
    pub data_dir: PathBuf,
    /// Optional bound on waiting for command acknowledgment.
    pub ack_timeout: Option<Duration>,
}

/// Single owner of the device link, detector and session sink.
pub struct Monitor<L> {
    link: L,
    detector: FlickerDetector,
    sink: Option<CsvFileSink>,
    data_dir: PathBuf,
    poll_interval: Duration,
    command_rx: mpsc::Receiver<MonitorCommand>,
    lines: Option<mpsc::Receiver<String>>,
    status_tx: watch::Sender<MonitorStatus>,
    port: Option<String>,
    session_id: Option<Uuid>,
    last_sample: Option<Sample>,
    dropped_lines: u64,
}

impl<L: DeviceLink + 'static> Monitor<L> {
    /// Spawns the actor on the current runtime and returns its handle.
    pub fn spawn(link: L, settings: MonitorSettings) -> (MonitorHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (status_tx, status_rx) = watch::channel(MonitorStatus::default());

        let monitor = Self {
            link,
            detector: FlickerDetector::new(settings.threshold_percent),
            sink: None,
            data_dir: settings.data_dir,
            poll_interval: settings.poll_interval,
            command_rx,
            lines: None,
            status_tx,
            port: None,
            session_id: None,
            last_sample: None,
            dropped_lines: 0,
        };

        let task = tokio::spawn(monitor.run());
        let handle = MonitorHandle::new(command_tx, status_rx, settings.ack_timeout);

        (handle, task)
    }

    #[instrument(skip(self))]
    async fn run(mut self) {
        info!(
            threshold_percent = self.detector.threshold_percent(),
            "Monitor started"
        );

        let mut heartbeat = tokio::time::interval(self.poll_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(MonitorCommand::Shutdown) => {
                            info!("Shutdown requested");
                            break;
                        }
                        Some(command) => self.handle_command(command),
                        None => {
                            info!("All handles dropped, shutting down");
                            break;
                        }
                    }
                }

                line = next_line(&mut self.lines), if self.lines.is_some() => {
                    match line {
                        Some(line) => self.handle_line(&line),
                        None => self.handle_link_lost(),
                    }
                }

                _ = heartbeat.tick(), if self.link.is_connected() => {
                    self.poll_device();
                }
            }
        }

        self.shutdown();
        info!("Monitor stopped");
    }

    fn handle_command(&mut self, command: MonitorCommand) {
        let (outcome, reply) = match command {
            MonitorCommand::Connect { port, reply } => (self.connect(&port), reply),
            MonitorCommand::Disconnect { reply } => (self.disconnect(), reply),
            MonitorCommand::SendCommand { command, reply } => {
                (self.link.send_command(command), reply)
            }
            MonitorCommand::StartSession { reply } => (self.start_session(), reply),
            MonitorCommand::StopSession { reply } => (self.stop_session(), reply),
            MonitorCommand::Shutdown => return,
        };

        if let Err(e) = &outcome {
            warn!(error = %e, "Monitor command failed");
        }

        // The requester may have given up waiting.
        if reply.send(outcome).is_err() {
            debug!("Command reply dropped, requester gone");
        }
    }

    fn connect(&mut self, port: &str) -> CoreResult<()> {
        if self.link.is_connected() {
            self.disconnect()?;
        }

        let (line_tx, line_rx) = mpsc::channel(LINE_BUFFER);
        self.link.connect(port, line_tx)?;

        self.lines = Some(line_rx);
        self.port = Some(port.to_string());
        self.detector.reset();
        self.publish();

        info!(port = %port, "Connected");

        Ok(())
    }

    fn disconnect(&mut self) -> CoreResult<()> {
        self.lines = None;
        let result = self.link.disconnect();

        if let Some(port) = self.port.take() {
            info!(port = %port, "Disconnected");
        }
        self.detector.reset();
        self.publish();

        result
    }

    #[track_caller]
    fn start_session(&mut self) -> CoreResult<()> {
        if self.detector.is_active() {
            return Err(CoreError::SessionError {
                reason: "a detection session is already active".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let sink = CsvFileSink::create(&self.data_dir, Utc::now()).map_err(|e| {
            CoreError::SessionError {
                reason: format!("cannot create session logs: {e}"),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let session_id = Uuid::new_v4();
        self.sink = Some(sink);
        self.session_id = Some(session_id);
        self.detector.begin_session();
        self.publish();

        info!(session_id = %session_id, "Detection session started");

        Ok(())
    }

    #[track_caller]
    fn stop_session(&mut self) -> CoreResult<()> {
        let Some(session_id) = self.session_id.take() else {
            return Err(CoreError::SessionError {
                reason: "no detection session is active".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        self.detector.end_session();
        self.sink = None;
        self.publish();

        info!(
            session_id = %session_id,
            sensor1_flickers = self.detector.flicker_count(SensorId::Sensor1),
            sensor2_flickers = self.detector.flicker_count(SensorId::Sensor2),
            "Detection session stopped"
        );

        Ok(())
    }

    fn handle_line(&mut self, line: &str) {
        let sample = match Sample::parse_line(line, Utc::now()) {
            Ok(sample) => sample,
            Err(e) => {
                self.dropped_lines += 1;
                debug!(error = %e, dropped = self.dropped_lines, "Dropped device line");
                self.publish();
                return;
            }
        };

        let outcome = self.detector.on_sample(&sample);

        if let Some(sink) = self.sink.as_mut() {
            if let Some(row) = &outcome.row {
                if let Err(e) = sink.append_sample_row(row) {
                    error!(error = %e, "Failed to append sample row");
                }
            }
            for event in &outcome.events {
                if let Err(e) = sink.append_flicker_event(event) {
                    error!(error = %e, sensor = %event.sensor, "Failed to append flicker event");
                }
            }
        }

        self.last_sample = Some(sample);
        self.publish();
    }

    fn handle_link_lost(&mut self) {
        warn!(port = ?self.port, "Device link lost");

        self.lines = None;
        if let Err(e) = self.link.disconnect() {
            debug!(error = %e, "Link cleanup after loss failed");
        }
        self.port = None;
        self.detector.reset();
        self.publish();
    }

    fn poll_device(&mut self) {
        if let Err(e) = self.link.send_command(DeviceCommand::Sleep) {
            warn!(error = %e, "Poll command failed");
        }
    }

    fn shutdown(&mut self) {
        if self.session_id.is_some() {
            if let Err(e) = self.stop_session() {
                error!(error = %e, "Failed to stop session on shutdown");
            }
        }

        if self.link.is_connected() {
            if let Err(e) = self.disconnect() {
                error!(error = %e, "Failed to disconnect on shutdown");
            }
        }
    }

    fn publish(&self) {
        self.status_tx.send_replace(MonitorStatus {
            port: self.port.clone(),
            session_id: self.session_id,
            last_sample: self.last_sample,
            flicker_counts: self.detector.flicker_counts(),
            open_runs: [
                self.detector.has_open_run(SensorId::Sensor1),
                self.detector.has_open_run(SensorId::Sensor2),
            ],
            dropped_lines: self.dropped_lines,
        });
    }
}

async fn next_line(lines: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match lines {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
