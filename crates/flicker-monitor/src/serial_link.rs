//! Serial port implementation of [`DeviceLink`].

use flicker_monitor_core::{CoreError, CoreResult, DeviceCommand, DeviceLink};

use std::{
    io::{BufRead, BufReader, ErrorKind, Write},
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};

use error_location::ErrorLocation;
use serialport::SerialPort;
use tokio::{
    runtime::{Handle, RuntimeFlavor},
    sync::mpsc,
};
use tracing::{debug, info, instrument, warn};

/// Line-oriented serial connection to the sensor board.
///
/// Reading happens on a dedicated thread that forwards every non-empty,
/// trimmed line. Writes go straight to the port from the caller.
pub struct SerialLink {
    baud_rate: u32,
    read_timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
    /// Tells the reader thread to exit at its next read timeout.
    shutdown: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl SerialLink {
    /// Creates an unconnected link.
    pub fn new(baud_rate: u32, read_timeout: Duration) -> Self {
        Self {
            baud_rate,
            read_timeout,
            port: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            reader: None,
        }
    }
}

impl DeviceLink for SerialLink {
    #[track_caller]
    fn list_ports(&self) -> CoreResult<Vec<String>> {
        let ports = serialport::available_ports().map_err(|e| CoreError::ConnectionError {
            reason: format!("Failed to enumerate serial ports: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    #[track_caller]
    #[instrument(skip(self, lines))]
    fn connect(&mut self, port: &str, lines: mpsc::Sender<String>) -> CoreResult<()> {
        if self.port.is_some() {
            self.disconnect()?;
        }

        let serial = serialport::new(port, self.baud_rate)
            .timeout(self.read_timeout)
            .open()
            .map_err(|e| CoreError::ConnectionError {
                reason: format!("Failed to open {}: {}", port, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let reader_port = serial.try_clone().map_err(|e| CoreError::ConnectionError {
            reason: format!("Failed to clone {} for reading: {}", port, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Fresh flag per connection so a slow old reader cannot be revived.
        let shutdown = Arc::new(AtomicBool::new(false));
        self.shutdown = Arc::clone(&shutdown);

        let reader = std::thread::Builder::new()
            .name("serial-reader".to_string())
            .spawn(move || read_lines(reader_port, lines, shutdown))
            .map_err(|e| CoreError::ConnectionError {
                reason: format!("Failed to spawn serial reader: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.port = Some(serial);
        self.reader = Some(reader);

        info!(port = %port, baud_rate = self.baud_rate, "Serial port opened");

        Ok(())
    }

    fn disconnect(&mut self) -> CoreResult<()> {
        self.shutdown.store(true, Ordering::Release);
        self.port = None;

        if let Some(reader) = self.reader.take() {
            join_reader(reader);
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some() && self.reader.as_ref().is_some_and(|r| !r.is_finished())
    }

    #[track_caller]
    fn send_command(&mut self, command: DeviceCommand) -> CoreResult<()> {
        let location = Location::caller();
        let Some(port) = self.port.as_mut() else {
            return Err(CoreError::CommandError {
                command: command.as_char(),
                reason: "not connected".to_string(),
                location: ErrorLocation::from(location),
            });
        };

        port.write_all(&[command.as_byte()])
            .and_then(|()| port.flush())
            .map_err(|e| CoreError::CommandError {
                command: command.as_char(),
                reason: e.to_string(),
                location: ErrorLocation::from(location),
            })?;

        debug!(command = %command, "Command written");

        Ok(())
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}

/// Waits for the reader to see its shutdown flag, at most one read timeout.
///
/// The port is only released once the reader exits. On a multi-thread
/// runtime the wait runs under `block_in_place` so the worker's other tasks
/// move elsewhere. A current-thread runtime or no runtime blocks in place.
pub(crate) fn join_reader(reader: JoinHandle<()>) {
    let on_multi_thread_runtime = Handle::try_current()
        .is_ok_and(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread);

    let joined = if on_multi_thread_runtime {
        tokio::task::block_in_place(|| reader.join())
    } else {
        reader.join()
    };

    if joined.is_err() {
        warn!("Serial reader thread panicked");
    }
}

/// Reader thread body. Returning drops `lines`, which the consumer sees as
/// link loss.
fn read_lines(port: Box<dyn SerialPort>, lines: mpsc::Sender<String>, shutdown: Arc<AtomicBool>) {
    let mut reader = BufReader::new(port);
    // Survives read timeouts so a line split across reads is reassembled.
    let mut buffer = Vec::new();

    while !shutdown.load(Ordering::Acquire) {
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) => {
                info!("Serial port closed by device");
                break;
            }
            Ok(_) => {
                if buffer.last() != Some(&b'\n') {
                    continue;
                }

                let line = String::from_utf8_lossy(&buffer).trim().to_string();
                buffer.clear();

                if line.is_empty() {
                    continue;
                }

                if lines.blocking_send(line).is_err() {
                    debug!("Line receiver dropped, stopping reader");
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => continue,
            Err(e) => {
                warn!(error = %e, "Serial read failed");
                break;
            }
        }
    }
}
