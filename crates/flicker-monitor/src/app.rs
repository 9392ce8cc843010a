use crate::{
    AppError, AppResult, Command, Monitor, MonitorHandle, MonitorSettings, SerialLink,
    config::Config, recipe_file::load_recipe,
};

use flicker_monitor_core::{
    ActuatorPort, DeviceLink, RecipeExecutor, RecipeRunState, SensorId, status_line,
};

use std::{panic::Location, path::Path, time::Duration};

use error_location::ErrorLocation;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info, instrument, warn};

/// Application state for one command invocation.
pub struct App {
    pub(crate) config: Config,
}

impl App {
    /// Execute one command line subcommand.
    #[instrument(skip(self))]
    pub(crate) async fn run(self, command: Command) -> AppResult<()> {
        info!("Flicker Monitor starting");

        match command {
            Command::Ports => self.list_ports(),
            Command::Monitor {
                port,
                detect,
                duration,
            } => {
                let duration = duration.map(parse_duration).transpose()?;
                self.monitor(port, detect, duration).await
            }
            Command::Recipe { file, port } => self.run_recipe(&file, port).await,
        }
    }

    fn list_ports(&self) -> AppResult<()> {
        let ports = self.serial_link().list_ports()?;

        if ports.is_empty() {
            println!("No serial ports found");
        }
        for port in ports {
            println!("{port}");
        }

        Ok(())
    }

    /// Stream samples until Ctrl-C, the optional duration, or link loss.
    #[instrument(skip(self))]
    async fn monitor(
        &self,
        port: Option<String>,
        detect: bool,
        duration: Option<Duration>,
    ) -> AppResult<()> {
        let port = self.resolve_port(port)?;
        let (mut handle, task) = self.spawn_monitor();

        handle.connect(&port).await?;

        if detect {
            handle.start_session().await?;
        }

        let mut status_rx = handle.subscribe();
        let link_lost = status_rx.wait_for(|status| status.port.is_none());
        let elapsed = async {
            match duration {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Ctrl-C received, stopping");
            }
            _ = elapsed => info!("Monitoring duration elapsed"),
            _ = link_lost => warn!(port = %port, "Device link lost, stopping"),
        }

        if detect && handle.session_active() {
            handle.stop_session().await?;
        }

        let status = handle.status();
        for sensor in SensorId::ALL {
            println!(
                "{}: {} flicker(s)",
                sensor,
                status.flicker_counts[sensor.index()]
            );
        }
        if status.dropped_lines > 0 {
            println!("Dropped lines: {}", status.dropped_lines);
        }

        Self::stop_monitor(handle, task).await
    }

    /// Load a recipe file, connect and execute it.
    #[instrument(skip(self))]
    async fn run_recipe(&self, file: &Path, port: Option<String>) -> AppResult<()> {
        let recipe = load_recipe(file)?;
        let port = self.resolve_port(port)?;
        let (mut handle, task) = self.spawn_monitor();

        handle.connect(&port).await?;

        let executor = RecipeExecutor::new(self.config.recipe.settle_interval());
        let progress = log_progress(executor.subscribe());

        let result = executor.run(&recipe, &mut handle).await;
        progress.abort();

        let line = status_line(&result);
        println!("{line}");

        if handle.session_active() {
            // Recipe ended without an end_flicker step.
            handle.stop_session().await?;
        }

        Self::stop_monitor(handle, task).await?;

        result?;

        Ok(())
    }

    async fn stop_monitor(handle: MonitorHandle, task: JoinHandle<()>) -> AppResult<()> {
        handle.shutdown().await?;

        match tokio::time::timeout(Duration::from_secs(2), task).await {
            Ok(Ok(())) => info!("Monitor stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Monitor task panicked"),
            Err(_) => warn!("Monitor did not stop within timeout"),
        }

        Ok(())
    }

    fn spawn_monitor(&self) -> (MonitorHandle, JoinHandle<()>) {
        let settings = MonitorSettings {
            threshold_percent: self.config.detection.threshold_percent,
            poll_interval: self.config.serial.poll_interval(),
            data_dir: self.config.output.data_dir.clone(),
            ack_timeout: self.config.serial.ack_timeout(),
        };

        Monitor::spawn(self.serial_link(), settings)
    }

    fn serial_link(&self) -> SerialLink {
        SerialLink::new(self.config.serial.baud_rate, self.config.serial.read_timeout())
    }

    /// Command line port, else the configured one.
    #[track_caller]
    pub(crate) fn resolve_port(&self, port: Option<String>) -> AppResult<String> {
        port.or_else(|| self.config.serial.port.clone())
            .ok_or_else(|| AppError::ConfigError {
                reason: "No serial port given; pass --port or set serial.port".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

#[track_caller]
fn parse_duration(seconds: f64) -> AppResult<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|e| AppError::ConfigError {
        reason: format!("Invalid --duration {seconds}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn log_progress(mut state_rx: watch::Receiver<RecipeRunState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = *state_rx.borrow_and_update();
            if let RecipeRunState::Running {
                current_index,
                total,
                ..
            } = state
            {
                info!(step = current_index + 1, total, "Recipe progress");
            }
        }
    })
}
