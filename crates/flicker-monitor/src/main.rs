//! Flicker Monitor: two-sensor flicker detection and device recipes over a
//! serial link.

mod app;
mod cli;
mod config;
mod error;
mod monitor;
mod recipe_file;
mod serial_link;

pub(crate) use {
    app::App,
    cli::{Cli, Command},
    error::{AppError, Result as AppResult},
    monitor::{Monitor, MonitorCommand, MonitorHandle, MonitorSettings, MonitorStatus},
    serial_link::SerialLink,
};

use crate::config::Config;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "flicker_monitor=debug,flicker_monitor_core=debug";

/// Application entry point.
fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let app = App { config };

    if let Err(e) = rt.block_on(app.run(cli.command)) {
        error!(error = %e, "Flicker Monitor failed");
        std::process::exit(1);
    }
}
