use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Flicker Monitor - two-sensor flicker detection and device recipes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// List available serial ports
    Ports,

    /// Stream samples from the device until Ctrl-C
    Monitor {
        /// Serial port to open
        #[arg(short, long)]
        port: Option<String>,

        /// Run a detection session and write CSV logs
        #[arg(short, long)]
        detect: bool,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Execute a TOML recipe against the device
    Recipe {
        /// Recipe file
        file: PathBuf,

        /// Serial port to open
        #[arg(short, long)]
        port: Option<String>,
    },
}
