#[allow(clippy::module_inception)]
mod config;
mod detection_config;
mod output_config;
mod recipe_config;
mod serial_config;

pub(crate) use {
    config::Config, detection_config::DetectionConfig, output_config::OutputConfig,
    recipe_config::RecipeConfig, serial_config::SerialConfig,
};

pub(crate) const DEFAULT_BAUD_RATE: u32 = 9600;
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub(crate) const DEFAULT_READ_TIMEOUT_MS: u64 = 50;
pub(crate) const DEFAULT_SETTLE_MS: u64 = 100;

pub(crate) fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub(crate) fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

pub(crate) fn default_threshold_percent() -> f64 {
    flicker_monitor_core::DEFAULT_THRESHOLD_PERCENT
}

pub(crate) fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE_MS
}

pub(crate) fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "flicker-monitor", "Flicker-Monitor")
}
