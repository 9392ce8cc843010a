#[allow(clippy::module_inception)]
mod monitor;
mod monitor_command;
mod monitor_handle;
mod monitor_status;

pub(crate) use {
    monitor::{Monitor, MonitorSettings},
    monitor_command::MonitorCommand,
    monitor_handle::MonitorHandle,
    monitor_status::MonitorStatus,
};
