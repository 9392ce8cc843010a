mod action;
mod device_command;
mod executor;
#[allow(clippy::module_inception)]
mod recipe;
mod report;
mod run_state;

pub use {
    action::Action,
    device_command::DeviceCommand,
    executor::{DEFAULT_SETTLE_INTERVAL, RecipeExecutor, status_line},
    recipe::Recipe,
    report::RecipeReport,
    run_state::RecipeRunState,
};
