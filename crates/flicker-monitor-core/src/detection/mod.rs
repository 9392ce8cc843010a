mod channel_state;
mod flicker_detector;
mod flicker_event;
mod flicker_run;
mod sample_outcome;
mod sensor_id;

pub use {
    channel_state::SensorChannelState,
    flicker_detector::{DEFAULT_THRESHOLD_PERCENT, FlickerDetector},
    flicker_event::FlickerEvent,
    flicker_run::FlickerRun,
    sample_outcome::SampleOutcome,
    sensor_id::SensorId,
};
