//! Flicker Monitor Core Library
//!
//! Streaming flicker detection over paired sensor readings, CSV session
//! logs, and sequential replay of device-control recipes.
//!
//! # Example
//!
//! ```
//! use flicker_monitor_core::{FlickerDetector, Sample, SensorId};
//!
//! use chrono::{Duration, Utc};
//!
//! let mut detector = FlickerDetector::default();
//! detector.begin_session();
//!
//! let start = Utc::now();
//! for (i, value) in [100.0, 100.0, 80.0, 100.0].into_iter().enumerate() {
//!     let at = start + Duration::milliseconds(100 * i as i64);
//!     let outcome = detector.on_sample(&Sample::new(at, value, 50.0));
//!     for event in &outcome.events {
//!         println!("{}", event.to_csv_line());
//!     }
//! }
//!
//! assert_eq!(detector.flicker_count(SensorId::Sensor1), 1);
//! ```

mod csv;
mod detection;
mod error;
mod ports;
mod recipe;
mod sample;

pub use {
    csv::{CsvFileSink, EVENT_LOG_HEADER, SAMPLE_LOG_HEADER},
    detection::{
        DEFAULT_THRESHOLD_PERCENT, FlickerDetector, FlickerEvent, FlickerRun, SampleOutcome,
        SensorChannelState, SensorId,
    },
    error::{CoreError, Result as CoreResult},
    ports::{ActuatorPort, DeviceLink, EventSink},
    recipe::{
        Action, DEFAULT_SETTLE_INTERVAL, DeviceCommand, Recipe, RecipeExecutor, RecipeReport,
        RecipeRunState, status_line,
    },
    sample::{Sample, SampleRow},
};
