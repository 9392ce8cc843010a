use crate::{FlickerRun, SensorId, csv::format_timestamp};

use chrono::{DateTime, Utc};

/// A closed flicker, emitted exactly once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlickerEvent {
    /// Sensor the flicker was observed on.
    pub sensor: SensorId,
    /// When the run opened.
    pub start_time: DateTime<Utc>,
    /// When the reading returned within threshold of the baseline.
    pub end_time: DateTime<Utc>,
    /// `end_time - start_time` in seconds.
    pub duration_seconds: f64,
    /// Baseline reading before the excursion.
    pub initial_value: f64,
    /// Lowest reading during the run.
    pub minimum_value: f64,
    /// Worst sample-to-sample change during the run, in percent.
    pub percent_change: f64,
}

impl FlickerEvent {
    pub(crate) fn close(sensor: SensorId, run: FlickerRun, end_time: DateTime<Utc>) -> Self {
        let elapsed = end_time - run.start_time;

        Self {
            sensor,
            start_time: run.start_time,
            end_time,
            duration_seconds: elapsed.num_milliseconds() as f64 / 1000.0,
            initial_value: run.initial_value,
            minimum_value: run.min_value,
            percent_change: run.max_percent_change,
        }
    }

    /// Renders the event for the event log, without a trailing newline.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{:.3},{:.3},{:.3},{:.2}",
            self.sensor,
            format_timestamp(&self.start_time),
            format_timestamp(&self.end_time),
            self.duration_seconds,
            self.initial_value,
            self.minimum_value,
            self.percent_change
        )
    }
}
