use crate::{Sample, csv::format_timestamp};

use chrono::{DateTime, Utc};

/// Raw per-sample log row written while a detection session is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRow {
    /// Arrival time of the sample.
    pub timestamp: DateTime<Utc>,
    /// Reading from the first sensor.
    pub sensor1: f64,
    /// Reading from the second sensor.
    pub sensor2: f64,
    /// Whether sensor 1 had an open flicker run after this sample.
    pub sensor1_has_open_run: bool,
    /// Whether sensor 2 had an open flicker run after this sample.
    pub sensor2_has_open_run: bool,
}

impl SampleRow {
    pub(crate) fn from_sample(sample: &Sample, open_runs: [bool; 2]) -> Self {
        Self {
            timestamp: sample.timestamp,
            sensor1: sample.sensor1,
            sensor2: sample.sensor2,
            sensor1_has_open_run: open_runs[0],
            sensor2_has_open_run: open_runs[1],
        }
    }

    /// Renders the row for the sample log, without a trailing newline.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{:.3},{:.3},{},{}",
            format_timestamp(&self.timestamp),
            self.sensor1,
            self.sensor2,
            self.sensor1_has_open_run,
            self.sensor2_has_open_run
        )
    }
}
