use chrono::{DateTime, Utc};

/// An open, in-progress flicker on one sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlickerRun {
    /// Arrival time of the sample that crossed the threshold.
    pub start_time: DateTime<Utc>,
    /// Reading immediately before the excursion; the return baseline.
    pub initial_value: f64,
    /// Lowest reading seen while the run is open.
    pub min_value: f64,
    /// Largest sample-to-sample change seen while open, in percent.
    pub max_percent_change: f64,
}

impl FlickerRun {
    pub(crate) fn open(
        start_time: DateTime<Utc>,
        initial_value: f64,
        value: f64,
        percent_change: f64,
    ) -> Self {
        Self {
            start_time,
            initial_value,
            min_value: value,
            max_percent_change: percent_change,
        }
    }

    /// Distance of `value` from the baseline in percent.
    ///
    /// `None` when the baseline is zero, which keeps the run open.
    pub(crate) fn return_change(&self, value: f64) -> Option<f64> {
        if self.initial_value == 0.0 {
            return None;
        }
        Some(((value - self.initial_value) / self.initial_value).abs() * 100.0)
    }
}
