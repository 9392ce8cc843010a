use crate::FlickerRun;

use chrono::{DateTime, Utc};

/// Per-sensor detection state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorChannelState {
    /// Previous reading, the reference for the next percent change.
    pub last_value: Option<f64>,
    /// The run currently open on this sensor, if any.
    pub active_flicker: Option<FlickerRun>,
}

impl SensorChannelState {
    /// Feeds one reading through the channel.
    ///
    /// Returns the run that closed on this reading, if any.
    pub(crate) fn observe(
        &mut self,
        value: f64,
        now: DateTime<Utc>,
        threshold_percent: f64,
    ) -> Option<FlickerRun> {
        let previous = self.last_value.replace(value)?;

        // Undefined when the previous reading is zero.
        let percent_change =
            (previous != 0.0).then(|| ((previous - value) / previous * 100.0).abs());

        if self.active_flicker.is_none() {
            match percent_change {
                Some(change) if change > threshold_percent => {
                    self.active_flicker = Some(FlickerRun::open(now, previous, value, change));
                }
                _ => return None,
            }
        }

        let run = self.active_flicker.as_mut()?;

        // The recovering reading closes the run without joining the excursion:
        // a closing sample never changes `min_value` or `max_percent_change`.
        if run.return_change(value).is_some_and(|change| change < threshold_percent) {
            return self.active_flicker.take();
        }

        run.min_value = run.min_value.min(value);
        if let Some(change) = percent_change {
            run.max_percent_change = run.max_percent_change.max(change);
        }

        None
    }
}
