use crate::{FlickerEvent, Sample, SampleOutcome, SampleRow, SensorChannelState, SensorId};

use tracing::{debug, info, instrument};

/// Relative change, in percent, that opens and closes a flicker run.
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 1.0;

/// Streaming flicker detector for the two sensor channels.
///
/// Opens a run when a reading moves more than the threshold away from the
/// reading just before it, and closes the run once a reading comes back
/// within the threshold of the run's baseline. The run reports the worst
/// excursion seen while open.
///
/// Samples are only evaluated while a session is active. Stopping a
/// session discards any open run without emitting it.
#[derive(Debug, Clone)]
pub struct FlickerDetector {
    threshold_percent: f64,
    active: bool,
    channels: [SensorChannelState; 2],
    counts: [u64; 2],
}

impl FlickerDetector {
    /// Creates an inactive detector with the given threshold in percent.
    pub fn new(threshold_percent: f64) -> Self {
        Self {
            threshold_percent,
            active: false,
            channels: [SensorChannelState::default(); 2],
            counts: [0; 2],
        }
    }

    /// Evaluates one sample.
    ///
    /// While inactive this is a no-op returning an empty outcome.
    pub fn on_sample(&mut self, sample: &Sample) -> SampleOutcome {
        if !self.active {
            return SampleOutcome::default();
        }

        let mut events = Vec::new();

        for sensor in SensorId::ALL {
            let slot = sensor.index();
            let closed = self.channels[slot].observe(
                sample.value(sensor),
                sample.timestamp,
                self.threshold_percent,
            );

            if let Some(run) = closed {
                let event = FlickerEvent::close(sensor, run, sample.timestamp);
                self.counts[slot] += 1;

                info!(
                    sensor = %sensor,
                    duration_s = event.duration_seconds,
                    percent_change = event.percent_change,
                    count = self.counts[slot],
                    "Flicker closed"
                );

                events.push(event);
            }
        }

        let open_runs = [
            self.has_open_run(SensorId::Sensor1),
            self.has_open_run(SensorId::Sensor2),
        ];

        SampleOutcome {
            row: Some(SampleRow::from_sample(sample, open_runs)),
            events,
        }
    }

    /// Clears both channels and both flicker counts.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.channels = [SensorChannelState::default(); 2];
        self.counts = [0; 2];
        debug!("Detector state reset");
    }

    /// Resets all state and starts evaluating samples.
    pub fn begin_session(&mut self) {
        self.reset();
        self.active = true;
    }

    /// Stops evaluating samples and drops any open run unemitted.
    ///
    /// Counts stay readable until the next reset.
    pub fn end_session(&mut self) {
        for (slot, channel) in self.channels.iter_mut().enumerate() {
            if channel.active_flicker.take().is_some() {
                debug!(slot, "Open flicker run discarded");
            }
            channel.last_value = None;
        }
        self.active = false;
    }

    /// Whether a session is currently running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Threshold in percent.
    pub fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }

    /// Closed runs on `sensor` since the last reset.
    pub fn flicker_count(&self, sensor: SensorId) -> u64 {
        self.counts[sensor.index()]
    }

    /// Both flicker counts in slot order.
    pub fn flicker_counts(&self) -> [u64; 2] {
        self.counts
    }

    /// Whether `sensor` currently has an open run.
    pub fn has_open_run(&self, sensor: SensorId) -> bool {
        self.channels[sensor.index()].active_flicker.is_some()
    }

    /// Current state of one channel.
    pub fn channel(&self, sensor: SensorId) -> &SensorChannelState {
        &self.channels[sensor.index()]
    }
}

impl Default for FlickerDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_PERCENT)
    }
}
