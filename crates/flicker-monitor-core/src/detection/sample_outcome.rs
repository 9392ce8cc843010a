use crate::{FlickerEvent, SampleRow};

/// What the detector produced for a single sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleOutcome {
    /// Row for the sample log; `None` while no session is active.
    pub row: Option<SampleRow>,
    /// Runs that closed on this sample, at most one per sensor.
    pub events: Vec<FlickerEvent>,
}
