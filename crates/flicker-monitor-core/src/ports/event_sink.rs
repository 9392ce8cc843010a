use crate::{CoreResult, FlickerEvent, SampleRow};

/// Append-only destination for sample rows and closed flicker events.
pub trait EventSink {
    /// Appends one sample row.
    fn append_sample_row(&mut self, row: &SampleRow) -> CoreResult<()>;

    /// Appends one closed flicker event.
    fn append_flicker_event(&mut self, event: &FlickerEvent) -> CoreResult<()>;
}
