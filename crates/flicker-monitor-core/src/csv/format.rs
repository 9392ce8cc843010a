use chrono::{DateTime, SecondsFormat, Utc};

/// Header line of the per-sample log.
pub const SAMPLE_LOG_HEADER: &str = "Time,Sensor1,Sensor2,Active_Flicker_S1,Active_Flicker_S2";

/// Header line of the flicker event log.
pub const EVENT_LOG_HEADER: &str =
    "Sensor,Start Time,End Time,Duration (seconds),Initial Value,Minimum Value,Percent Change";

/// RFC 3339 with millisecond precision, e.g. `2026-10-19T04:09:00.250Z`.
pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Compact stamp used in log file names.
pub(crate) fn file_stamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y%m%d_%H%M%S").to_string()
}
