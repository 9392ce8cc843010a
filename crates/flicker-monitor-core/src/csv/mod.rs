mod csv_file_sink;
mod format;

pub use {
    csv_file_sink::CsvFileSink,
    format::{EVENT_LOG_HEADER, SAMPLE_LOG_HEADER},
};

pub(crate) use format::{file_stamp, format_timestamp};
