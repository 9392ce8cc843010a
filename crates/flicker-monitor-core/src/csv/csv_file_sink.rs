use crate::{
    CoreError, CoreResult, EventSink, FlickerEvent, SampleRow,
    csv::{EVENT_LOG_HEADER, SAMPLE_LOG_HEADER, file_stamp},
};

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, ErrorKind, Write},
    panic::Location,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Upper bound on `_N` suffixes tried when stamped names are taken.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Append-only CSV log for one detection session.
///
/// Creates `sensor_data_<stamp>.csv` and `flicker_events_<stamp>.csv` in the
/// target directory, each starting with its fixed header. Existing files are
/// never opened: when a name is taken (two sessions in the same second) both
/// files get a `_2`, `_3`, ... suffix. Every append is flushed so a crash
/// loses at most the line being written.
pub struct CsvFileSink {
    samples: LogFile,
    events: LogFile,
}

struct LogFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl LogFile {
    /// Creates `path` exclusively and writes `header`. Fails with
    /// `AlreadyExists` instead of truncating an existing file.
    fn create_new(path: PathBuf, header: &str) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{header}")?;
        writer.flush()?;

        Ok(Self { path, writer })
    }

    #[track_caller]
    fn append(&mut self, line: &str) -> CoreResult<()> {
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|source| CoreError::SinkError {
                path: self.path.clone(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl CsvFileSink {
    /// Creates both log files under `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SinkError`] if the directory or files cannot be
    /// created.
    #[track_caller]
    #[instrument(skip(dir), fields(dir = ?dir.as_ref()))]
    pub fn create<P: AsRef<Path>>(dir: P, started_at: DateTime<Utc>) -> CoreResult<Self> {
        let dir = dir.as_ref();

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| CoreError::SinkError {
                path: dir.to_path_buf(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;
            debug!(dir = ?dir, "Created log directory");
        }

        let stamp = file_stamp(&started_at);
        let (samples, events) = Self::create_pair(dir, &stamp)?;

        info!(
            sample_log = ?samples.path,
            event_log = ?events.path,
            "Session logs created"
        );

        Ok(Self { samples, events })
    }

    /// Claims the first free `<stamp>` / `<stamp>_N` name for both logs.
    #[track_caller]
    fn create_pair(dir: &Path, stamp: &str) -> CoreResult<(LogFile, LogFile)> {
        let location = Location::caller();
        let sink_error = |path: PathBuf, source: io::Error| CoreError::SinkError {
            path,
            source,
            location: ErrorLocation::from(location),
        };

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let suffix = match attempt {
                1 => stamp.to_string(),
                n => format!("{stamp}_{n}"),
            };
            let sample_path = dir.join(format!("sensor_data_{suffix}.csv"));
            let event_path = dir.join(format!("flicker_events_{suffix}.csv"));

            let samples = match LogFile::create_new(sample_path.clone(), SAMPLE_LOG_HEADER) {
                Ok(log) => log,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(sink_error(sample_path, e)),
            };

            match LogFile::create_new(event_path.clone(), EVENT_LOG_HEADER) {
                Ok(events) => return Ok((samples, events)),
                Err(e) => {
                    // Both logs share one name.
                    drop(samples);
                    if let Err(cleanup) = fs::remove_file(&sample_path) {
                        debug!(error = %cleanup, path = ?sample_path, "Failed to remove unpaired log");
                    }
                    if e.kind() != ErrorKind::AlreadyExists {
                        return Err(sink_error(event_path, e));
                    }
                }
            }
        }

        Err(sink_error(
            dir.join(format!("sensor_data_{stamp}.csv")),
            io::Error::new(
                ErrorKind::AlreadyExists,
                format!("no free log name after {MAX_NAME_ATTEMPTS} attempts"),
            ),
        ))
    }

    /// Path of the per-sample log.
    pub fn sample_log_path(&self) -> &Path {
        &self.samples.path
    }

    /// Path of the flicker event log.
    pub fn event_log_path(&self) -> &Path {
        &self.events.path
    }
}

impl EventSink for CsvFileSink {
    fn append_sample_row(&mut self, row: &SampleRow) -> CoreResult<()> {
        self.samples.append(&row.to_csv_line())
    }

    fn append_flicker_event(&mut self, event: &FlickerEvent) -> CoreResult<()> {
        self.events.append(&event.to_csv_line())
    }
}
