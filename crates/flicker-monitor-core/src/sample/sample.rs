use crate::{CoreError, CoreResult, SensorId};

use std::panic::Location;

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;

/// One paired reading from the two sensors, stamped on arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Wall-clock arrival time.
    pub timestamp: DateTime<Utc>,
    /// Reading from the first sensor.
    pub sensor1: f64,
    /// Reading from the second sensor.
    pub sensor2: f64,
}

impl Sample {
    /// Creates a sample from already-validated readings.
    pub fn new(timestamp: DateTime<Utc>, sensor1: f64, sensor2: f64) -> Self {
        Self {
            timestamp,
            sensor1,
            sensor2,
        }
    }

    /// Parses a device line of the form `<sensor1>,<sensor2>`.
    ///
    /// Surrounding whitespace is ignored. Both fields must be finite numbers;
    /// anything else is rejected so the caller can drop the line.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedSample`] when the line does not hold
    /// exactly two finite numeric fields.
    #[track_caller]
    pub fn parse_line(line: &str, timestamp: DateTime<Utc>) -> CoreResult<Self> {
        let trimmed = line.trim();
        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();

        if fields.len() != 2 {
            return Err(CoreError::MalformedSample {
                line: line.to_string(),
                reason: format!("expected 2 fields, found {}", fields.len()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let sensor1 = parse_reading(line, fields[0])?;
        let sensor2 = parse_reading(line, fields[1])?;

        Ok(Self::new(timestamp, sensor1, sensor2))
    }

    /// Reading for the given sensor.
    pub fn value(&self, sensor: SensorId) -> f64 {
        match sensor {
            SensorId::Sensor1 => self.sensor1,
            SensorId::Sensor2 => self.sensor2,
        }
    }
}

#[track_caller]
fn parse_reading(line: &str, field: &str) -> CoreResult<f64> {
    let value: f64 = field.parse().map_err(|e| CoreError::MalformedSample {
        line: line.to_string(),
        reason: format!("{field:?} is not a number: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    if !value.is_finite() {
        return Err(CoreError::MalformedSample {
            line: line.to_string(),
            reason: format!("{field:?} is not finite"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(value)
}
