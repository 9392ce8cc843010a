use std::fmt;

/// Identifies one of the two sensor channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorId {
    /// First reading of each device line.
    Sensor1,
    /// Second reading of each device line.
    Sensor2,
}

impl SensorId {
    /// Both channels in slot order.
    pub const ALL: [SensorId; 2] = [SensorId::Sensor1, SensorId::Sensor2];

    /// Fixed slot index for per-sensor arrays.
    pub fn index(self) -> usize {
        match self {
            SensorId::Sensor1 => 0,
            SensorId::Sensor2 => 1,
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorId::Sensor1 => f.write_str("Sensor 1"),
            SensorId::Sensor2 => f.write_str("Sensor 2"),
        }
    }
}
