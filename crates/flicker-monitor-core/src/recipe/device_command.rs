use std::fmt;

/// Single-character control commands understood by the device firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCommand {
    /// `c`: connect the device under test.
    Connect,
    /// `d`: disconnect the device under test.
    Disconnect,
    /// `s`: put the device to sleep; also the periodic reading poll.
    Sleep,
    /// `w`: wake the device.
    Wake,
}

impl DeviceCommand {
    /// Byte written to the serial link.
    pub fn as_byte(self) -> u8 {
        match self {
            DeviceCommand::Connect => b'c',
            DeviceCommand::Disconnect => b'd',
            DeviceCommand::Sleep => b's',
            DeviceCommand::Wake => b'w',
        }
    }

    /// The command as a character, for messages.
    pub fn as_char(self) -> char {
        char::from(self.as_byte())
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
