//! RGB LED commands.
//!
//! Wire encoding (switch characteristic, 1 byte):
//! ```text
//! 0 = off
//! 1 = red on
//! 2 = green on
//! 3 = blue on
//! any other value = off
//! ```
//! Only one colour is lit at a time. Blue is reachable only through the
//! switch characteristic; the emission scheduler uses red and green.

/// Discrete LED state request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedCommand {
    #[default]
    Off,
    Red,
    Green,
    Blue,
}

impl LedCommand {
    /// Byte written to / read from the switch characteristic.
    pub const fn code(self) -> u8 {
        match self {
            LedCommand::Off => 0,
            LedCommand::Red => 1,
            LedCommand::Green => 2,
            LedCommand::Blue => 3,
        }
    }
}

impl From<u8> for LedCommand {
    fn from(code: u8) -> Self {
        match code {
            1 => LedCommand::Red,
            2 => LedCommand::Green,
            3 => LedCommand::Blue,
            _ => LedCommand::Off,
        }
    }
}

/// Hardware that can display an [`LedCommand`]. Infallible by contract.
pub trait LedActuator {
    fn apply(&mut self, command: LedCommand);
}

impl<T: LedActuator + ?Sized> LedActuator for &mut T {
    fn apply(&mut self, command: LedCommand) {
        (**self).apply(command)
    }
}
