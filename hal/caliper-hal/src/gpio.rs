//! GPIO pin abstractions
//!
//! Pins are addressed by number so that a single capability object can be
//! shared between mainline code and interrupt handlers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Platform pin number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinId(pub u8);

impl From<u8> for PinId {
    fn from(pin: u8) -> Self {
        Self(pin)
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinDirection {
    /// High impedance input (line released)
    Input,
    /// Push-pull output
    Output,
}

/// Digital pin access by number
///
/// Implementations should handle the actual hardware register access for
/// the specific chip. All methods must be callable from interrupt context
/// and must not block.
pub trait Gpio {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self, pin: PinId) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self, pin: PinId) -> bool {
        !self.is_high(pin)
    }

    /// Drive the pin to a specific level
    fn set_state(&mut self, pin: PinId, high: bool);

    /// Drive the pin high
    fn set_high(&mut self, pin: PinId) {
        self.set_state(pin, true);
    }

    /// Drive the pin low
    fn set_low(&mut self, pin: PinId) {
        self.set_state(pin, false);
    }

    /// Switch the pin between input and output
    fn set_direction(&mut self, pin: PinId, direction: PinDirection);
}
