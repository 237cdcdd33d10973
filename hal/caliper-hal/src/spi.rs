//! SPI framing types
//!
//! Clock mode and bit order shared by bit-banged implementations.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Clock polarity of this mode
    pub const fn polarity(self) -> Polarity {
        match self {
            Mode::Mode0 | Mode::Mode1 => Polarity::IdleLow,
            Mode::Mode2 | Mode::Mode3 => Polarity::IdleHigh,
        }
    }

    /// Clock phase of this mode
    pub const fn phase(self) -> Phase {
        match self {
            Mode::Mode0 | Mode::Mode2 => Phase::CaptureOnFirstTransition,
            Mode::Mode1 | Mode::Mode3 => Phase::CaptureOnSecondTransition,
        }
    }

    /// Whether data is latched on the low-to-high clock transition
    ///
    /// Modes 0 and 3 sample on the rising edge and shift on the falling
    /// edge; modes 1 and 2 do the opposite.
    pub const fn samples_on_rising(self) -> bool {
        matches!(self, Mode::Mode0 | Mode::Mode3)
    }

    /// Whether the first clock transition of a bit is a sample edge
    pub const fn captures_on_first(self) -> bool {
        matches!(self.phase(), Phase::CaptureOnFirstTransition)
    }
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        (mode.polarity(), mode.phase())
    }
}

impl From<(Polarity, Phase)> for Mode {
    fn from((polarity, phase): (Polarity, Phase)) -> Self {
        match (polarity, phase) {
            (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => Mode::Mode0,
            (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => Mode::Mode1,
            (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => Mode::Mode2,
            (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => Mode::Mode3,
        }
    }
}

#[cfg(feature = "embedded-hal")]
impl From<embedded_hal::spi::Mode> for Mode {
    fn from(mode: embedded_hal::spi::Mode) -> Self {
        let polarity = match mode.polarity {
            embedded_hal::spi::Polarity::IdleLow => Polarity::IdleLow,
            embedded_hal::spi::Polarity::IdleHigh => Polarity::IdleHigh,
        };
        let phase = match mode.phase {
            embedded_hal::spi::Phase::CaptureOnFirstTransition => Phase::CaptureOnFirstTransition,
            embedded_hal::spi::Phase::CaptureOnSecondTransition => Phase::CaptureOnSecondTransition,
        };
        Mode::from((polarity, phase))
    }
}

/// Order in which the bits of a byte travel on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BitOrder {
    /// Bit 7 first
    #[default]
    MsbFirst,
    /// Bit 0 first
    LsbFirst,
}

impl BitOrder {
    /// Bit position carried by the `n`th bit on the wire
    ///
    /// Returns `None` once `n` runs past the end of the byte.
    pub const fn bit_position(self, n: u8) -> Option<u8> {
        if n > 7 {
            return None;
        }
        match self {
            BitOrder::MsbFirst => Some(7 - n),
            BitOrder::LsbFirst => Some(n),
        }
    }

    /// Bit position of the first bit on the wire
    pub const fn first_bit(self) -> u8 {
        match self {
            BitOrder::MsbFirst => 7,
            BitOrder::LsbFirst => 0,
        }
    }
}
