//! Software SPI slave configuration

use caliper_hal::{BitOrder, Mode, PinId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default receive ring capacity in bytes
pub const DEFAULT_RX_CAPACITY: usize = 64;

/// Default transmit ring capacity in bytes
pub const DEFAULT_TX_CAPACITY: usize = 64;

/// Pin assignment
///
/// The clock pin must be interrupt capable. At least one of `data_out` or
/// `data_in` must be set, and `data_out` additionally needs an interrupt
/// capable `select` pin so the line can be released between transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlavePins {
    /// Serial clock
    pub clock: PinId,
    /// Slave data out (MISO)
    pub data_out: Option<PinId>,
    /// Slave data in (MOSI)
    pub data_in: Option<PinId>,
    /// Slave select
    pub select: Option<PinId>,
}

impl SlavePins {
    /// Receive-only slave without a select line
    pub const fn receive_only(clock: PinId, data_in: PinId) -> Self {
        Self {
            clock,
            data_out: None,
            data_in: Some(data_in),
            select: None,
        }
    }
}

/// Per-session configuration, fixed once the slave is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlaveConfig {
    /// Select line level that marks the slave as selected
    pub select_active_high: bool,
    /// Clock polarity and phase
    pub mode: Mode,
    /// Bit order within a byte
    pub bit_order: BitOrder,
    /// Maximum time between clock edges inside a byte in ms (0 = disabled)
    pub max_clock_gap_ms: u32,
}

impl SlaveConfig {
    /// Active-low select, mode 0, MSB first, no clock timeout
    pub const fn new() -> Self {
        Self {
            select_active_high: false,
            mode: Mode::Mode0,
            bit_order: BitOrder::MsbFirst,
            max_clock_gap_ms: 0,
        }
    }
}

impl Default for SlaveConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Reasons [`SoftSpiSlave::begin`](super::SoftSpiSlave::begin) refuses to
/// activate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActivationError {
    /// Clock pin cannot raise edge interrupts
    ClockNotInterruptCapable,
    /// Neither data-out nor data-in is configured
    NoDataPin,
    /// Data-out is configured without an interrupt capable select pin
    SelectNotInterruptCapable,
    /// The platform refused to attach an interrupt
    AttachRefused,
}
