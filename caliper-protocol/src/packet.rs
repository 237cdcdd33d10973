//! Packet layout and typed field access.
//!
//! Layout (bit 0 = least significant bit of byte 0):
//! - bits 0-19: measurement magnitude
//! - bit 20: sign (0 = positive, 1 = negative)
//! - bits 21-22: reserved, meaning unknown, preserved as received
//! - bit 23: unit (0 = millimeters, 1 = inches)

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bytes per packet
pub const PACKET_LEN: usize = 3;

/// Largest value the measurement field can hold
pub const MAX_MEASUREMENT: u32 = MEASUREMENT_MASK;

const MEASUREMENT_MASK: u32 = 0x000F_FFFF;
const SIGN_SHIFT: u32 = 20;
const RESERVED_SHIFT: u32 = 21;
const RESERVED_MASK: u32 = 0b11;
const UNIT_SHIFT: u32 = 23;
const PACKET_MASK: u32 = 0x00FF_FFFF;

/// Index of the least significant byte
pub const LSB_INDEX: usize = 0;
/// Index of the middle byte
pub const MB_INDEX: usize = 1;
/// Index of the most significant byte
pub const MSB_INDEX: usize = 2;

/// Errors raised when addressing packet bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Byte index is not 0, 1 or 2
    IndexOutOfRange,
}

/// Measurement unit selected on the caliper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Unit {
    /// Raw counts are hundredths of a millimeter
    #[default]
    Millimeters,
    /// Raw counts are half-thousandths of an inch
    Inches,
}

impl Unit {
    /// Decode the unit bit
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Unit::Inches
        } else {
            Unit::Millimeters
        }
    }

    /// Raw counts per whole unit
    pub const fn counts_per_unit(self) -> u32 {
        match self {
            Unit::Millimeters => 100,
            Unit::Inches => 2000,
        }
    }

    /// Display abbreviation
    pub const fn as_str(self) -> &'static str {
        match self {
            Unit::Millimeters => "mm",
            Unit::Inches => "in",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

impl Sign {
    /// Decode the sign bit
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    /// Display symbol
    pub const fn as_str(self) -> &'static str {
        match self {
            Sign::Positive => "+",
            Sign::Negative => "-",
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A measurement converted to physical units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    /// Signed value in `unit`
    pub value: f32,
    /// Unit of `value`
    pub unit: Unit,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Millimeters => write!(f, "{:.2} {}", self.value, self.unit),
            Unit::Inches => write!(f, "{:.4} {}", self.value, self.unit),
        }
    }
}

/// One 24-bit caliper packet
///
/// Stored right-aligned in a `u32`; the top byte is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Packet(u32);

impl Packet {
    /// Build a packet from its fields
    ///
    /// `measurement` is truncated to 20 bits. Reserved bits are zero.
    pub const fn new(measurement: u32, sign: Sign, unit: Unit) -> Self {
        let mut raw = measurement & MEASUREMENT_MASK;
        if matches!(sign, Sign::Negative) {
            raw |= 1 << SIGN_SHIFT;
        }
        if matches!(unit, Unit::Inches) {
            raw |= 1 << UNIT_SHIFT;
        }
        Self(raw)
    }

    /// Wrap raw packet bits, discarding anything above bit 23
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw & PACKET_MASK)
    }

    /// Raw packet bits
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Build a packet from bytes in wire order (lsb first)
    pub const fn from_bytes(bytes: [u8; PACKET_LEN]) -> Self {
        Self(bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16)
    }

    /// Build a packet from its most significant, middle and least
    /// significant bytes
    pub const fn from_parts(msb: u8, mb: u8, lsb: u8) -> Self {
        Self::from_bytes([lsb, mb, msb])
    }

    /// Bytes in wire order (lsb first)
    pub const fn to_bytes(self) -> [u8; PACKET_LEN] {
        [self.0 as u8, (self.0 >> 8) as u8, (self.0 >> 16) as u8]
    }

    /// Byte at `index` (0 = lsb, 2 = msb)
    pub fn byte(self, index: usize) -> Result<u8, PacketError> {
        self.to_bytes()
            .get(index)
            .copied()
            .ok_or(PacketError::IndexOutOfRange)
    }

    /// Copy of this packet with the byte at `index` replaced
    pub fn with_byte(self, index: usize, byte: u8) -> Result<Self, PacketError> {
        if index >= PACKET_LEN {
            return Err(PacketError::IndexOutOfRange);
        }
        let shift = index as u32 * 8;
        let cleared = self.0 & !(0xFF << shift);
        Ok(Self(cleared | (byte as u32) << shift))
    }

    /// Copy of this packet with the reserved bits set to `bits` (two bits)
    pub const fn with_reserved(self, bits: u8) -> Self {
        let cleared = self.0 & !(RESERVED_MASK << RESERVED_SHIFT);
        Self(cleared | ((bits as u32) & RESERVED_MASK) << RESERVED_SHIFT)
    }

    /// Unsigned 20-bit magnitude in raw counts
    pub const fn measurement(self) -> u32 {
        self.0 & MEASUREMENT_MASK
    }

    pub const fn sign(self) -> Sign {
        Sign::from_bit((self.0 >> SIGN_SHIFT) & 1 == 1)
    }

    pub const fn unit(self) -> Unit {
        Unit::from_bit((self.0 >> UNIT_SHIFT) & 1 == 1)
    }

    /// The two reserved bits, right-aligned
    pub const fn reserved(self) -> u8 {
        (self.0 >> RESERVED_SHIFT & RESERVED_MASK) as u8
    }

    /// Signed value in the packet's unit
    pub fn value(self) -> f32 {
        let magnitude = self.measurement() as f32 / self.unit().counts_per_unit() as f32;
        match self.sign() {
            Sign::Positive => magnitude,
            Sign::Negative => -magnitude,
        }
    }

    /// Value and unit together
    pub fn reading(self) -> Measurement {
        Measurement {
            value: self.value(),
            unit: self.unit(),
        }
    }
}

impl From<[u8; PACKET_LEN]> for Packet {
    fn from(bytes: [u8; PACKET_LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Packet> for [u8; PACKET_LEN] {
    fn from(packet: Packet) -> Self {
        packet.to_bytes()
    }
}
