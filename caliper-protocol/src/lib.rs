//! Caliper Serial Packet Format
//!
//! The caliper clocks out one measurement as a fixed 3-byte packet with no
//! framing beyond the select-line transaction and no checksum. Byte 0 is
//! sent first and holds the least significant bits:
//! ```text
//!  bit 23   22..21     20     19 ............ 0
//! ┌──────┬──────────┬──────┬───────────────────┐
//! │ UNIT │ RESERVED │ SIGN │ MEASUREMENT (20b) │
//! └──────┴──────────┴──────┴───────────────────┘
//!   byte 2 = msb, byte 1 = mb, byte 0 = lsb
//! ```
//!
//! Measurements are hundredths of a millimeter or half-thousandths of an
//! inch, selected by the unit bit.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod assembler;
pub mod packet;

pub use assembler::PacketAssembler;
pub use packet::{Measurement, Packet, PacketError, Sign, Unit, PACKET_LEN};
