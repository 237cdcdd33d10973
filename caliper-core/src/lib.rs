//! Board-agnostic core logic for the caliper link
//!
//! This crate contains the logic that does not depend on how bytes are
//! clocked in:
//!
//! - Double-buffered packet decoder with tear-free readers
//! - Re-exports of the packet types consumers read back

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod decoder;

pub use caliper_protocol::{Measurement, Packet, PacketError, Sign, Unit, PACKET_LEN};
pub use decoder::PacketDecoder;
