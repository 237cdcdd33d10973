//! Byte-stream framing for caliper packets.
//!
//! The link carries no start byte or length, so framing is purely positional:
//! every third byte closes a packet. Anything that breaks byte alignment
//! (a clock resync, an overwritten receive buffer) must be followed by a
//! [`PacketAssembler::reset`] so the next byte is treated as byte 0 again.

use heapless::Vec;

use crate::packet::{Packet, PACKET_LEN};

/// Collects received bytes into complete packets
#[derive(Debug, Clone, Default)]
pub struct PacketAssembler {
    buffer: Vec<u8, PACKET_LEN>,
}

impl PacketAssembler {
    /// Create an empty assembler
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Drop any partially collected packet
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes held towards the next packet
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte in wire order
    ///
    /// Returns `Some(packet)` when the byte completes a packet, `None` when
    /// more bytes are needed.
    pub fn feed(&mut self, byte: u8) -> Option<Packet> {
        // Cannot fail: the buffer is drained as soon as it fills
        let _ = self.buffer.push(byte);

        if self.buffer.len() < PACKET_LEN {
            return None;
        }

        let packet = Packet::from_bytes([self.buffer[0], self.buffer[1], self.buffer[2]]);
        self.buffer.clear();
        Some(packet)
    }

    /// Feed multiple bytes
    ///
    /// Returns the first complete packet found, if any.
    /// Remaining bytes after a complete packet are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Option<Packet> {
        bytes.iter().find_map(|&byte| self.feed(byte))
    }
}
