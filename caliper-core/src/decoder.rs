//! Double-buffered packet decoder
//!
//! Holds the latest caliper packet in two slots. Writers only ever touch the
//! write slot; readers only ever touch the read slot. [`PacketDecoder::refresh`]
//! flips the roles with one atomic operation, so a reader always sees a
//! packet whose three bytes were published together.
//!
//! # Usage
//!
//! ```ignore
//! static DECODER: PacketDecoder = PacketDecoder::new();
//!
//! // Byte assembler (mainline):
//! DECODER.update_data_bytes(msb, mb, lsb);
//!
//! // Consumer:
//! if DECODER.is_new_data() {
//!     DECODER.refresh();
//! }
//! let reading = DECODER.reading();
//! ```
//!
//! Byte writers are meant for a single writer context. Readers may run
//! anywhere, including interrupt handlers. Each slot is one `AtomicU32`, so a
//! single getter call never observes a half-written packet; use
//! [`PacketDecoder::packet`] or [`PacketDecoder::reading`] when several
//! fields must come from the same packet across a concurrent refresh.

use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use caliper_protocol::packet::{LSB_INDEX, MB_INDEX, MSB_INDEX};
use caliper_protocol::{Measurement, Packet, PacketError, Sign, Unit, PACKET_LEN};

/// Double-buffered holder of the latest caliper packet
#[derive(Debug)]
pub struct PacketDecoder {
    /// Packet slots (A, B)
    slots: [AtomicU32; 2],
    /// Index of the slot readers see; the other one is the write slot
    read_slot: AtomicU8,
    /// Write slot holds a complete packet that has not been published
    new_data: AtomicBool,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDecoder {
    /// Create a decoder with both slots zeroed
    ///
    /// Slot A starts as the write slot and slot B as the read slot.
    pub const fn new() -> Self {
        Self {
            slots: [AtomicU32::new(0), AtomicU32::new(0)],
            read_slot: AtomicU8::new(1),
            new_data: AtomicBool::new(false),
        }
    }

    fn read_target(&self) -> &AtomicU32 {
        &self.slots[(self.read_slot.load(Ordering::Acquire) & 1) as usize]
    }

    fn write_target(&self) -> &AtomicU32 {
        &self.slots[((self.read_slot.load(Ordering::Acquire) ^ 1) & 1) as usize]
    }

    fn pending_packet(&self) -> Packet {
        Packet::from_raw(self.write_target().load(Ordering::Relaxed))
    }

    fn store_pending(&self, packet: Packet) {
        self.write_target().store(packet.raw(), Ordering::Release);
    }

    /// Update the most significant byte of the write slot
    pub fn update_msb(&self, msb: u8) {
        let [lsb, mb, _] = self.pending_packet().to_bytes();
        self.store_pending(Packet::from_parts(msb, mb, lsb));
    }

    /// Update the middle byte of the write slot
    pub fn update_mb(&self, mb: u8) {
        let [lsb, _, msb] = self.pending_packet().to_bytes();
        self.store_pending(Packet::from_parts(msb, mb, lsb));
    }

    /// Update the least significant byte of the write slot
    pub fn update_lsb(&self, lsb: u8) {
        let [_, mb, msb] = self.pending_packet().to_bytes();
        self.store_pending(Packet::from_parts(msb, mb, lsb));
    }

    /// Update the byte at `index` of the write slot
    ///
    /// Index 0 is the least significant byte, 2 the most significant.
    pub fn update_byte(&self, byte: u8, index: usize) -> Result<(), PacketError> {
        let packet = self.pending_packet().with_byte(index, byte)?;
        self.store_pending(packet);
        Ok(())
    }

    /// Write a complete packet and flag it as new data
    ///
    /// Prefer this over the single-byte writers: the three bytes land in the
    /// write slot together, so a later refresh cannot publish bytes from two
    /// different wire packets.
    pub fn update_data_bytes(&self, msb: u8, mb: u8, lsb: u8) {
        self.store_pending(Packet::from_parts(msb, mb, lsb));
        self.set_new_data();
    }

    /// Write a complete packet and flag it as new data
    pub fn update_packet(&self, packet: Packet) {
        let bytes = packet.to_bytes();
        self.update_data_bytes(bytes[MSB_INDEX], bytes[MB_INDEX], bytes[LSB_INDEX]);
    }

    /// Publish the write slot to readers and clear the new data flag
    ///
    /// Call just before reading. Values are stable between refreshes.
    pub fn refresh(&self) {
        self.read_slot.fetch_xor(1, Ordering::AcqRel);
        self.clear_new_data();
    }

    /// The published packet
    pub fn packet(&self) -> Packet {
        Packet::from_raw(self.read_target().load(Ordering::Acquire))
    }

    /// Absolute, unconverted 20-bit measurement
    pub fn raw_measurement(&self) -> u32 {
        self.packet().measurement()
    }

    /// Signed measurement converted to the unit selected on the caliper
    pub fn measurement(&self) -> f32 {
        self.packet().value()
    }

    /// Converted measurement together with its unit
    pub fn reading(&self) -> Measurement {
        self.packet().reading()
    }

    pub fn unit(&self) -> Unit {
        self.packet().unit()
    }

    pub fn sign(&self) -> Sign {
        self.packet().sign()
    }

    /// "mm" or "in"
    pub fn unit_str(&self) -> &'static str {
        self.unit().as_str()
    }

    /// "+" or "-"
    pub fn sign_str(&self) -> &'static str {
        self.sign().as_str()
    }

    /// Flag the write slot as holding data that has not been read
    pub fn set_new_data(&self) {
        self.new_data.store(true, Ordering::Release);
    }

    pub fn clear_new_data(&self) {
        self.new_data.store(false, Ordering::Release);
    }

    /// Whether a refresh would publish new data
    pub fn is_new_data(&self) -> bool {
        self.new_data.load(Ordering::Acquire)
    }

    /// Length of a full packet in bytes (always 3)
    pub const fn packet_length(&self) -> usize {
        PACKET_LEN
    }
}
