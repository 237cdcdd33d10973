//! Caliper link: slave receive buffer to packet decoder
//!
//! The slave hands out a flat byte stream. The link frames it into packets
//! and writes each complete packet to the decoder in one go.
//!
//! Framing follows stream positions, not the order bytes happen to be read
//! in. A packet starts at every third byte after the slave's framing mark
//! (set by `begin` and by every clock resync). A byte is only added to a
//! partial packet when it directly follows the previous byte in the stream
//! and sits at the expected offset, so neither an overwritten byte nor a
//! resync can splice two wire packets together. Bytes from before the
//! latest mark are dropped.

use caliper_core::PacketDecoder;
use caliper_protocol::{PacketAssembler, PACKET_LEN};

use crate::softspi::{SoftSpiSlave, StreamByte, DEFAULT_RX_CAPACITY, DEFAULT_TX_CAPACITY};

/// What a single [`CaliperLink::poll`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollStatus {
    /// Packets written to the decoder
    pub packets: usize,
    /// The slave restarted framing since the previous poll
    pub resynced: bool,
    /// The slave overwrote received bytes since the previous poll
    pub data_lost: bool,
    /// Bytes dropped because they could not start or continue a packet
    pub discarded: usize,
}

pub struct CaliperLink<
    'a,
    const RX: usize = DEFAULT_RX_CAPACITY,
    const TX: usize = DEFAULT_TX_CAPACITY,
> {
    slave: &'a SoftSpiSlave<RX, TX>,
    decoder: &'a PacketDecoder,
    assembler: PacketAssembler,
    seen_restarts: u32,
    /// Stream position the next framed byte must have
    next_position: Option<u32>,
}

impl<'a, const RX: usize, const TX: usize> CaliperLink<'a, RX, TX> {
    pub fn new(slave: &'a SoftSpiSlave<RX, TX>, decoder: &'a PacketDecoder) -> Self {
        Self {
            slave,
            decoder,
            assembler: PacketAssembler::new(),
            seen_restarts: slave.framing_restarts(),
            next_position: None,
        }
    }

    /// Move received bytes into the decoder
    ///
    /// Drains at most one receive buffer's worth of bytes so a busy bus
    /// cannot keep the caller here.
    pub fn poll(&mut self) -> PollStatus {
        let mut status = PollStatus::default();

        let restarts = self.slave.framing_restarts();
        if restarts != self.seen_restarts {
            self.seen_restarts = restarts;
            status.resynced = true;
        }
        status.data_lost = self.slave.rx_has_lost_data();

        for _ in 0..RX {
            let Some(entry) = self.slave.read_with_position() else {
                break;
            };
            if self.frame(entry) {
                status.packets += 1;
            } else if self.assembler.pending() == 0 {
                status.discarded += 1;
            }
        }

        if status.resynced || status.data_lost {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "caliper: framing restarted (resync: {}, lost: {}, discarded {})",
                status.resynced,
                status.data_lost,
                status.discarded
            );
        }

        status
    }

    /// Feed one byte; returns `true` when it completed a packet
    fn frame(&mut self, entry: StreamByte) -> bool {
        let contiguous = self.next_position == Some(entry.position);
        self.next_position = Some(entry.position.wrapping_add(1));

        let Some(offset) = entry.since_mark else {
            self.assembler.reset();
            return false;
        };

        let slot = (offset % PACKET_LEN as u32) as usize;
        if slot == 0 {
            self.assembler.reset();
        } else if !contiguous || self.assembler.pending() != slot {
            // Middle of a packet whose start was lost or came before the mark
            self.assembler.reset();
            return false;
        }

        match self.assembler.feed(entry.byte) {
            Some(packet) => {
                self.decoder.update_packet(packet);
                true
            }
            None => false,
        }
    }

    /// Publish the decoder's latest packet if one arrived since the last
    /// refresh
    pub fn refresh_if_new(&self) -> bool {
        if !self.decoder.is_new_data() {
            return false;
        }
        self.decoder.refresh();
        true
    }

    /// Bytes of the current packet received so far
    pub fn pending(&self) -> usize {
        self.assembler.pending()
    }

    pub fn slave(&self) -> &'a SoftSpiSlave<RX, TX> {
        self.slave
    }

    pub fn decoder(&self) -> &'a PacketDecoder {
        self.decoder
    }
}
