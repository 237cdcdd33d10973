//! Edge-interrupt driven SPI slave state machine
//!
//! # Half-bit ticks
//!
//! Every clock edge is one half-bit tick; a byte takes 16. Depending on the
//! clock mode an edge either samples data-in or shifts the next bit onto
//! data-out:
//!
//! ```text
//!            mode 0/3                    mode 1/2
//! rising     sample                      shift
//! falling    shift                       sample
//! ```
//!
//! For modes 0 and 2 the first edge of a bit samples, so data-out has to
//! be driven one half-bit ahead (the first bit is pre-loaded by the select
//! edge). On the last tick of a byte that look-ahead runs past bit 7 and
//! the line is driven low; the master never samples it.
//!
//! # Resync
//!
//! With `max_clock_gap_ms` set, an edge arriving later than that inside a
//! byte throws the partial byte away and restarts framing at the current
//! edge. The resync counter saturates at `u8::MAX`; the receive ring's mark
//! moves on every resync so consumers can tell bytes from before and after
//! it apart (see [`SoftSpiSlave::read_with_position`]).
//!
//! # Usage
//!
//! ```ignore
//! static SLAVE: SoftSpiSlave = SoftSpiSlave::new(
//!     SlavePins::receive_only(PinId(2), PinId(3)),
//!     SlaveConfig { max_clock_gap_ms: 5, ..SlaveConfig::new() },
//! );
//!
//! SLAVE.begin(&mut io)?;
//!
//! // Platform ISR:
//! SLAVE.on_edge(EdgeSource::Clock, &mut io);
//!
//! // Mainline:
//! while let Some(byte) = SLAVE.read() { /* ... */ }
//! ```

use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use caliper_hal::{
    EdgeHandler, EdgeInterrupts, EdgeSource, Gpio, MonotonicClock, PinDirection, PinId,
};

use super::config::{
    ActivationError, SlaveConfig, SlavePins, DEFAULT_RX_CAPACITY, DEFAULT_TX_CAPACITY,
};
use super::ring::{RingBuffer, StreamByte};

/// Half-bit ticks per byte
const TICKS_PER_BYTE: u8 = 16;

/// Set bit `n` of `byte` to `high`
fn with_bit(byte: u8, n: u8, high: bool) -> u8 {
    (byte & !(1 << n)) | ((high as u8) << n)
}

fn bit(byte: u8, n: u8) -> bool {
    (byte >> n) & 1 == 1
}

/// Software SPI slave
///
/// All methods take `&self`: handler state lives in atomics and the rings
/// lock only for their index updates, so one instance can be shared between
/// interrupt handlers and mainline code (typically as a `static`).
///
/// Completed bytes are only queued when a data-in pin is configured.
pub struct SoftSpiSlave<
    const RX: usize = DEFAULT_RX_CAPACITY,
    const TX: usize = DEFAULT_TX_CAPACITY,
> {
    pins: SlavePins,
    config: SlaveConfig,
    /// Handlers attached and allowed to run
    active: AtomicBool,
    /// Half-bit position within the current byte (0..16)
    half_tick: AtomicU8,
    /// Byte being received
    rx_shift: AtomicU8,
    /// Byte being transmitted
    tx_shift: AtomicU8,
    /// Timestamp of the previous clock edge
    last_edge_ms: AtomicU32,
    /// Clock timeouts seen (saturating)
    resync_count: AtomicU8,
    /// A received byte was overwritten since the last check
    rx_lost: AtomicBool,
    rx: RingBuffer<RX>,
    tx: RingBuffer<TX>,
}

impl<const RX: usize, const TX: usize> SoftSpiSlave<RX, TX> {
    /// Create an inactive slave
    pub const fn new(pins: SlavePins, config: SlaveConfig) -> Self {
        Self {
            pins,
            config,
            active: AtomicBool::new(false),
            half_tick: AtomicU8::new(0),
            rx_shift: AtomicU8::new(0),
            tx_shift: AtomicU8::new(0),
            last_edge_ms: AtomicU32::new(0),
            resync_count: AtomicU8::new(0),
            rx_lost: AtomicBool::new(false),
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
        }
    }

    pub fn pins(&self) -> &SlavePins {
        &self.pins
    }

    pub fn config(&self) -> &SlaveConfig {
        &self.config
    }

    /// Whether `begin` succeeded and `end` has not been called since
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Check the pin assignment against the platform
    ///
    /// Returns the select pin that needs an interrupt, if any.
    fn validate<IO: EdgeInterrupts>(&self, io: &IO) -> Result<Option<PinId>, ActivationError> {
        if !io.is_interrupt_capable(self.pins.clock) {
            return Err(ActivationError::ClockNotInterruptCapable);
        }

        if self.pins.data_out.is_none() && self.pins.data_in.is_none() {
            return Err(ActivationError::NoDataPin);
        }

        match (self.pins.data_out, self.pins.select) {
            (None, _) => Ok(None),
            (Some(_), Some(select)) if io.is_interrupt_capable(select) => Ok(Some(select)),
            (Some(_), _) => Err(ActivationError::SelectNotInterruptCapable),
        }
    }

    /// Configure the pins and attach the edge handlers
    ///
    /// On error nothing is left attached and the slave stays inactive.
    /// Calling this on an active slave restarts the session.
    pub fn begin<IO: Gpio + EdgeInterrupts>(&self, io: &mut IO) -> Result<(), ActivationError> {
        if self.is_active() {
            self.end(io);
        }

        let select_irq = match self.validate(io) {
            Ok(select_irq) => select_irq,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("softspi: activation refused: {}", e);
                return Err(e);
            }
        };

        io.set_direction(self.pins.clock, PinDirection::Input);
        if let Some(data_in) = self.pins.data_in {
            io.set_direction(data_in, PinDirection::Input);
        }
        if let Some(select) = self.pins.select {
            io.set_direction(select, PinDirection::Input);
        }

        self.half_tick.store(0, Ordering::Relaxed);
        self.rx_shift.store(0, Ordering::Relaxed);
        self.tx_shift.store(0, Ordering::Relaxed);
        self.rx.set_mark();
        self.active.store(true, Ordering::Release);

        if let Some(select) = select_irq {
            if !io.attach(select, EdgeSource::Select) {
                self.active.store(false, Ordering::Release);
                return Err(ActivationError::AttachRefused);
            }
        }

        if !io.attach(self.pins.clock, EdgeSource::Clock) {
            if let Some(select) = select_irq {
                io.detach(select);
            }
            self.active.store(false, Ordering::Release);
            return Err(ActivationError::AttachRefused);
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "softspi: active, {} {}, clock gap limit {} ms",
            self.config.mode,
            self.config.bit_order,
            self.config.max_clock_gap_ms
        );

        Ok(())
    }

    /// Detach the edge handlers and release data-out
    ///
    /// An edge handler already running when this is called finishes its
    /// tick.
    pub fn end<IO: Gpio + EdgeInterrupts>(&self, io: &mut IO) {
        let was_active = self.active.swap(false, Ordering::AcqRel);

        if was_active {
            io.detach(self.pins.clock);
            if let (Some(_), Some(select)) = (self.pins.data_out, self.pins.select) {
                io.detach(select);
            }
        }

        // Only data-out is ever an output
        if let Some(data_out) = self.pins.data_out {
            io.set_direction(data_out, PinDirection::Input);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("softspi: stopped");
    }

    fn is_selected<IO: Gpio>(&self, io: &IO, select: PinId) -> bool {
        io.is_high(select) == self.config.select_active_high
    }

    /// Clock edge handler (both edges)
    pub fn on_clock_edge<IO: Gpio + MonotonicClock>(&self, io: &mut IO) {
        if !self.is_active() {
            return;
        }

        if let Some(select) = self.pins.select {
            if !self.is_selected(io, select) {
                self.half_tick.store(0, Ordering::Relaxed);
                return;
            }
        }

        let sample_edge = io.is_high(self.pins.clock) == self.config.mode.samples_on_rising();
        let now = io.now_ms();
        let mut half_tick = self.half_tick.load(Ordering::Relaxed);

        if half_tick == 0 {
            // Idle pattern when nothing is queued
            self.tx_shift.store(self.tx.pop().unwrap_or(0), Ordering::Relaxed);
        }

        let max_gap = self.config.max_clock_gap_ms;
        let last = self.last_edge_ms.load(Ordering::Relaxed);
        if half_tick > 0 && max_gap > 0 && now.wrapping_sub(last) > max_gap {
            half_tick = 0;
            let count = self.resync_count.load(Ordering::Relaxed);
            self.resync_count.store(count.saturating_add(1), Ordering::Relaxed);
            self.rx.set_mark();
        }
        self.last_edge_ms.store(now, Ordering::Relaxed);

        let order = self.config.bit_order;
        if sample_edge {
            if let Some(data_in) = self.pins.data_in {
                if let Some(n) = order.bit_position(half_tick / 2) {
                    let rx = self.rx_shift.load(Ordering::Relaxed);
                    self.rx_shift
                        .store(with_bit(rx, n, io.is_high(data_in)), Ordering::Relaxed);
                }
            }
        } else if let Some(data_out) = self.pins.data_out {
            // Sample-first modes put the next bit out ahead of its sample edge
            let tick = if self.config.mode.captures_on_first() {
                half_tick + 1
            } else {
                half_tick
            };
            let tx = self.tx_shift.load(Ordering::Relaxed);
            let level = order
                .bit_position(tick / 2)
                .map(|n| bit(tx, n))
                .unwrap_or(false);
            io.set_state(data_out, level);
        }

        half_tick += 1;
        if half_tick >= TICKS_PER_BYTE {
            if self.pins.data_in.is_some() && self.rx.push(self.rx_shift.load(Ordering::Relaxed))
            {
                self.rx_lost.store(true, Ordering::Release);
            }
            half_tick = 0;
        }
        self.half_tick.store(half_tick, Ordering::Relaxed);
    }

    /// Select edge handler (both edges, only attached with data-out)
    pub fn on_select_edge<IO: Gpio>(&self, io: &mut IO) {
        if !self.is_active() {
            return;
        }

        let (Some(data_out), Some(select)) = (self.pins.data_out, self.pins.select) else {
            return;
        };

        if self.is_selected(io, select) {
            self.half_tick.store(0, Ordering::Relaxed);

            // First bit must be stable before the first clock edge
            let first = self.config.bit_order.first_bit();
            let level = self.tx.peek().map(|b| bit(b, first)).unwrap_or(false);
            io.set_state(data_out, level);
            io.set_direction(data_out, PinDirection::Output);
        } else {
            // Release the line for other devices
            io.set_direction(data_out, PinDirection::Input);
        }
    }

    /// Number of received bytes waiting to be read
    pub fn rx_bytes_available(&self) -> usize {
        self.rx.len()
    }

    /// Bytes that can still be received before the oldest is overwritten
    pub fn rx_bytes_remaining(&self) -> usize {
        self.rx.remaining()
    }

    pub fn rx_has_data(&self) -> bool {
        !self.rx.is_empty()
    }

    /// Whether a received byte was overwritten since the last call
    ///
    /// Clears the flag.
    pub fn rx_has_lost_data(&self) -> bool {
        self.rx_lost.swap(false, Ordering::AcqRel)
    }

    /// Remove and return the oldest received byte
    ///
    /// Returns `None` when nothing has been received; no state changes.
    pub fn read(&self) -> Option<u8> {
        self.rx.pop()
    }

    /// Remove the oldest received byte along with its stream position
    ///
    /// `since_mark` counts bytes since the session started or the last
    /// resync, whichever came later, and is `None` for bytes received
    /// before it. Positions stay contiguous across an overwrite, so a gap
    /// between two reads shows where bytes were lost.
    pub fn read_with_position(&self) -> Option<StreamByte> {
        self.rx.pop_with_position()
    }

    /// Times the receive framing was restarted by `begin` or a resync
    ///
    /// Wraps instead of saturating, so changes stay visible after
    /// [`resync_count`](Self::resync_count) tops out.
    pub fn framing_restarts(&self) -> u32 {
        self.rx.mark_count()
    }

    /// Return the oldest received byte without removing it
    pub fn peek(&self) -> Option<u8> {
        self.rx.peek()
    }

    /// Bytes that can be queued for transmission before the buffer is full
    pub fn tx_bytes_available(&self) -> usize {
        self.tx.remaining()
    }

    pub fn tx_is_full(&self) -> bool {
        self.tx.is_full()
    }

    /// Queue a byte for transmission
    ///
    /// Check [`tx_is_full`](Self::tx_is_full) first: writing to a full buffer
    /// overwrites the oldest queued byte. Returns `true` if that happened.
    pub fn write(&self, byte: u8) -> bool {
        self.tx.push(byte)
    }

    /// Number of clock timeouts that forced a resync (saturates at 255)
    pub fn resync_count(&self) -> u8 {
        self.resync_count.load(Ordering::Relaxed)
    }
}

impl<IO, const RX: usize, const TX: usize> EdgeHandler<IO> for SoftSpiSlave<RX, TX>
where
    IO: Gpio + MonotonicClock,
{
    fn on_edge(&self, source: EdgeSource, io: &mut IO) {
        match source {
            EdgeSource::Clock => self.on_clock_edge(io),
            EdgeSource::Select => self.on_select_edge(io),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::softspi::sim::{SimBus, CLK, MISO, MOSI, SS};
    use caliper_hal::{BitOrder, Mode};

    const MODES: [Mode; 4] = [Mode::Mode0, Mode::Mode1, Mode::Mode2, Mode::Mode3];
    const ORDERS: [BitOrder; 2] = [BitOrder::MsbFirst, BitOrder::LsbFirst];

    fn receiver(config: SlaveConfig) -> SoftSpiSlave {
        SoftSpiSlave::new(SlavePins::receive_only(CLK, MOSI), config)
    }

    fn full_duplex(config: SlaveConfig) -> SoftSpiSlave {
        SoftSpiSlave::new(
            SlavePins {
                clock: CLK,
                data_out: Some(MISO),
                data_in: Some(MOSI),
                select: Some(SS),
            },
            config,
        )
    }

    fn started<const RX: usize, const TX: usize>(
        slave: &SoftSpiSlave<RX, TX>,
        mode: Mode,
    ) -> SimBus {
        let mut bus = SimBus::new();
        bus.idle_clock(mode);
        // Deselected (active low)
        bus.set_level(SS, true);
        slave.begin(&mut bus).unwrap();
        bus
    }

    #[test]
    fn test_receive_one_byte() {
        let slave = receiver(SlaveConfig::default());
        let mut bus = started(&slave, Mode::Mode0);

        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0xA5);

        assert_eq!(slave.rx_bytes_available(), 1);
        assert_eq!(slave.rx_bytes_remaining(), DEFAULT_RX_CAPACITY - 1);
        assert_eq!(slave.read(), Some(0xA5));
        assert!(!slave.rx_has_data());
    }

    #[test]
    fn test_receive_all_modes_and_orders() {
        for mode in MODES {
            for order in ORDERS {
                let slave = receiver(SlaveConfig {
                    mode,
                    bit_order: order,
                    ..SlaveConfig::default()
                });
                let mut bus = started(&slave, mode);

                bus.transfer(&slave, mode, order, 0x1E);
                bus.transfer(&slave, mode, order, 0x81);

                assert_eq!(slave.read(), Some(0x1E), "{:?} {:?}", mode, order);
                assert_eq!(slave.read(), Some(0x81), "{:?} {:?}", mode, order);
                assert_eq!(slave.read(), None);
            }
        }
    }

    #[test]
    fn test_partial_byte_not_enqueued() {
        let slave = receiver(SlaveConfig::default());
        let mut bus = started(&slave, Mode::Mode0);

        // 15 of 16 half-bit ticks
        bus.clock_bits(&slave, Mode::Mode0, BitOrder::MsbFirst, 0xFF, 7);
        bus.drive(&slave, CLK, true);

        assert!(!slave.rx_has_data());
        bus.drive(&slave, CLK, false);
        assert_eq!(slave.read(), Some(0xFF));
    }

    #[test]
    fn test_clock_timeout_resyncs() {
        let slave = receiver(SlaveConfig {
            max_clock_gap_ms: 5,
            ..SlaveConfig::default()
        });
        let mut bus = started(&slave, Mode::Mode0);

        bus.clock_bits(&slave, Mode::Mode0, BitOrder::MsbFirst, 0xFF, 4);
        bus.advance_ms(10);
        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x3C);

        assert_eq!(slave.resync_count(), 1);
        assert_eq!(slave.read(), Some(0x3C));
        assert_eq!(slave.read(), None);
    }

    #[test]
    fn test_gap_within_limit_keeps_framing() {
        let slave = receiver(SlaveConfig {
            max_clock_gap_ms: 5,
            ..SlaveConfig::default()
        });
        let mut bus = started(&slave, Mode::Mode0);

        bus.clock_bits(&slave, Mode::Mode0, BitOrder::MsbFirst, 0xC0, 4);
        bus.advance_ms(5);
        bus.clock_bits(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x00, 4);

        assert_eq!(slave.resync_count(), 0);
        assert_eq!(slave.read(), Some(0xC0));
    }

    #[test]
    fn test_gap_between_bytes_is_not_a_resync() {
        let slave = receiver(SlaveConfig {
            max_clock_gap_ms: 5,
            ..SlaveConfig::default()
        });
        let mut bus = started(&slave, Mode::Mode0);

        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x11);
        bus.advance_ms(100);
        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x22);

        assert_eq!(slave.resync_count(), 0);
        assert_eq!(slave.rx_bytes_available(), 2);
    }

    #[test]
    fn test_resync_count_saturates() {
        let slave = receiver(SlaveConfig {
            max_clock_gap_ms: 1,
            ..SlaveConfig::default()
        });
        let mut bus = started(&slave, Mode::Mode0);

        for _ in 0..300 {
            bus.clock_bits(&slave, Mode::Mode0, BitOrder::MsbFirst, 0, 1);
            bus.advance_ms(2);
        }

        assert_eq!(slave.resync_count(), u8::MAX);
        // One for begin, one per resync; keeps counting past saturation
        assert_eq!(slave.framing_restarts(), 300);
    }

    #[test]
    fn test_resync_marks_stream() {
        let slave = receiver(SlaveConfig {
            max_clock_gap_ms: 5,
            ..SlaveConfig::default()
        });
        let mut bus = started(&slave, Mode::Mode0);

        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x11);
        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x22);
        bus.clock_bits(&slave, Mode::Mode0, BitOrder::MsbFirst, 0xFF, 4);
        bus.advance_ms(10);
        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x33);

        let before = slave.read_with_position().unwrap();
        assert_eq!((before.byte, before.position, before.since_mark), (0x11, 0, None));
        assert_eq!(slave.read_with_position().unwrap().since_mark, None);

        let after = slave.read_with_position().unwrap();
        assert_eq!(after.byte, 0x33);
        assert_eq!(after.position, 2);
        assert_eq!(after.since_mark, Some(0));
    }

    #[test]
    fn test_overflow_sets_lost_flag_once() {
        let slave: SoftSpiSlave<4, 4> =
            SoftSpiSlave::new(SlavePins::receive_only(CLK, MOSI), SlaveConfig::default());
        let mut bus = SimBus::new();
        slave.begin(&mut bus).unwrap();

        for byte in 1..=5 {
            bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, byte);
        }

        assert!(slave.rx_has_lost_data());
        assert!(!slave.rx_has_lost_data());

        for expected in 2..=5 {
            assert_eq!(slave.read(), Some(expected));
        }

        // Flag stays clear until the next overwrite
        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 6);
        assert!(!slave.rx_has_lost_data());
    }

    #[test]
    fn test_deselected_edges_ignored() {
        let slave = SoftSpiSlave::<8, 8>::new(
            SlavePins {
                clock: CLK,
                data_out: None,
                data_in: Some(MOSI),
                select: Some(SS),
            },
            SlaveConfig::default(),
        );
        let mut bus = started(&slave, Mode::Mode0);

        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x55);
        assert!(!slave.rx_has_data());

        // Select only gates the clock here, no select interrupt without MISO
        assert_eq!(bus.attached(SS), None);
        bus.set_level(SS, false);
        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x55);
        assert_eq!(slave.read(), Some(0x55));
    }

    #[test]
    fn test_deselect_mid_byte_restarts_framing() {
        let slave = full_duplex(SlaveConfig::default());
        let mut bus = started(&slave, Mode::Mode0);

        bus.drive(&slave, SS, false);
        bus.clock_bits(&slave, Mode::Mode0, BitOrder::MsbFirst, 0xFF, 3);
        bus.drive(&slave, SS, true);
        bus.drive(&slave, SS, false);
        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x42);

        assert_eq!(slave.read(), Some(0x42));
        assert_eq!(slave.read(), None);
    }

    #[test]
    fn test_transmit_all_modes_and_orders() {
        for mode in MODES {
            for order in ORDERS {
                let slave = full_duplex(SlaveConfig {
                    mode,
                    bit_order: order,
                    ..SlaveConfig::default()
                });
                let mut bus = started(&slave, mode);

                slave.write(0xC3);
                slave.write(0x5A);

                // One byte per selection
                bus.drive(&slave, SS, false);
                assert_eq!(bus.direction(MISO), PinDirection::Output);
                let first = bus.transfer(&slave, mode, order, 0x0F);
                bus.drive(&slave, SS, true);
                assert_eq!(bus.direction(MISO), PinDirection::Input);

                bus.drive(&slave, SS, false);
                let second = bus.transfer(&slave, mode, order, 0xF0);
                bus.drive(&slave, SS, true);

                assert_eq!(first, 0xC3, "{:?} {:?}", mode, order);
                assert_eq!(second, 0x5A, "{:?} {:?}", mode, order);
                assert_eq!(slave.read(), Some(0x0F));
                assert_eq!(slave.read(), Some(0xF0));
                assert_eq!(bus.direction(MISO), PinDirection::Input);
            }
        }
    }

    #[test]
    fn test_select_preloads_first_bit() {
        let slave = full_duplex(SlaveConfig::default());
        let mut bus = started(&slave, Mode::Mode0);

        slave.write(0x80);
        bus.drive(&slave, SS, false);
        assert!(bus.level(MISO));

        bus.drive(&slave, SS, true);
        let lsb_slave = full_duplex(SlaveConfig {
            bit_order: BitOrder::LsbFirst,
            ..SlaveConfig::default()
        });
        let mut bus = started(&lsb_slave, Mode::Mode0);
        lsb_slave.write(0x80);
        bus.drive(&lsb_slave, SS, false);
        assert!(!bus.level(MISO));
    }

    #[test]
    fn test_empty_tx_sends_zeros() {
        let slave = full_duplex(SlaveConfig::default());
        let mut bus = started(&slave, Mode::Mode0);

        bus.set_level(MISO, true);
        bus.drive(&slave, SS, false);
        assert!(!bus.level(MISO));

        let miso = bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x99);
        assert_eq!(miso, 0);
    }

    #[test]
    fn test_tx_queue_status() {
        let slave: SoftSpiSlave<4, 2> =
            SoftSpiSlave::new(SlavePins::receive_only(CLK, MOSI), SlaveConfig::default());

        assert_eq!(slave.tx_bytes_available(), 2);
        assert!(!slave.write(1));
        assert!(!slave.write(2));
        assert!(slave.tx_is_full());
        assert_eq!(slave.tx_bytes_available(), 0);

        // Overwrites the oldest queued byte
        assert!(slave.write(3));
    }

    #[test]
    fn test_clock_not_interrupt_capable_is_inert() {
        let slave = receiver(SlaveConfig::default());
        let mut bus = SimBus::new();
        bus.set_interrupt_capable(CLK, false);

        assert_eq!(
            slave.begin(&mut bus),
            Err(ActivationError::ClockNotInterruptCapable)
        );
        assert!(!slave.is_active());
        assert_eq!(bus.attached(CLK), None);

        for _ in 0..4 {
            bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0xFF);
        }
        // Even a stray direct call does nothing
        slave.on_edge(EdgeSource::Clock, &mut bus);

        assert!(!slave.rx_has_data());
    }

    #[test]
    fn test_activation_requires_data_pin() {
        let slave: SoftSpiSlave = SoftSpiSlave::new(
            SlavePins {
                clock: CLK,
                data_out: None,
                data_in: None,
                select: Some(SS),
            },
            SlaveConfig::default(),
        );
        let mut bus = SimBus::new();

        assert_eq!(slave.begin(&mut bus), Err(ActivationError::NoDataPin));
        assert_eq!(bus.attached(CLK), None);
    }

    #[test]
    fn test_data_out_requires_select_interrupt() {
        let without_select: SoftSpiSlave = SoftSpiSlave::new(
            SlavePins {
                clock: CLK,
                data_out: Some(MISO),
                data_in: None,
                select: None,
            },
            SlaveConfig::default(),
        );
        let mut bus = SimBus::new();
        assert_eq!(
            without_select.begin(&mut bus),
            Err(ActivationError::SelectNotInterruptCapable)
        );

        let slave = full_duplex(SlaveConfig::default());
        bus.set_interrupt_capable(SS, false);
        assert_eq!(
            slave.begin(&mut bus),
            Err(ActivationError::SelectNotInterruptCapable)
        );
        assert_eq!(bus.attached(CLK), None);
        assert_eq!(bus.attached(SS), None);
    }

    #[test]
    fn test_refused_select_attach_rolls_back() {
        let slave = full_duplex(SlaveConfig::default());
        let mut bus = SimBus::new();
        bus.refuse_attach(SS);

        assert_eq!(slave.begin(&mut bus), Err(ActivationError::AttachRefused));
        assert!(!slave.is_active());
        assert_eq!(bus.attached(CLK), None);
        assert_eq!(bus.attached(SS), None);
    }

    #[test]
    fn test_refused_clock_attach_detaches_select() {
        let slave = full_duplex(SlaveConfig::default());
        let mut bus = SimBus::new();
        bus.set_level(SS, true);
        bus.refuse_attach(CLK);

        assert_eq!(slave.begin(&mut bus), Err(ActivationError::AttachRefused));
        assert!(!slave.is_active());
        assert_eq!(bus.attached(CLK), None);
        assert_eq!(bus.attached(SS), None);

        // Stray edges after the failure are ignored
        bus.drive(&slave, SS, false);
        slave.on_edge(EdgeSource::Select, &mut bus);
        assert_eq!(bus.direction(MISO), PinDirection::Input);
    }

    #[test]
    fn test_begin_attaches_handlers() {
        let slave = full_duplex(SlaveConfig::default());
        let bus = started(&slave, Mode::Mode0);

        assert!(slave.is_active());
        assert_eq!(bus.attached(CLK), Some(EdgeSource::Clock));
        assert_eq!(bus.attached(SS), Some(EdgeSource::Select));
        assert_eq!(bus.direction(CLK), PinDirection::Input);
        assert_eq!(bus.direction(MOSI), PinDirection::Input);
    }

    #[test]
    fn test_end_detaches_and_releases() {
        let slave = full_duplex(SlaveConfig::default());
        let mut bus = started(&slave, Mode::Mode0);

        bus.drive(&slave, SS, false);
        assert_eq!(bus.direction(MISO), PinDirection::Output);

        slave.end(&mut bus);
        assert!(!slave.is_active());
        assert_eq!(bus.attached(CLK), None);
        assert_eq!(bus.attached(SS), None);
        assert_eq!(bus.direction(MISO), PinDirection::Input);

        bus.transfer(&slave, Mode::Mode0, BitOrder::MsbFirst, 0x77);
        assert!(!slave.rx_has_data());
    }

    #[test]
    fn test_read_empty() {
        let slave = receiver(SlaveConfig::default());
        assert_eq!(slave.read(), None);
        assert_eq!(slave.peek(), None);
        assert_eq!(slave.rx_bytes_available(), 0);
    }
}
