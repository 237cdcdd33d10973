//! Host-side bus simulator for driving the slave from tests
//!
//! Plays the platform (pin levels, directions, interrupt routing, clock) and
//! an SPI master that clocks bits through whatever handler is attached.

use caliper_hal::{
    BitOrder, EdgeHandler, EdgeInterrupts, EdgeSource, Gpio, Mode, MonotonicClock, PinDirection,
    PinId, Polarity,
};

pub const CLK: PinId = PinId(0);
pub const MOSI: PinId = PinId(1);
pub const MISO: PinId = PinId(2);
pub const SS: PinId = PinId(3);

const PIN_COUNT: usize = 8;

pub struct SimBus {
    levels: [bool; PIN_COUNT],
    directions: [PinDirection; PIN_COUNT],
    capable: [bool; PIN_COUNT],
    refused: [bool; PIN_COUNT],
    attached: [Option<EdgeSource>; PIN_COUNT],
    now_ms: u32,
}

impl SimBus {
    /// All pins interrupt capable, inputs, low
    pub fn new() -> Self {
        Self {
            levels: [false; PIN_COUNT],
            directions: [PinDirection::Input; PIN_COUNT],
            capable: [true; PIN_COUNT],
            refused: [false; PIN_COUNT],
            attached: [None; PIN_COUNT],
            now_ms: 0,
        }
    }

    pub fn set_interrupt_capable(&mut self, pin: PinId, capable: bool) {
        self.capable[pin.0 as usize] = capable;
    }

    /// Make `attach` fail for a pin that still reports itself capable
    pub fn refuse_attach(&mut self, pin: PinId) {
        self.refused[pin.0 as usize] = true;
    }

    /// Set a level without raising an edge
    pub fn set_level(&mut self, pin: PinId, high: bool) {
        self.levels[pin.0 as usize] = high;
    }

    pub fn level(&self, pin: PinId) -> bool {
        self.levels[pin.0 as usize]
    }

    pub fn direction(&self, pin: PinId) -> PinDirection {
        self.directions[pin.0 as usize]
    }

    pub fn attached(&self, pin: PinId) -> Option<EdgeSource> {
        self.attached[pin.0 as usize]
    }

    pub fn advance_ms(&mut self, ms: u32) {
        self.now_ms = self.now_ms.wrapping_add(ms);
    }

    /// Drive a pin and deliver the edge to `handler` if one is attached
    pub fn drive<H: EdgeHandler<Self>>(&mut self, handler: &H, pin: PinId, high: bool) {
        if self.level(pin) == high {
            return;
        }
        self.set_level(pin, high);
        if let Some(source) = self.attached(pin) {
            handler.on_edge(source, self);
        }
    }

    /// Park the clock at its idle level for `mode`
    pub fn idle_clock(&mut self, mode: Mode) {
        self.set_level(CLK, mode.polarity() == Polarity::IdleHigh);
    }

    /// Clock `bits` bits of `mosi` out as master, returning what was read
    /// back on MISO (in the same bit positions)
    pub fn clock_bits<H: EdgeHandler<Self>>(
        &mut self,
        handler: &H,
        mode: Mode,
        order: BitOrder,
        mosi: u8,
        bits: u8,
    ) -> u8 {
        let idle = mode.polarity() == Polarity::IdleHigh;
        let mut miso = 0u8;

        for n in 0..bits {
            let Some(bit) = order.bit_position(n) else {
                break;
            };
            let out = (mosi >> bit) & 1 == 1;

            if mode.captures_on_first() {
                self.set_level(MOSI, out);
                self.drive(handler, CLK, !idle);
                if self.level(MISO) {
                    miso |= 1 << bit;
                }
                self.drive(handler, CLK, idle);
            } else {
                self.drive(handler, CLK, !idle);
                self.set_level(MOSI, out);
                self.drive(handler, CLK, idle);
                if self.level(MISO) {
                    miso |= 1 << bit;
                }
            }
        }

        miso
    }

    /// Full-byte transfer
    pub fn transfer<H: EdgeHandler<Self>>(
        &mut self,
        handler: &H,
        mode: Mode,
        order: BitOrder,
        mosi: u8,
    ) -> u8 {
        self.clock_bits(handler, mode, order, mosi, 8)
    }
}

impl Gpio for SimBus {
    fn is_high(&self, pin: PinId) -> bool {
        self.level(pin)
    }

    fn set_state(&mut self, pin: PinId, high: bool) {
        self.set_level(pin, high);
    }

    fn set_direction(&mut self, pin: PinId, direction: PinDirection) {
        self.directions[pin.0 as usize] = direction;
    }
}

impl EdgeInterrupts for SimBus {
    fn is_interrupt_capable(&self, pin: PinId) -> bool {
        self.capable[pin.0 as usize]
    }

    fn attach(&mut self, pin: PinId, source: EdgeSource) -> bool {
        if !self.is_interrupt_capable(pin) || self.refused[pin.0 as usize] {
            return false;
        }
        self.attached[pin.0 as usize] = Some(source);
        true
    }

    fn detach(&mut self, pin: PinId) {
        self.attached[pin.0 as usize] = None;
    }
}

impl MonotonicClock for SimBus {
    fn now_ms(&self) -> u32 {
        self.now_ms
    }
}
