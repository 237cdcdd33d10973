//! Edge-triggered interrupt abstractions
//!
//! The platform owns the interrupt vectors. A driver registers which pins it
//! wants edges for and under which [`EdgeSource`] tag; the platform ISR then
//! calls [`EdgeHandler::on_edge`] on the owning driver instance, passing its
//! I/O capability along.
//!
//! ```ignore
//! static SLAVE: SoftSpiSlave = SoftSpiSlave::new(PINS, CONFIG);
//!
//! #[interrupt]
//! fn IO_IRQ_BANK0() {
//!     let mut io = BoardIo;
//!     if io.take_edge(CLK_PIN) {
//!         SLAVE.on_edge(EdgeSource::Clock, &mut io);
//!     }
//!     if io.take_edge(SS_PIN) {
//!         SLAVE.on_edge(EdgeSource::Select, &mut io);
//!     }
//! }
//! ```

use crate::gpio::PinId;

/// Which handler an edge interrupt is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeSource {
    /// Serial clock line
    Clock,
    /// Select line
    Select,
}

/// Edge interrupt registration
///
/// Interrupts always fire on both edges (rising and falling).
pub trait EdgeInterrupts {
    /// Check if the pin can raise edge interrupts
    fn is_interrupt_capable(&self, pin: PinId) -> bool;

    /// Route both edges of `pin` to the handler for `source`
    ///
    /// Returns `false` if the platform refused the registration.
    fn attach(&mut self, pin: PinId, source: EdgeSource) -> bool;

    /// Stop delivering edges for `pin`
    fn detach(&mut self, pin: PinId);
}

/// Receiver of dispatched edge interrupts
///
/// Implementors keep their state behind atomics so the handler can run
/// through a shared reference while mainline code uses the same instance.
pub trait EdgeHandler<IO> {
    /// Handle one edge of `source`
    fn on_edge(&self, source: EdgeSource, io: &mut IO);
}
