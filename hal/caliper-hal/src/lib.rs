//! Caliper Link Hardware Abstraction Layer
//!
//! This crate defines the capability the bit-banged SPI slave consumes:
//! pin access by number, edge-interrupt registration and a monotonic
//! millisecond clock. Chip-specific bindings implement these traits; host
//! tests implement them with a simulated bus.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  caliper-drivers (SoftSpiSlave, link)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  caliper-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  MCU binding  │       │ host simulator│
//! │  (ISR glue)   │       │   (tests)     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::Gpio`] - Digital I/O and direction switching by pin number
//! - [`interrupt::EdgeInterrupts`] - Edge-triggered interrupt registration
//! - [`interrupt::EdgeHandler`] - Receiver of dispatched edges
//! - [`time::MonotonicClock`] - Millisecond timestamps

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod interrupt;
pub mod spi;
pub mod time;

// Re-export key traits at crate root for convenience
pub use gpio::{Gpio, PinDirection, PinId};
pub use interrupt::{EdgeHandler, EdgeInterrupts, EdgeSource};
pub use spi::{BitOrder, Mode, Phase, Polarity};
pub use time::MonotonicClock;

