//! Software SPI slave
//!
//! An SPI slave for pins without a hardware SPI peripheral. The whole state
//! machine runs from two edge interrupts:
//!
//! - every clock edge samples or shifts one half bit
//! - every select edge claims or releases the data-out line
//!
//! Completed bytes land in a receive ring; bytes queued for the master are
//! taken from a transmit ring at the start of each byte. Mainline code polls
//! the rings; nothing here blocks.

pub mod config;
pub mod ring;
pub mod slave;

#[cfg(test)]
pub(crate) mod sim;

pub use config::{
    ActivationError, SlaveConfig, SlavePins, DEFAULT_RX_CAPACITY, DEFAULT_TX_CAPACITY,
};
pub use ring::{RingBuffer, StreamByte};
pub use slave::SoftSpiSlave;
