//! Hardware driver implementations
//!
//! This crate provides the interrupt-driven pieces of the caliper link:
//!
//! - Software SPI slave built from clock and select edge interrupts
//! - ISR-safe circular byte buffers
//! - Caliper link that frames received bytes into the packet decoder

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod link;
pub mod softspi;

pub use link::{CaliperLink, PollStatus};
pub use softspi::{
    ActivationError, RingBuffer, SlaveConfig, SlavePins, SoftSpiSlave, StreamByte,
};
