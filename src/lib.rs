//! DHT11 Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for the DHT11 temperature
//! and humidity sensor, built on top of the [`embedded-hal`] traits.
//!
//! The sensor answers a start signal on its single data line with a 40 bit
//! frame whose bits are encoded in the length of high pulses. The driver times
//! those pulses by polling the line once per microsecond, assembles the frame
//! and validates its checksum.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments
//! - Last good reading is kept across failed reads
//! - Optional periodic [`Monitor`] that enforces the sensor's minimum read interval
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`InputPin`] and [`OutputPin`] for GPIO access (the pin must be open-drain)
//! - [`DelayNs`] for accurate timing
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs read failures
//! - `critical-section`: Times the sensor response with interrupts disabled
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod dht11;
pub mod error;
pub mod monitor;

pub use dht11::{Dht11, Reading};
pub use error::{DhtError, ReadOutcome, report};
pub use monitor::Monitor;
