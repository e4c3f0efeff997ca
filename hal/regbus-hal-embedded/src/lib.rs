//! embedded-hal adapter for regbus
//!
//! Lets any blocking `embedded_hal::i2c::I2c` implementation (embassy,
//! rp-hal, linux-embedded-hal, ...) act as a regbus [`Transport`].

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;

pub use i2c::{status_from_kind, HalTransport};
pub use regbus_hal::{BusStatus, Transport};
