//! Board-agnostic register-access engine
//!
//! This crate moves register values of 1 to 8 bytes, bit fields and masked
//! bit groups over a transaction-oriented bus ([`regbus_hal::Transport`]):
//!
//! - Byte-order codec (big/little endian, any width)
//! - Chunked transfer engine honoring the transport's buffer size
//! - Bit-field engine (positional and masked read-modify-write)
//! - Session state and configuration
//! - Width-specific convenience API on [`Device`]
//!
//! ```ignore
//! let mut bus = RegisterBus::new(transport, SessionConfig::default());
//! bus.begin();
//! let who_am_i = bus.device_at(0x68).read_u8(0x75)?;
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

// Must come first so the logging macros are visible to later modules
#[macro_use]
mod fmt;

pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod field;
pub mod session;
pub mod transfer;

pub use codec::{ByteOrder, RegisterValue, Width};
pub use config::{ConfigError, SessionConfig};
pub use device::Device;
pub use error::{Error, Outcome};
pub use field::BitField;
pub use regbus_hal::{BusStatus, Transport};
pub use session::{RegisterBus, Request};
