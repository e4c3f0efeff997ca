//! Regbus Hardware Abstraction Layer
//!
//! This crate defines the transport collaborator that the register-access
//! engine drives. A transport is anything that can open an addressed
//! transaction, queue bytes, flush them and report a status, and serve
//! bytes back from a read request. Chip HALs (or the embedded-hal adapter
//! in `regbus-hal-embedded`) implement it; `regbus-core` consumes it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Device drivers (application code)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  regbus-core (codec, chunking, fields)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  regbus-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ regbus-hal-   │       │  sim::SimBus  │
//! │   embedded    │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::Transport`] - Transaction-oriented bus transport
//! - [`status::BusStatus`] - Status codes reported at transaction end

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod status;

// Re-export key items at crate root for convenience
pub use i2c::{Transport, DEFAULT_BUFFER_LEN, LARGE_BUFFER_LEN};
pub use status::BusStatus;
