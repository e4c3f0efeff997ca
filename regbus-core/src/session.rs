//! Register bus session
//!
//! [`RegisterBus`] owns a transport together with the session state shared by
//! every call on it: default device address, byte order, transaction budget
//! and the outcome of the last operation.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──► begin() ──► read/write ... ──► release()
//!   │                      ▲
//!   └── (no-op, count 0) ──┘ before begin()
//! ```

use regbus_hal::Transport;

use crate::codec::{ByteOrder, Width};
use crate::config::SessionConfig;
use crate::device::Device;
use crate::error::Outcome;

/// Addressing and encoding of one engine call
///
/// Fixed for the duration of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Request {
    /// Device address
    pub address: u8,
    /// First register
    pub register: u8,
    /// Bytes per element
    pub width: Width,
    /// Byte order of each element
    pub order: ByteOrder,
}

impl Request {
    /// Create a request
    pub const fn new(address: u8, register: u8, width: Width, order: ByteOrder) -> Self {
        Self {
            address,
            register,
            width,
            order,
        }
    }
}

/// Session state owned by a [`RegisterBus`]
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub(crate) address: u8,
    pub(crate) byte_order: ByteOrder,
    pub(crate) max_transaction: usize,
    pub(crate) chunked_writes: bool,
    pub(crate) verbose: bool,
    pub(crate) initialized: bool,
    pub(crate) last: Outcome,
    pub(crate) last_value: u64,
}

/// Register access engine bound to one transport
pub struct RegisterBus<T> {
    pub(crate) transport: T,
    pub(crate) session: Session,
}

impl<T: Transport> RegisterBus<T> {
    /// Create an engine from a transport and configuration
    ///
    /// The transaction budget is capped by the transport's buffer and is
    /// never below one byte. Call [`begin`](Self::begin) before any transfer.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let max_transaction = Self::effective_budget(&transport, config.max_transaction as usize);
        Self {
            transport,
            session: Session {
                address: config.device_address,
                byte_order: config.byte_order,
                max_transaction,
                chunked_writes: config.chunked_writes,
                verbose: config.verbose,
                initialized: false,
                last: Outcome::default(),
                last_value: 0,
            },
        }
    }

    fn effective_budget(transport: &T, requested: usize) -> usize {
        requested.min(transport.buffer_len()).max(1)
    }

    /// Mark the transport ready; transfers are no-ops until this is called
    pub fn begin(&mut self) {
        self.session.initialized = true;
        debug!(
            "register bus ready: device {=u8:#x}, {=usize} byte transactions",
            self.session.address,
            self.session.max_transaction
        );
    }

    /// Check if [`begin`](Self::begin) has been called
    pub fn is_initialized(&self) -> bool {
        self.session.initialized
    }

    /// Set the default device address
    pub fn set_address(&mut self, address: u8) {
        self.session.address = address;
    }

    /// Default device address
    pub fn address(&self) -> u8 {
        self.session.address
    }

    /// Set the session byte order
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.session.byte_order = order;
    }

    /// Session byte order
    pub fn byte_order(&self) -> ByteOrder {
        self.session.byte_order
    }

    /// Set the transaction budget in bytes (capped by the transport)
    pub fn set_max_transaction(&mut self, bytes: usize) {
        self.session.max_transaction = Self::effective_budget(&self.transport, bytes);
    }

    /// Effective transaction budget in bytes
    pub fn max_transaction(&self) -> usize {
        self.session.max_transaction
    }

    /// Enable or disable chunked writes
    pub fn set_chunked_writes(&mut self, chunked: bool) {
        self.session.chunked_writes = chunked;
    }

    /// Log failed transactions at warning level
    pub fn set_verbose(&mut self, verbose: bool) {
        self.session.verbose = verbose;
    }

    /// Outcome of the last operation
    pub fn last_outcome(&self) -> Outcome {
        self.session.last
    }

    /// Raw bits of the first element (or field) read by the last read
    ///
    /// Zero when the last read transferred nothing.
    pub fn last_value(&self) -> u64 {
        self.session.last_value
    }

    /// Check if the last operation ended with a successful bus status
    pub fn succeeded(&self) -> bool {
        self.session.last.status.is_success()
    }

    /// Build a request for the default device with the session byte order
    pub fn request(&self, register: u8, width: Width) -> Request {
        Request::new(self.session.address, register, width, self.session.byte_order)
    }

    /// Access the default device
    pub fn device(&mut self) -> Device<'_, T> {
        let address = self.session.address;
        self.device_at(address)
    }

    /// Access a device at another address for the duration of the borrow
    pub fn device_at(&mut self, address: u8) -> Device<'_, T> {
        let order = self.session.byte_order;
        Device::new(self, address, order)
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the engine and return the transport
    pub fn release(self) -> T {
        self.transport
    }

    /// Store the outcome of the operation that just finished
    pub(crate) fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.session.last = outcome;
        outcome
    }
}
