//! I2C transport abstraction
//!
//! The register engine talks to the bus through a small, transaction
//! oriented interface modelled on the classic two-wire master API: bytes
//! are queued between [`Transport::begin_transaction`] and
//! [`Transport::end_transaction`], and reads are served from a receive
//! buffer filled by [`Transport::request_bytes`].

use crate::status::BusStatus;

/// Transaction buffer size of most two-wire implementations (AVR and friends)
pub const DEFAULT_BUFFER_LEN: usize = 32;

/// Transaction buffer size on larger MCUs (ESP32, ESP8266)
pub const LARGE_BUFFER_LEN: usize = 128;

/// Transaction-oriented I2C bus master
///
/// All operations are synchronous and blocking. Errors are never raised
/// while queuing; they surface as the [`BusStatus`] returned when the
/// transaction is flushed.
///
/// # Invariants
///
/// - Only one transaction is open at a time
/// - `available`/`read_byte` refer to the most recent `request_bytes`
/// - The caller serializes access; implementations are not reentrant
pub trait Transport {
    /// Open a write transaction addressed to a device
    ///
    /// # Arguments
    /// * `address` - 7-bit device address
    fn begin_transaction(&mut self, address: u8);

    /// Queue one byte in the open transaction
    fn write_byte(&mut self, byte: u8);

    /// Flush the open transaction and report its status
    fn end_transaction(&mut self) -> BusStatus;

    /// Request up to `count` bytes from a device
    ///
    /// # Returns
    /// The number of bytes actually made available for [`read_byte`](Self::read_byte).
    fn request_bytes(&mut self, address: u8, count: usize) -> usize;

    /// Check if unread bytes remain from the last request
    fn available(&mut self) -> bool;

    /// Consume one received byte
    ///
    /// Returns 0 when nothing is available.
    fn read_byte(&mut self) -> u8;

    /// Maximum number of bytes a single transaction can carry
    fn buffer_len(&self) -> usize {
        DEFAULT_BUFFER_LEN
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn begin_transaction(&mut self, address: u8) {
        (**self).begin_transaction(address)
    }

    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte)
    }

    fn end_transaction(&mut self) -> BusStatus {
        (**self).end_transaction()
    }

    fn request_bytes(&mut self, address: u8, count: usize) -> usize {
        (**self).request_bytes(address, count)
    }

    fn available(&mut self) -> bool {
        (**self).available()
    }

    fn read_byte(&mut self) -> u8 {
        (**self).read_byte()
    }

    fn buffer_len(&self) -> usize {
        (**self).buffer_len()
    }
}
