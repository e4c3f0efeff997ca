//! I2C transport over embedded-hal
//!
//! Bytes written between `begin_transaction` and `end_transaction` are
//! queued in a fixed-size buffer and sent as a single `write` when the
//! transaction is flushed. Reads fill a receive buffer of the same size.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use heapless::Vec;
use regbus_hal::{BusStatus, Transport, DEFAULT_BUFFER_LEN};

/// Map an embedded-hal error kind to a bus status code
pub fn status_from_kind(kind: ErrorKind) -> BusStatus {
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => BusStatus::AddressNack,
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => BusStatus::DataNack,
        _ => BusStatus::Other,
    }
}

/// Transport adapter with an `N`-byte transaction buffer
pub struct HalTransport<I2C, const N: usize = DEFAULT_BUFFER_LEN> {
    i2c: I2C,
    tx_address: u8,
    tx: Vec<u8, N>,
    tx_overflow: bool,
    rx: Vec<u8, N>,
    rx_pos: usize,
}

impl<I2C, const N: usize> HalTransport<I2C, N> {
    /// Wrap an I2C bus
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            tx_address: 0,
            tx: Vec::new(),
            tx_overflow: false,
            rx: Vec::new(),
            rx_pos: 0,
        }
    }

    /// Consume the adapter and return the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c, const N: usize> Transport for HalTransport<I2C, N> {
    fn begin_transaction(&mut self, address: u8) {
        self.tx_address = address;
        self.tx.clear();
        self.tx_overflow = false;
    }

    fn write_byte(&mut self, byte: u8) {
        if self.tx.push(byte).is_err() {
            self.tx_overflow = true;
        }
    }

    fn end_transaction(&mut self) -> BusStatus {
        if self.tx_overflow {
            return BusStatus::BufferOverflow;
        }
        match self.i2c.write(self.tx_address, &self.tx) {
            Ok(()) => BusStatus::Success,
            Err(e) => status_from_kind(e.kind()),
        }
    }

    fn request_bytes(&mut self, address: u8, count: usize) -> usize {
        self.rx.clear();
        self.rx_pos = 0;

        let len = count.min(N);
        if self.rx.resize(len, 0).is_err() {
            return 0;
        }
        if self.i2c.read(address, &mut self.rx).is_err() {
            self.rx.clear();
            return 0;
        }
        len
    }

    fn available(&mut self) -> bool {
        self.rx_pos < self.rx.len()
    }

    fn read_byte(&mut self) -> u8 {
        match self.rx.get(self.rx_pos) {
            Some(&byte) => {
                self.rx_pos += 1;
                byte
            }
            None => 0,
        }
    }

    fn buffer_len(&self) -> usize {
        N
    }
}
