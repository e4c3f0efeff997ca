//! Simulated register device
//!
//! A host-side [`Transport`] that behaves like a single register-mapped
//! peripheral: the first byte of every write transaction sets an
//! auto-incrementing register pointer, further bytes are stored from there,
//! and reads stream bytes out from the pointer.
//!
//! Faults can be injected to exercise error paths:
//! - [`SimBus::fail_transaction`] makes the k-th flushed transaction report
//!   an arbitrary status without touching the registers
//! - [`SimBus::truncate_next_read`] serves fewer bytes than requested

use heapless::Vec;

use crate::i2c::{Transport, DEFAULT_BUFFER_LEN};
use crate::status::BusStatus;

/// Size of the simulated register file (full 8-bit register space)
pub const REGISTER_SPACE: usize = 256;

/// Maximum number of read requests remembered for inspection
pub const MAX_RECORDED_REQUESTS: usize = 64;

/// Simulated single-device bus with an `N`-byte transaction buffer
#[derive(Debug, Clone)]
pub struct SimBus<const N: usize = DEFAULT_BUFFER_LEN> {
    device_address: u8,
    registers: [u8; REGISTER_SPACE],
    pointer: u8,
    tx_address: u8,
    tx: Vec<u8, N>,
    tx_overflow: bool,
    rx: Vec<u8, N>,
    rx_pos: usize,
    transactions: usize,
    fail_at: Option<(usize, BusStatus)>,
    short_read: Option<usize>,
    requests: Vec<usize, MAX_RECORDED_REQUESTS>,
}

impl<const N: usize> SimBus<N> {
    /// Create a simulated device answering at `device_address`
    pub fn new(device_address: u8) -> Self {
        Self {
            device_address,
            registers: [0; REGISTER_SPACE],
            pointer: 0,
            tx_address: 0,
            tx: Vec::new(),
            tx_overflow: false,
            rx: Vec::new(),
            rx_pos: 0,
            transactions: 0,
            fail_at: None,
            short_read: None,
            requests: Vec::new(),
        }
    }

    /// Address the simulated device answers at
    pub fn device_address(&self) -> u8 {
        self.device_address
    }

    /// Set a single register
    pub fn set_register(&mut self, register: u8, value: u8) {
        self.registers[register as usize] = value;
    }

    /// Load consecutive registers starting at `register` (wraps at 0xFF)
    pub fn load(&mut self, register: u8, bytes: &[u8]) {
        let mut reg = register;
        for &byte in bytes {
            self.registers[reg as usize] = byte;
            reg = reg.wrapping_add(1);
        }
    }

    /// Read back a single register
    pub fn register(&self, register: u8) -> u8 {
        self.registers[register as usize]
    }

    /// Registers from `register` up to the end of the register space,
    /// limited to `len` bytes
    pub fn registers(&self, register: u8, len: usize) -> &[u8] {
        let start = register as usize;
        let end = (start + len).min(REGISTER_SPACE);
        &self.registers[start..end]
    }

    /// Make the flushed transaction with zero-based index `index` report `status`
    ///
    /// The failing transaction has no effect on the register file.
    pub fn fail_transaction(&mut self, index: usize, status: BusStatus) {
        self.fail_at = Some((index, status));
    }

    /// Serve at most `count` bytes on the next read request
    pub fn truncate_next_read(&mut self, count: usize) {
        self.short_read = Some(count);
    }

    /// Number of transactions flushed so far
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// Byte counts of every read request so far (oldest first)
    pub fn read_requests(&self) -> &[usize] {
        &self.requests
    }

    /// Forget transaction and request history
    pub fn reset_counters(&mut self) {
        self.transactions = 0;
        self.requests.clear();
    }
}

impl<const N: usize> Transport for SimBus<N> {
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
        let index = self.transactions;
        self.transactions += 1;

        if let Some((at, status)) = self.fail_at {
            if at == index {
                self.fail_at = None;
                return status;
            }
        }
        if self.tx_address != self.device_address {
            return BusStatus::AddressNack;
        }
        if self.tx_overflow {
            return BusStatus::BufferOverflow;
        }

        if let Some((&register, data)) = self.tx.split_first() {
            self.pointer = register;
            for &byte in data {
                self.registers[self.pointer as usize] = byte;
                self.pointer = self.pointer.wrapping_add(1);
            }
        }
        BusStatus::Success
    }

    fn request_bytes(&mut self, address: u8, count: usize) -> usize {
        self.rx.clear();
        self.rx_pos = 0;
        // History is best-effort once full
        let _ = self.requests.push(count);

        if address != self.device_address {
            return 0;
        }

        let mut served = count.min(N);
        if let Some(limit) = self.short_read.take() {
            served = served.min(limit);
        }
        for _ in 0..served {
            // Cannot fail: served <= N
            let _ = self.rx.push(self.registers[self.pointer as usize]);
            self.pointer = self.pointer.wrapping_add(1);
        }
        served
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
