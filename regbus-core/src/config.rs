//! Session configuration
//!
//! The configuration is a plain value that can be built in code, parsed
//! from a settings file through serde, or stored as postcard-serialized
//! binary data next to other persistent settings.

use regbus_hal::DEFAULT_BUFFER_LEN;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::ByteOrder;

/// Highest valid 7-bit device address
pub const MAX_DEVICE_ADDRESS: u8 = 0x7F;

/// Maximum serialized config size (postcard)
pub const MAX_CONFIG_SIZE: usize = 16;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Device address is not a 7-bit address
    InvalidAddress,
    /// Transaction size must allow at least one byte
    InvalidTransactionSize,
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
}

/// Register session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Default device address used when a call does not name one
    pub device_address: u8,
    /// Byte order of multi-byte registers
    pub byte_order: ByteOrder,
    /// Largest transaction in bytes (capped by the transport's buffer)
    pub max_transaction: u16,
    /// Split writes that exceed `max_transaction` into several transactions
    pub chunked_writes: bool,
    /// Log failed transactions at warning level
    pub verbose: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_address: 0,
            byte_order: ByteOrder::LittleEndian,
            max_transaction: DEFAULT_BUFFER_LEN as u16,
            chunked_writes: false,
            verbose: false,
        }
    }
}

impl SessionConfig {
    /// Create a config for a device with default settings
    pub fn for_device(device_address: u8) -> Self {
        Self {
            device_address,
            ..Self::default()
        }
    }

    /// Set the byte order
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Set the largest transaction size in bytes
    pub fn with_max_transaction(mut self, max_transaction: u16) -> Self {
        self.max_transaction = max_transaction;
        self
    }

    /// Enable or disable chunked writes
    pub fn with_chunked_writes(mut self, chunked_writes: bool) -> Self {
        self.chunked_writes = chunked_writes;
        self
    }

    /// Check the configuration for values the engine cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_address > MAX_DEVICE_ADDRESS {
            return Err(ConfigError::InvalidAddress);
        }
        if self.max_transaction == 0 {
            return Err(ConfigError::InvalidTransactionSize);
        }
        Ok(())
    }

    /// Serialize into `buffer`, returning the used part
    #[cfg(feature = "serde")]
    pub fn to_postcard<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize and validate a stored configuration
    #[cfg(feature = "serde")]
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }
}
