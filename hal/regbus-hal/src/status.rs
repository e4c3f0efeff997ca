//! Bus status taxonomy
//!
//! Every flushed transaction reports one of these codes. The numeric values
//! follow the two-wire convention so they can be logged or stored as a
//! plain byte.

/// Status reported at the end of a bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BusStatus {
    /// Transaction completed
    #[default]
    Success = 0,
    /// Outgoing data exceeded the transaction buffer
    BufferOverflow = 1,
    /// Address phase was not acknowledged
    AddressNack = 2,
    /// Data phase was not acknowledged
    DataNack = 3,
    /// Any other transport error
    Other = 4,
    /// Transport timed out
    Timeout = 5,
}

impl BusStatus {
    /// Get the status as its numeric code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Create a status from its numeric code
    ///
    /// Unknown codes are reported as [`BusStatus::Other`].
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => BusStatus::Success,
            1 => BusStatus::BufferOverflow,
            2 => BusStatus::AddressNack,
            3 => BusStatus::DataNack,
            5 => BusStatus::Timeout,
            _ => BusStatus::Other,
        }
    }

    /// Check if the transaction succeeded
    pub fn is_success(self) -> bool {
        self == BusStatus::Success
    }

    /// Short human-readable description
    pub fn message(self) -> &'static str {
        match self {
            BusStatus::Success => "success",
            BusStatus::BufferOverflow => "data too long to fit in transmit buffer",
            BusStatus::AddressNack => "received NACK on transmit of address",
            BusStatus::DataNack => "received NACK on transmit of data",
            BusStatus::Other => "other error",
            BusStatus::Timeout => "timeout",
        }
    }
}

impl From<BusStatus> for u8 {
    fn from(status: BusStatus) -> Self {
        status.code()
    }
}
