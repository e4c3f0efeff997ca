//! Transfer outcomes and errors
//!
//! Engine operations never fail loudly: they report an [`Outcome`] (how many
//! elements moved and the last bus status). The convenience API on
//! [`Device`](crate::Device) turns outcomes into `Result`s.

use regbus_hal::BusStatus;

/// Result of the last engine operation
///
/// Reset at the start of every operation, never accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outcome {
    /// Elements fully transferred
    pub transferred: usize,
    /// Status of the last transaction flushed
    pub status: BusStatus,
}

impl Outcome {
    /// Create an outcome
    pub const fn new(transferred: usize, status: BusStatus) -> Self {
        Self {
            transferred,
            status,
        }
    }

    /// Check if all `requested` elements moved without a bus error
    pub fn is_complete(&self, requested: usize) -> bool {
        self.status.is_success() && self.transferred >= requested
    }

    /// Convert into a `Result` for a transfer of `requested` elements
    pub fn check(&self, requested: usize) -> Result<(), Error> {
        if !self.status.is_success() {
            return Err(Error::Bus(self.status));
        }
        if self.transferred < requested {
            return Err(Error::Incomplete {
                transferred: self.transferred,
                requested,
            });
        }
        Ok(())
    }
}

/// Register access errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Session has not been started with `begin`
    NotInitialized,
    /// Transport reported a non-zero status
    Bus(BusStatus),
    /// Fewer elements arrived than requested
    Incomplete {
        /// Elements fully transferred
        transferred: usize,
        /// Elements requested
        requested: usize,
    },
    /// Bit field is empty or does not fit the register width
    InvalidField,
}

impl From<BusStatus> for Error {
    fn from(status: BusStatus) -> Self {
        Error::Bus(status)
    }
}
