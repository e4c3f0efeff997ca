//! Bit-field engine
//!
//! Read-modify-write of sub-register fields on top of the transfer engine.
//! Every operation moves exactly one register element.
//!
//! Two addressing modes:
//! - positional: a [`BitField`] given by its most significant bit and length
//! - masked: an arbitrary mask supplied by the caller
//!
//! Writes can skip the read phase when the caller knows the other bits of
//! the register do not matter (they are assumed zero). A failed read aborts
//! the write, so a field is never merged into stale data.

use core::slice;

use regbus_hal::Transport;

use crate::codec::{RegisterValue, Width};
use crate::error::{Error, Outcome};
use crate::session::{RegisterBus, Request};

/// Contiguous field of `len` bits whose most significant bit is `msb`
///
/// The field occupies bits `msb - len + 1 ..= msb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitField {
    msb: u8,
    len: u8,
}

impl BitField {
    /// Create a field, rejecting empty fields and fields that run past bit 0
    /// or beyond a 64-bit register
    pub const fn new(msb: u8, len: u8) -> Result<Self, Error> {
        if len == 0 || msb >= 64 || len > msb + 1 {
            return Err(Error::InvalidField);
        }
        Ok(Self { msb, len })
    }

    /// Single-bit flag
    pub const fn bit(bit: u8) -> Result<Self, Error> {
        Self::new(bit, 1)
    }

    /// Most significant bit index
    pub fn msb(self) -> u8 {
        self.msb
    }

    /// Field length in bits
    pub fn length(self) -> u8 {
        self.len
    }

    /// Least significant bit index
    pub fn lsb(self) -> u8 {
        self.msb + 1 - self.len
    }

    /// Mask of the field bits in register position
    pub fn mask(self) -> u64 {
        let ones = if self.len >= 64 {
            u64::MAX
        } else {
            (1u64 << self.len) - 1
        };
        ones << self.lsb()
    }

    /// Check if the field lies within a register of `width`
    pub fn fits(self, width: Width) -> bool {
        (self.msb as u32) < width.bits()
    }

    /// Extract the field from a raw register value, right-aligned
    pub fn extract(self, raw: u64) -> u64 {
        if self.len == 1 {
            return (raw >> self.msb) & 1;
        }
        (raw & self.mask()) >> self.lsb()
    }

    /// Merge a right-aligned `value` into the field of `raw`
    ///
    /// Bits of `value` beyond the field length are discarded.
    pub fn insert(self, raw: u64, value: u64) -> u64 {
        if self.len == 1 {
            let flag = 1u64 << self.msb;
            return if value != 0 { raw | flag } else { raw & !flag };
        }
        let mask = self.mask();
        (raw & !mask) | ((value << self.lsb()) & mask)
    }
}

/// Replace the `mask` bits of `raw` with those of `value`
pub fn merge_masked(raw: u64, mask: u64, value: u64) -> u64 {
    (raw & !mask) | (value & mask)
}

impl<T: Transport> RegisterBus<T> {
    /// Read a positional field into `out`
    ///
    /// `out` is only written when the register was read.
    pub fn read_field<V: RegisterValue>(
        &mut self,
        request: Request,
        field: BitField,
        out: &mut V,
    ) -> Result<Outcome, Error> {
        if !field.fits(request.width) {
            self.finish(Outcome::default());
            return Err(Error::InvalidField);
        }
        let mut raw = 0u64;
        let outcome = self.read_values(request, slice::from_mut(&mut raw));
        if outcome.transferred > 0 {
            let value = field.extract(raw);
            *out = V::from_bits(value, Width::of::<V>());
            self.session.last_value = value;
        }
        Ok(outcome)
    }

    /// Read the register bits selected by `mask` (not shifted) into `out`
    pub fn read_masked<V: RegisterValue>(
        &mut self,
        request: Request,
        mask: V,
        out: &mut V,
    ) -> Outcome {
        let mut raw = 0u64;
        let outcome = self.read_values(request, slice::from_mut(&mut raw));
        if outcome.transferred > 0 {
            let value = raw & mask.to_bits();
            *out = V::from_bits(value, request.width);
            self.session.last_value = value;
        }
        outcome
    }

    /// Write a positional field
    ///
    /// With `skip_read` the other register bits are written as zero;
    /// otherwise the register is read first and only the field changes.
    pub fn write_field<V: RegisterValue>(
        &mut self,
        request: Request,
        field: BitField,
        value: V,
        skip_read: bool,
    ) -> Result<Outcome, Error> {
        if !field.fits(request.width) {
            self.finish(Outcome::default());
            return Err(Error::InvalidField);
        }
        let Some(existing) = self.existing_value(request, skip_read) else {
            return Ok(self.session.last);
        };
        let merged = field.insert(existing, value.to_bits());
        Ok(self.write_values(request, &[merged]))
    }

    /// Write the register bits selected by `mask`
    ///
    /// `value` is already in register position; it is not shifted.
    pub fn write_masked<V: RegisterValue>(
        &mut self,
        request: Request,
        mask: V,
        value: V,
        skip_read: bool,
    ) -> Outcome {
        let Some(existing) = self.existing_value(request, skip_read) else {
            return self.session.last;
        };
        let merged = merge_masked(existing, mask.to_bits(), value.to_bits());
        self.write_values(request, &[merged])
    }

    /// Current register contents for a read-modify-write
    ///
    /// `None` means the write must be suppressed: the read failed, or the
    /// session is not ready (the same guard the read path applies).
    fn existing_value(&mut self, request: Request, skip_read: bool) -> Option<u64> {
        if skip_read {
            if !self.session.initialized {
                debug!("field write skipped: session not started");
                self.finish(Outcome::default());
                return None;
            }
            return Some(0);
        }

        let mut raw = 0u64;
        let outcome = self.read_values(request, slice::from_mut(&mut raw));
        if outcome.transferred == 0 {
            debug!(
                "field write to register {=u8:#x} aborted: read failed",
                request.register
            );
            return None;
        }
        Some(raw)
    }
}
