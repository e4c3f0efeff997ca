//! Device handle and width-specific convenience API
//!
//! A [`Device`] borrows the engine and pins the device address and byte
//! order for a series of calls. Engine outcomes are turned into `Result`s:
//! a transfer is `Ok` only when every element moved with a success status.
//!
//! ```ignore
//! let mut imu = bus.device_at(0x68).with_byte_order(ByteOrder::BigEndian);
//! let accel_x = imu.read_i16(0x3B)?;
//! imu.update_field(0x1C, BitField::new(4, 2)?, 0b01u8)?;
//! ```

use core::slice;

use regbus_hal::Transport;

use crate::codec::{ByteOrder, RegisterValue, Width};
use crate::error::Error;
use crate::field::BitField;
use crate::session::{RegisterBus, Request};

/// A device on the bus, bound to an address and byte order
pub struct Device<'a, T> {
    bus: &'a mut RegisterBus<T>,
    address: u8,
    order: ByteOrder,
}

impl<'a, T: Transport> Device<'a, T> {
    pub(crate) fn new(bus: &'a mut RegisterBus<T>, address: u8, order: ByteOrder) -> Self {
        Self {
            bus,
            address,
            order,
        }
    }

    /// Use a different byte order for this handle only
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Byte order used by this handle
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn request(&self, register: u8, width: Width) -> Request {
        Request::new(self.address, register, width, self.order)
    }

    fn ensure_ready(&self) -> Result<(), Error> {
        if self.bus.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    // ---- Reads ----

    /// Read consecutive elements transferred with `width` bytes each
    pub fn read_values_with_width<V: RegisterValue>(
        &mut self,
        register: u8,
        width: Width,
        out: &mut [V],
    ) -> Result<(), Error> {
        self.ensure_ready()?;
        let request = self.request(register, width);
        self.bus.read_values(request, out).check(out.len())
    }

    /// Read consecutive elements of their native width
    pub fn read_values<V: RegisterValue>(&mut self, register: u8, out: &mut [V]) -> Result<(), Error> {
        self.read_values_with_width(register, Width::of::<V>(), out)
    }

    /// Read one element transferred with `width` bytes
    pub fn read_with_width<V: RegisterValue>(&mut self, register: u8, width: Width) -> Result<V, Error> {
        let mut value = V::default();
        self.read_values_with_width(register, width, slice::from_mut(&mut value))?;
        Ok(value)
    }

    /// Read one element of its native width
    pub fn read<V: RegisterValue>(&mut self, register: u8) -> Result<V, Error> {
        self.read_with_width(register, Width::of::<V>())
    }

    /// Read a block of bytes
    pub fn read_bytes(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.read_values(register, buf)
    }

    /// Read an 8-bit register
    pub fn read_u8(&mut self, register: u8) -> Result<u8, Error> {
        self.read(register)
    }

    /// Read a signed 8-bit register
    pub fn read_i8(&mut self, register: u8) -> Result<i8, Error> {
        self.read(register)
    }

    /// Read an unsigned 16-bit register
    pub fn read_u16(&mut self, register: u8) -> Result<u16, Error> {
        self.read(register)
    }

    /// Read a signed 16-bit register
    pub fn read_i16(&mut self, register: u8) -> Result<i16, Error> {
        self.read(register)
    }

    /// Read an unsigned 24-bit register
    pub fn read_u24(&mut self, register: u8) -> Result<u32, Error> {
        self.read_with_width(register, Width::U24)
    }

    /// Read a signed 24-bit register (sign-extended)
    pub fn read_i24(&mut self, register: u8) -> Result<i32, Error> {
        self.read_with_width(register, Width::U24)
    }

    /// Read an unsigned 32-bit register
    pub fn read_u32(&mut self, register: u8) -> Result<u32, Error> {
        self.read(register)
    }

    /// Read a signed 32-bit register
    pub fn read_i32(&mut self, register: u8) -> Result<i32, Error> {
        self.read(register)
    }

    /// Read an unsigned 64-bit register
    pub fn read_u64(&mut self, register: u8) -> Result<u64, Error> {
        self.read(register)
    }

    /// Read a signed 64-bit register
    pub fn read_i64(&mut self, register: u8) -> Result<i64, Error> {
        self.read(register)
    }

    // ---- Writes ----

    /// Write consecutive elements with `width` bytes each
    pub fn write_values_with_width<V: RegisterValue>(
        &mut self,
        register: u8,
        width: Width,
        values: &[V],
    ) -> Result<(), Error> {
        self.ensure_ready()?;
        let request = self.request(register, width);
        self.bus.write_values(request, values).check(values.len())
    }

    /// Write consecutive elements of their native width
    pub fn write_values<V: RegisterValue>(&mut self, register: u8, values: &[V]) -> Result<(), Error> {
        self.write_values_with_width(register, Width::of::<V>(), values)
    }

    /// Write one element of its native width
    pub fn write<V: RegisterValue>(&mut self, register: u8, value: V) -> Result<(), Error> {
        self.write_values(register, &[value])
    }

    /// Write a block of bytes
    pub fn write_bytes(&mut self, register: u8, bytes: &[u8]) -> Result<(), Error> {
        self.write_values(register, bytes)
    }

    /// Write an 8-bit register
    pub fn write_u8(&mut self, register: u8, value: u8) -> Result<(), Error> {
        self.write(register, value)
    }

    /// Write a signed 8-bit register
    pub fn write_i8(&mut self, register: u8, value: i8) -> Result<(), Error> {
        self.write(register, value)
    }

    /// Write an unsigned 16-bit register
    pub fn write_u16(&mut self, register: u8, value: u16) -> Result<(), Error> {
        self.write(register, value)
    }

    /// Write a signed 16-bit register
    pub fn write_i16(&mut self, register: u8, value: i16) -> Result<(), Error> {
        self.write(register, value)
    }

    /// Write the low 24 bits of `value`
    pub fn write_u24(&mut self, register: u8, value: u32) -> Result<(), Error> {
        self.write_values_with_width(register, Width::U24, &[value])
    }

    /// Write a signed 24-bit value
    pub fn write_i24(&mut self, register: u8, value: i32) -> Result<(), Error> {
        self.write_values_with_width(register, Width::U24, &[value])
    }

    /// Write an unsigned 32-bit register
    pub fn write_u32(&mut self, register: u8, value: u32) -> Result<(), Error> {
        self.write(register, value)
    }

    /// Write a signed 32-bit register
    pub fn write_i32(&mut self, register: u8, value: i32) -> Result<(), Error> {
        self.write(register, value)
    }

    /// Write an unsigned 64-bit register
    pub fn write_u64(&mut self, register: u8, value: u64) -> Result<(), Error> {
        self.write(register, value)
    }

    /// Write a signed 64-bit register
    pub fn write_i64(&mut self, register: u8, value: i64) -> Result<(), Error> {
        self.write(register, value)
    }

    // ---- Bit fields ----

    /// Read a positional field from a register of `V`'s width
    pub fn read_field<V: RegisterValue>(&mut self, register: u8, field: BitField) -> Result<V, Error> {
        self.ensure_ready()?;
        let request = self.request(register, Width::of::<V>());
        let mut value = V::default();
        self.bus.read_field(request, field, &mut value)?.check(1)?;
        Ok(value)
    }

    /// Read a single bit of an 8-bit register
    pub fn read_bit(&mut self, register: u8, bit: u8) -> Result<bool, Error> {
        let value: u8 = self.read_field(register, BitField::bit(bit)?)?;
        Ok(value != 0)
    }

    /// Read the bits selected by `mask`, left in register position
    pub fn read_masked<V: RegisterValue>(&mut self, register: u8, mask: V) -> Result<V, Error> {
        self.ensure_ready()?;
        let request = self.request(register, Width::of::<V>());
        let mut value = V::default();
        self.bus.read_masked(request, mask, &mut value).check(1)?;
        Ok(value)
    }

    /// Write a positional field, writing all other bits as zero
    pub fn write_field<V: RegisterValue>(
        &mut self,
        register: u8,
        field: BitField,
        value: V,
    ) -> Result<(), Error> {
        self.field_op(register, field, value, true)
    }

    /// Change a positional field, preserving the other bits
    pub fn update_field<V: RegisterValue>(
        &mut self,
        register: u8,
        field: BitField,
        value: V,
    ) -> Result<(), Error> {
        self.field_op(register, field, value, false)
    }

    /// Set or clear one bit of an 8-bit register, preserving the others
    pub fn update_bit(&mut self, register: u8, bit: u8, set: bool) -> Result<(), Error> {
        self.update_field(register, BitField::bit(bit)?, set as u8)
    }

    /// Write the bits selected by `mask`, writing all other bits as zero
    pub fn write_masked<V: RegisterValue>(&mut self, register: u8, mask: V, value: V) -> Result<(), Error> {
        self.masked_op(register, mask, value, true)
    }

    /// Change the bits selected by `mask`, preserving the other bits
    pub fn update_masked<V: RegisterValue>(&mut self, register: u8, mask: V, value: V) -> Result<(), Error> {
        self.masked_op(register, mask, value, false)
    }

    fn field_op<V: RegisterValue>(
        &mut self,
        register: u8,
        field: BitField,
        value: V,
        skip_read: bool,
    ) -> Result<(), Error> {
        self.ensure_ready()?;
        let request = self.request(register, Width::of::<V>());
        self.bus.write_field(request, field, value, skip_read)?.check(1)
    }

    fn masked_op<V: RegisterValue>(
        &mut self,
        register: u8,
        mask: V,
        value: V,
        skip_read: bool,
    ) -> Result<(), Error> {
        self.ensure_ready()?;
        let request = self.request(register, Width::of::<V>());
        self.bus.write_masked(request, mask, value, skip_read).check(1)
    }
}
