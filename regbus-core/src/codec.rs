//! Byte-order codec
//!
//! Converts integers of 1 to 8 bytes to and from the order in which their
//! bytes travel on the bus. Byte order is orthogonal to width: the same
//! shift formula serves 16, 24, 32 and 64-bit values.
//!
//! For a value of `n` bytes, the byte at wire position `p` (0 = first sent
//! or received) is `value >> shift` where
//! - big endian (most significant first): `shift = (n - 1 - p) * 8`
//! - little endian (least significant first): `shift = p * 8`

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest supported element width in bytes
pub const MAX_WIDTH: usize = 8;

/// Order of bytes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ByteOrder {
    /// Least significant byte first
    #[default]
    LittleEndian,
    /// Most significant byte first
    BigEndian,
}

impl ByteOrder {
    /// Check if the most significant byte travels first
    pub fn msb_first(self) -> bool {
        self == ByteOrder::BigEndian
    }

    /// Create from a "most significant byte first" flag
    pub fn from_msb_first(msb_first: bool) -> Self {
        if msb_first {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    fn shift(self, width: usize, position: usize) -> usize {
        match self {
            ByteOrder::BigEndian => (width - 1 - position) * 8,
            ByteOrder::LittleEndian => position * 8,
        }
    }
}

/// Element width in bytes, always within 1..=8
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Width(u8);

impl Width {
    /// 24-bit registers (common for ADC results and pressure sensors)
    pub const U24: Self = Self(3);

    /// Create a width, clamping to 1..=8 bytes
    pub const fn new(bytes: u8) -> Self {
        if bytes < 1 {
            Self(1)
        } else if bytes > MAX_WIDTH as u8 {
            Self(MAX_WIDTH as u8)
        } else {
            Self(bytes)
        }
    }

    /// Native width of a register value type
    pub const fn of<V: RegisterValue>() -> Self {
        Self::new(V::WIDTH)
    }

    /// Width in bytes
    pub const fn bytes(self) -> usize {
        self.0 as usize
    }

    /// Width in bits
    pub const fn bits(self) -> u32 {
        self.0 as u32 * 8
    }
}

/// Encode the low `width` bytes of `value` in wire order
///
/// Only the first `width.bytes()` entries of the result are meaningful.
pub fn encode(value: u64, width: Width, order: ByteOrder) -> [u8; MAX_WIDTH] {
    let n = width.bytes();
    let mut out = [0u8; MAX_WIDTH];
    for (position, byte) in out.iter_mut().take(n).enumerate() {
        *byte = (value >> order.shift(n, position)) as u8;
    }
    out
}

/// Reassemble a value from bytes received in wire order
///
/// At most [`MAX_WIDTH`] bytes are considered.
pub fn decode(bytes: &[u8], order: ByteOrder) -> u64 {
    let n = bytes.len().min(MAX_WIDTH);
    bytes[..n]
        .iter()
        .enumerate()
        .fold(0u64, |acc, (position, &byte)| {
            acc | (byte as u64) << order.shift(n, position)
        })
}

/// Integer types that can be moved through the register engine
///
/// Values travel as raw 64-bit patterns. Signed types sign-extend from the
/// transferred width, so a 3-byte transfer into an `i32` yields a proper
/// 24-bit signed value; unsigned types zero-extend. Patterns wider than the
/// type are truncated.
pub trait RegisterValue: Copy + Default {
    /// Native width in bytes
    const WIDTH: u8;

    /// Raw bit pattern
    fn to_bits(self) -> u64;

    /// Rebuild from a raw pattern transferred with `width` bytes
    fn from_bits(bits: u64, width: Width) -> Self;
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(
            impl RegisterValue for $t {
                const WIDTH: u8 = core::mem::size_of::<$t>() as u8;

                fn to_bits(self) -> u64 {
                    self as u64
                }

                fn from_bits(bits: u64, _width: Width) -> Self {
                    bits as $t
                }
            }
        )*
    };
}

macro_rules! impl_signed {
    ($($t:ty),*) => {
        $(
            impl RegisterValue for $t {
                const WIDTH: u8 = core::mem::size_of::<$t>() as u8;

                fn to_bits(self) -> u64 {
                    self as i64 as u64
                }

                fn from_bits(bits: u64, width: Width) -> Self {
                    let unused = 64 - width.bits();
                    (((bits << unused) as i64) >> unused) as $t
                }
            }
        )*
    };
}

impl_unsigned!(u8, u16, u32, u64);
impl_signed!(i8, i16, i32, i64);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_width_clamps() {
        assert_eq!(Width::new(0).bytes(), 1);
        assert_eq!(Width::new(3).bytes(), 3);
        assert_eq!(Width::new(12).bytes(), 8);
        assert_eq!(Width::of::<u16>().bytes(), 2);
        assert_eq!(Width::of::<i64>().bits(), 64);
    }

    #[test]
    fn test_encode_orders() {
        let le = encode(0x0011_2233, Width::new(3), ByteOrder::LittleEndian);
        assert_eq!(&le[..3], &[0x33, 0x22, 0x11]);

        let be = encode(0x0011_2233, Width::new(3), ByteOrder::BigEndian);
        assert_eq!(&be[..3], &[0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_decode_orders() {
        assert_eq!(decode(&[0x12, 0x34], ByteOrder::BigEndian), 0x1234);
        assert_eq!(decode(&[0x12, 0x34], ByteOrder::LittleEndian), 0x3412);
        assert_eq!(decode(&[], ByteOrder::BigEndian), 0);
    }

    #[test]
    fn test_msb_first_flag() {
        assert!(ByteOrder::from_msb_first(true).msb_first());
        assert_eq!(ByteOrder::from_msb_first(false), ByteOrder::LittleEndian);
        assert_eq!(ByteOrder::default(), ByteOrder::LittleEndian);
    }

    #[test]
    fn test_signed_24_bit_sign_extends() {
        let raw = decode(&[0xFF, 0xFF, 0xFE], ByteOrder::BigEndian);
        assert_eq!(i32::from_bits(raw, Width::U24), -2);
        assert_eq!(u32::from_bits(raw, Width::U24), 0x00FF_FFFE);

        let raw = decode(&[0x7F, 0xFF, 0xFF], ByteOrder::BigEndian);
        assert_eq!(i32::from_bits(raw, Width::U24), 0x7F_FFFF);
    }

    #[test]
    fn test_negative_values_encode_low_bytes() {
        let bytes = encode((-2i16).to_bits(), Width::of::<i16>(), ByteOrder::BigEndian);
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
    }

    proptest! {
        #[test]
        fn prop_roundtrip_any_width(value: u64, bytes in 1u8..=8, msb_first: bool) {
            let width = Width::new(bytes);
            let order = ByteOrder::from_msb_first(msb_first);
            let kept = if width.bits() == 64 { value } else { value & ((1u64 << width.bits()) - 1) };

            let encoded = encode(value, width, order);
            prop_assert_eq!(decode(&encoded[..width.bytes()], order), kept);
        }

        #[test]
        fn prop_orders_are_mirror_images(value: u32) {
            let width = Width::of::<u32>();
            let le = encode(value as u64, width, ByteOrder::LittleEndian);
            let mut be = encode(value as u64, width, ByteOrder::BigEndian);
            be[..4].reverse();
            prop_assert_eq!(&le[..4], &be[..4]);
            prop_assert_eq!(&le[..4], &value.to_le_bytes()[..]);
        }

        #[test]
        fn prop_signed_roundtrip(value: i16) {
            let width = Width::of::<i16>();
            let encoded = encode(value.to_bits(), width, ByteOrder::BigEndian);
            let raw = decode(&encoded[..2], ByteOrder::BigEndian);
            prop_assert_eq!(i16::from_bits(raw, width), value);
        }
    }
}
