//! Typed (de)serialization of scalars, flat arrays, and aggregate records
//! into little-endian wire bytes.
//!
//! Dispatch is a pair of sealed traits resolved entirely at compile time:
//! [`WireScalar`] for the leaf numeric/boolean types, and [`WireValue`] for
//! anything `write_data`/`read_data` can move to or from a buffer — scalars,
//! `[T; N]` arrays of scalars, and hand-written aggregate records that chain
//! into their fields' own `WireValue` impls in declaration order. An array's
//! element count is the const generic `N`, so the shape is known to the
//! compiler instead of inspected at the call site.

use crate::error::{ReadError, WriteError};

mod sealed {
    pub trait Sealed {}
}

/// A scalar leaf type accepted by the wire format: the four unsigned and
/// four signed integer widths, the two IEEE-754 float widths, and `bool`.
///
/// Sealed: only the types listed in this module implement it.
pub trait WireScalar: sealed::Sealed + Copy + Default + Sized {
    /// Size of the little-endian encoding, in bytes.
    const SIZE: usize;

    /// Writes the little-endian encoding of `self` into `out`, which must be
    /// exactly `Self::SIZE` bytes.
    fn to_le_bytes_into(self, out: &mut [u8]);

    /// Reads `Self::SIZE` little-endian bytes from `bytes` into a value.
    fn from_le_bytes_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_wire_scalar_int {
    ($t:ty, $size:expr) => {
        impl sealed::Sealed for $t {}
        impl WireScalar for $t {
            const SIZE: usize = $size;

            #[inline]
            fn to_le_bytes_into(self, out: &mut [u8]) {
                out[..$size].copy_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn from_le_bytes_slice(bytes: &[u8]) -> Self {
                let mut buf = [0u8; $size];
                buf.copy_from_slice(&bytes[..$size]);
                <$t>::from_le_bytes(buf)
            }
        }
    };
}

impl_wire_scalar_int!(u8, 1);
impl_wire_scalar_int!(u16, 2);
impl_wire_scalar_int!(u32, 4);
impl_wire_scalar_int!(u64, 8);
impl_wire_scalar_int!(i8, 1);
impl_wire_scalar_int!(i16, 2);
impl_wire_scalar_int!(i32, 4);
impl_wire_scalar_int!(i64, 8);
impl_wire_scalar_int!(f32, 4);
impl_wire_scalar_int!(f64, 8);

impl sealed::Sealed for bool {}
impl WireScalar for bool {
    const SIZE: usize = 1;

    #[inline]
    fn to_le_bytes_into(self, out: &mut [u8]) {
        out[0] = self as u8;
    }

    #[inline]
    fn from_le_bytes_slice(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// Anything `write_data`/`read_data` can move to or from a buffer: a
/// [`WireScalar`], a flat array of them, or a hand-written aggregate record
/// built from other `WireValue`s.
pub trait WireValue: Sized {
    /// Size of the encoded form, in bytes.
    const SIZE: usize;

    /// Encodes `self` into `buffer` starting at `start_index`. Returns the
    /// index immediately past the last byte written.
    fn write_into(&self, buffer: &mut [u8], start_index: usize) -> Result<usize, WriteError>;

    /// Decodes a value from `buffer` starting at `start_index`. Returns the
    /// value and the index immediately past the last byte consumed.
    fn read_from(buffer: &[u8], start_index: usize) -> Result<(Self, usize), ReadError>;
}

impl<T: WireScalar> WireValue for T {
    const SIZE: usize = T::SIZE;

    fn write_into(&self, buffer: &mut [u8], start_index: usize) -> Result<usize, WriteError> {
        let end = start_index + Self::SIZE;
        let slot = buffer
            .get_mut(start_index..end)
            .ok_or(WriteError::InsufficientBufferCapacity {
                start_index,
                size: Self::SIZE,
                capacity: buffer.len(),
            })?;
        self.to_le_bytes_into(slot);
        Ok(end)
    }

    fn read_from(buffer: &[u8], start_index: usize) -> Result<(Self, usize), ReadError> {
        let end = start_index + Self::SIZE;
        let slot = buffer
            .get(start_index..end)
            .ok_or_else(|| ReadError::InsufficientData {
                start_index,
                size: Self::SIZE,
                available: buffer.len().saturating_sub(start_index),
            })?;
        Ok((T::from_le_bytes_slice(slot), end))
    }
}

impl<T: WireScalar, const N: usize> WireValue for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn write_into(&self, buffer: &mut [u8], start_index: usize) -> Result<usize, WriteError> {
        if N == 0 {
            return Err(WriteError::EmptyArray);
        }
        let mut index = start_index;
        for element in self.iter() {
            index = <T as WireValue>::write_into(element, buffer, index)?;
        }
        Ok(index)
    }

    fn read_from(buffer: &[u8], start_index: usize) -> Result<(Self, usize), ReadError> {
        if N == 0 {
            return Err(ReadError::EmptyArray);
        }
        let mut out = [T::default(); N];
        let mut index = start_index;
        for slot in out.iter_mut() {
            let (value, next) = <T as WireValue>::read_from(buffer, index)?;
            *slot = value;
            index = next;
        }
        Ok((out, index))
    }
}
