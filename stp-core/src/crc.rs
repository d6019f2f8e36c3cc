//! Table-driven CRC-8/16/32 with a configurable polynomial, initial value,
//! and final XOR.
//!
//! The register width is carried as a type parameter (`u8`, `u16`, or `u32`)
//! rather than a runtime enum, so the compiler picks the table size and the
//! shift amounts once at monomorphization time instead of branching on width
//! at every byte. This only needs the non-reflected, big-endian-on-the-wire
//! case, so the parameter set is narrower than a general-purpose CRC catalog.

/// An unsigned integer type usable as a CRC register.
///
/// Implemented only for `u8`, `u16`, and `u32`, matching the three postamble
/// widths the wire format supports.
pub trait CrcWidth:
    Copy
    + Default
    + PartialEq
    + Eq
    + core::fmt::Debug
    + core::fmt::LowerHex
    + core::ops::BitXor<Output = Self>
    + core::ops::BitAnd<Output = Self>
    + core::ops::Shl<u32, Output = Self>
    + core::ops::Shr<u32, Output = Self>
{
    /// Width of the register, in bits.
    const BITS: u32;
    /// Width of the register, in bytes. Also the postamble size on the wire.
    const BYTES: usize;
    /// A register value with only the most significant bit set.
    const TOP_BIT: Self;

    /// Widens a single input byte into the register type.
    fn from_u8(byte: u8) -> Self;
    /// Returns the most significant byte of the register.
    fn high_byte(self) -> u8;
    /// Writes `self` into `out` as `Self::BYTES` big-endian bytes.
    fn to_be_bytes_into(self, out: &mut [u8]);
    /// Reads `Self::BYTES` big-endian bytes into a register value.
    fn from_be_bytes_slice(bytes: &[u8]) -> Self;
    /// Widens `self` to a `u64` for display/comparison in error messages.
    fn to_u64(self) -> u64;
}

macro_rules! impl_crc_width {
    ($t:ty, $bits:expr, $bytes:expr) => {
        impl CrcWidth for $t {
            const BITS: u32 = $bits;
            const BYTES: usize = $bytes;
            const TOP_BIT: Self = 1 << ($bits - 1);

            #[inline]
            fn from_u8(byte: u8) -> Self {
                byte as $t
            }

            #[inline]
            fn high_byte(self) -> u8 {
                (self >> (Self::BITS - 8)) as u8
            }

            #[inline]
            fn to_be_bytes_into(self, out: &mut [u8]) {
                out[..$bytes].copy_from_slice(&self.to_be_bytes());
            }

            #[inline]
            fn from_be_bytes_slice(bytes: &[u8]) -> Self {
                let mut buf = [0u8; $bytes];
                buf.copy_from_slice(&bytes[..$bytes]);
                <$t>::from_be_bytes(buf)
            }

            #[inline]
            fn to_u64(self) -> u64 {
                self as u64
            }
        }
    };
}

impl_crc_width!(u8, 8, 1);
impl_crc_width!(u16, 16, 2);
impl_crc_width!(u32, 32, 4);

/// A parameterized CRC with a precomputed 256-entry lookup table.
#[derive(Clone)]
pub struct CrcProcessor<W: CrcWidth> {
    table: [W; 256],
    initial_value: W,
    final_xor: W,
}

impl<W: CrcWidth> CrcProcessor<W> {
    /// Builds the lookup table for `polynomial` and stores `initial_value`
    /// and `final_xor` for use by [`Self::checksum`].
    pub fn new(polynomial: W, initial_value: W, final_xor: W) -> Self {
        let mut table = [W::default(); 256];
        let mut i = 0usize;
        while i < 256 {
            let mut reg = W::from_u8(i as u8) << (W::BITS - 8);
            let mut bit = 0;
            while bit < 8 {
                reg = if (reg & W::TOP_BIT) != W::default() {
                    (reg << 1) ^ polynomial
                } else {
                    reg << 1
                };
                bit += 1;
            }
            table[i] = reg;
            i += 1;
        }
        Self {
            table,
            initial_value,
            final_xor,
        }
    }

    /// Width of the postamble this processor produces, in bytes.
    pub const fn postamble_size(&self) -> usize {
        W::BYTES
    }

    /// Computes the checksum of `data`, applying the initial value and final
    /// XOR configured at construction.
    pub fn checksum(&self, data: &[u8]) -> W {
        let mut reg = self.initial_value;
        for &b in data {
            let index = (reg.high_byte() ^ b) as usize;
            reg = self.table[index] ^ (reg << 8);
        }
        reg ^ self.final_xor
    }

    /// Writes `value` to `out` as big-endian bytes. `out` must be at least
    /// [`Self::postamble_size`] bytes.
    pub fn to_be_bytes(value: W, out: &mut [u8]) {
        value.to_be_bytes_into(out);
    }

    /// Reads a big-endian register value from `bytes`, which must be at
    /// least [`Self::postamble_size`] bytes.
    pub fn from_be_bytes(bytes: &[u8]) -> W {
        W::from_be_bytes_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, xorout 0x0000.
    fn ccitt() -> CrcProcessor<u16> {
        CrcProcessor::new(0x1021, 0xFFFF, 0x0000)
    }

    #[test]
    fn matches_known_ccitt_false_check_value() {
        // The standard CRC-16/CCITT-FALSE check value for the ASCII string
        // "123456789".
        let crc = ccitt();
        assert_eq!(crc.checksum(b"123456789"), 0x29B1);
    }

    #[test]
    fn byte_conversion_round_trips() {
        let mut bytes = [0u8; 2];
        CrcProcessor::<u16>::to_be_bytes(0xABCD, &mut bytes);
        assert_eq!(bytes, [0xAB, 0xCD]);
        assert_eq!(CrcProcessor::<u16>::from_be_bytes(&bytes), 0xABCD);
    }

    #[test]
    fn single_bit_mutation_changes_the_checksum() {
        let crc = ccitt();
        let message = b"a transport layer frame";
        let original = crc.checksum(message);
        for byte_index in 0..message.len() {
            for bit in 0..8u8 {
                let mut mutated = *message;
                mutated[byte_index] ^= 1 << bit;
                assert_ne!(
                    crc.checksum(&mutated),
                    original,
                    "flipping bit {bit} of byte {byte_index} went undetected"
                );
            }
        }
    }

    #[test]
    fn residue_is_constant_across_messages() {
        let crc = ccitt();
        let residue_of = |message: &[u8]| {
            let checksum = crc.checksum(message);
            let mut crc_bytes = [0u8; 2];
            CrcProcessor::<u16>::to_be_bytes(checksum, &mut crc_bytes);
            let mut extended = message.to_vec();
            extended.extend_from_slice(&crc_bytes);
            crc.checksum(&extended) ^ crc.final_xor_for_test()
        };

        let a = residue_of(b"short");
        let b = residue_of(b"a rather longer message entirely");
        assert_eq!(a, b);
    }

    impl<W: CrcWidth> CrcProcessor<W> {
        fn final_xor_for_test(&self) -> W {
            self.final_xor
        }
    }

    #[test]
    fn crc8_and_crc32_widths_build_and_checksum() {
        let crc8 = CrcProcessor::<u8>::new(0x07, 0x00, 0x00);
        assert_eq!(crc8.postamble_size(), 1);
        let _ = crc8.checksum(b"abc");

        let crc32 = CrcProcessor::<u32>::new(0x04C11DB7, 0xFFFFFFFF, 0xFFFFFFFF);
        assert_eq!(crc32.postamble_size(), 4);
        let _ = crc32.checksum(b"abc");
    }
}
