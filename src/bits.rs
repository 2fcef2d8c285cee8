//! Variable-width bit packing.
//!
//! Values are written least-significant-bit first into consecutive bytes. A
//! value that does not fit into the free bits of the current byte is split:
//! its low bits fill the current byte and the rest carry into the next one.
//!
//! Widths of exactly 8 and 16 bits are stored as flat little-endian elements,
//! which is byte-identical to what the bit cursor produces for them.

use crate::{cursor::ByteReader, Error, Result};

/// Largest supported value width in bits.
pub const MAX_BIT_WIDTH: u8 = 32;

/// Number of bytes needed to hold `count` values of `bit_width` bits.
#[inline]
pub fn packed_len(count: usize, bit_width: u8) -> usize {
    (count * bit_width as usize).div_ceil(8)
}

fn check_width(bit_width: u8) -> Result<()> {
    if !(1..=MAX_BIT_WIDTH).contains(&bit_width) {
        return Err(Error::InvalidBitWidth(bit_width));
    }

    Ok(())
}

#[inline]
fn mask(bit_width: u32) -> u32 {
    if bit_width >= 32 {
        u32::MAX
    } else {
        (1 << bit_width) - 1
    }
}

/// Bit cursor writing into a zeroed byte region.
pub struct BitWriter<'a> {
    data: &'a mut [u8],
    byte: usize,
    bit: u32,
}

impl<'a> BitWriter<'a> {
    /// Creates a writer positioned at the first bit of `data`.
    ///
    /// `data` must be zeroed; bits are OR-ed into place.
    #[inline]
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            byte: 0,
            bit: 0,
        }
    }

    /// Appends the low `bit_width` bits of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `bit_width` exceeds [`MAX_BIT_WIDTH`] or the region is too
    /// small to hold the bits.
    #[inline]
    pub fn write_bits(&mut self, value: u32, bit_width: u8) {
        assert!(bit_width <= MAX_BIT_WIDTH, "bit width {bit_width} exceeds 32");

        let mut value = value & mask(bit_width as u32);
        let mut left = bit_width as u32;

        while left > 0 {
            let take = left.min(8 - self.bit);
            self.data[self.byte] |= ((value & mask(take)) << self.bit) as u8;

            value >>= take;
            left -= take;
            self.bit += take;

            if self.bit == 8 {
                self.bit = 0;
                self.byte += 1;
            }
        }
    }

}

/// Bit cursor reading from a byte region written by [`BitWriter`].
pub struct BitReader<'a> {
    data: &'a [u8],
    byte: usize,
    bit: u32,
}

impl<'a> BitReader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte: 0,
            bit: 0,
        }
    }

    /// Reads the next `bit_width` bits as an unsigned value.
    ///
    /// # Panics
    ///
    /// Panics if `bit_width` exceeds [`MAX_BIT_WIDTH`] or the region ends
    /// before `bit_width` bits were read.
    #[inline]
    pub fn read_bits(&mut self, bit_width: u8) -> u32 {
        assert!(bit_width <= MAX_BIT_WIDTH, "bit width {bit_width} exceeds 32");

        let mut value = 0u32;
        let mut filled = 0u32;
        let bit_width = bit_width as u32;

        while filled < bit_width {
            let take = (bit_width - filled).min(8 - self.bit);
            let bits = (self.data[self.byte] as u32 >> self.bit) & mask(take);
            value |= bits << filled;

            filled += take;
            self.bit += take;

            if self.bit == 8 {
                self.bit = 0;
                self.byte += 1;
            }
        }

        value & mask(bit_width)
    }
}

/// Packs `values` into `ceil(values.len() * bit_width / 8)` bytes.
///
/// Only the low `bit_width` bits of each value are kept; the final byte is
/// zero padded. Fails with [`Error::InvalidBitWidth`] unless `bit_width` is
/// between 1 and [`MAX_BIT_WIDTH`].
pub fn pack(values: &[u32], bit_width: u8) -> Result<Vec<u8>> {
    let mut packed = vec![0; packed_len(values.len(), bit_width)];
    pack_into(&mut packed, values.iter().copied(), bit_width)?;
    Ok(packed)
}

/// Packs `values` into a zeroed region large enough to hold them.
///
/// # Panics
///
/// Panics if the region is too small to hold the values.
pub fn pack_into(
    region: &mut [u8],
    values: impl IntoIterator<Item = u32>,
    bit_width: u8,
) -> Result<()> {
    check_width(bit_width)?;

    match bit_width {
        8 => region
            .iter_mut()
            .zip(values)
            .for_each(|(byte, value)| *byte = value as u8),
        16 => region
            .chunks_exact_mut(2)
            .zip(values)
            .for_each(|(pair, value)| pair.copy_from_slice(&(value as u16).to_le_bytes())),
        _ => {
            let mut writer = BitWriter::new(region);
            values
                .into_iter()
                .for_each(|value| writer.write_bits(value, bit_width));
        }
    }

    Ok(())
}

/// Unpacks `count` values of `bit_width` bits.
///
/// Fails with [`Error::TruncatedInput`] when `bytes` holds fewer than
/// [`packed_len`] bytes, and with [`Error::InvalidBitWidth`] for widths outside
/// 1 to [`MAX_BIT_WIDTH`].
pub fn unpack(bytes: &[u8], count: usize, bit_width: u8) -> Result<Vec<u32>> {
    check_width(bit_width)?;
    let region = ByteReader::new(bytes).take(packed_len(count, bit_width))?;

    let values = match bit_width {
        8 => region.iter().map(|&byte| byte as u32).collect(),
        16 => region
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]) as u32)
            .collect(),
        _ => {
            let mut reader = BitReader::new(region);
            (0..count).map(|_| reader.read_bits(bit_width)).collect()
        }
    };

    Ok(values)
}
