//! Native sample types.
//!
//! Pixels live in a flat byte buffer; samples wider than one byte are stored
//! little-endian. The engines are written once over [`Sample`] and the width is
//! picked at runtime through [`SampleWidth`].

use crate::{Error, Result};

/// An unsigned sample type used for in-memory pixel storage.
pub trait Sample: Copy + Ord + Default + Send + Sync + 'static {
    /// Width of the sample in bits.
    const BITS: u8;
    /// Width of the sample in bytes.
    const SIZE: usize;
    /// Largest representable value.
    const MAX: Self;

    /// Reads the `index`-th sample from a little-endian byte buffer.
    fn read_le(bytes: &[u8], index: usize) -> Self;

    /// Writes the sample into the `index`-th slot of a little-endian byte buffer.
    fn write_le(self, bytes: &mut [u8], index: usize);

    fn to_u32(self) -> u32;

    /// Truncates `value` to the sample width.
    fn from_u32(value: u32) -> Self;
}

impl Sample for u8 {
    const BITS: u8 = 8;
    const SIZE: usize = 1;
    const MAX: Self = u8::MAX;

    #[inline]
    fn read_le(bytes: &[u8], index: usize) -> Self {
        bytes[index]
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8], index: usize) {
        bytes[index] = self;
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn from_u32(value: u32) -> Self {
        value as u8
    }
}

impl Sample for u16 {
    const BITS: u8 = 16;
    const SIZE: usize = 2;
    const MAX: Self = u16::MAX;

    #[inline]
    fn read_le(bytes: &[u8], index: usize) -> Self {
        let index = index << 1;
        u16::from_le_bytes([bytes[index], bytes[index + 1]])
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8], index: usize) {
        let index = index << 1;
        bytes[index..index + 2].copy_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn from_u32(value: u32) -> Self {
        value as u16
    }
}

/// The in-memory width of every sample of an image.
///
/// Fixed for the whole image by its bit depth: one byte up to 8 bits per
/// channel, two bytes up to 16.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleWidth {
    U8,
    U16,
}

impl SampleWidth {
    /// Selects the native sample width for a bit depth.
    pub fn for_bit_depth(bit_depth: u8) -> Result<Self> {
        match bit_depth {
            1..=8 => Ok(SampleWidth::U8),
            9..=16 => Ok(SampleWidth::U16),
            _ => Err(Error::UnsupportedBitDepth(bit_depth)),
        }
    }

    /// Size of one sample in bytes.
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::U8 => u8::SIZE,
            SampleWidth::U16 => u16::SIZE,
        }
    }

    /// Size of one sample in bits.
    #[inline]
    pub fn bits(self) -> u8 {
        match self {
            SampleWidth::U8 => <u8 as Sample>::BITS,
            SampleWidth::U16 => <u16 as Sample>::BITS,
        }
    }
}
