//! Layout rules of a tile-channel block.
//!
//! ```text
//! metadata (1 byte):
//!   bits 0..6  tile_bpp - 1
//!   bit  6     all samples equal
//!   bit  7     reserved for temporal frames, always 0
//! anchor:    minimum sample, native width, see `has_anchor`
//! residuals: ceil(tile_size^2 * tile_bpp / 8) bytes unless all samples are equal
//! ```
//!
//! Neither the anchor nor the residual length is stored; both directions derive
//! them from the metadata alone.

use crate::bits::packed_len;

const MASK_6BIT: u8 = 0b0011_1111;
const ALL_EQUAL: u8 = 0b0100_0000;

/// Decoded metadata byte of a tile-channel block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Metadata {
    pub tile_bpp: u8,
    pub all_equal: bool,
}

impl Metadata {
    #[inline]
    pub fn to_byte(self) -> u8 {
        debug_assert!((1..=64).contains(&self.tile_bpp));

        let all_equal = if self.all_equal { ALL_EQUAL } else { 0 };

        ((self.tile_bpp - 1) & MASK_6BIT) | all_equal
    }

    /// The temporal bit is ignored.
    #[inline]
    pub fn from_byte(byte: u8) -> Self {
        Self {
            tile_bpp: (byte & MASK_6BIT) + 1,
            all_equal: byte & ALL_EQUAL != 0,
        }
    }

    /// Whether the minimum sample follows the metadata byte.
    ///
    /// Blocks using the full sample width store raw samples and need no anchor,
    /// unless they store no samples at all.
    #[inline]
    pub fn has_anchor(self, sample_bits: u8) -> bool {
        self.all_equal || self.tile_bpp != sample_bits
    }

    /// Whether residuals are raw samples rather than differences to the anchor.
    #[inline]
    pub fn is_flat(self, sample_bits: u8) -> bool {
        self.tile_bpp == sample_bits
    }

    /// Bytes reserved for the residuals of a full square tile.
    ///
    /// Edge tiles reserve the same amount even though they hold fewer pixels.
    #[inline]
    pub fn residual_len(self, tile_size: usize) -> usize {
        if self.all_equal {
            0
        } else {
            packed_len(tile_size * tile_size, self.tile_bpp)
        }
    }
}

/// How a tile-channel block stores its samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Every sample equals the anchor; no residuals follow.
    Uniform,
    /// Residuals are raw samples at the native width.
    Flat,
    /// Residuals are bit-packed differences to the anchor.
    Packed,
}

impl BlockKind {
    #[inline]
    pub(crate) fn of(metadata: Metadata, sample_bits: u8) -> Self {
        if metadata.all_equal {
            BlockKind::Uniform
        } else if metadata.is_flat(sample_bits) {
            BlockKind::Flat
        } else {
            BlockKind::Packed
        }
    }
}
