//! Lossless, tile-adaptive image codec.
//!
//! The image is split into square tiles. For every tile and channel the codec
//! stores the smallest sample and packs the differences to it with just as many
//! bits as the tile's sample range requires.
//!
//! ```text
//! offset 0   width              u32 LE
//! offset 4   height             u32 LE
//! offset 8   format             u16 LE: bit_depth-1 (6 bits), tile_size-1 (6 bits),
//!                                        channels-1 (4 bits)
//! offset 10  tile-channel blocks, tiles in row-major order, channels in order
//! ```
//!
//! Pixels are a flat, row-major, channel-interleaved buffer of native samples:
//! one byte per sample up to 8 bits per channel, two little-endian bytes up to
//! 16.
//!
//! ```
//! let pixels: Vec<u8> = (0..16).map(|i| (i / 4 * 10) as u8).collect();
//!
//! let encoded = roaster::compress(&pixels, 4, 4, 1, 8, 4).unwrap();
//! let (descriptor, decoded) = roaster::decompress(&encoded).unwrap();
//!
//! assert_eq!(descriptor.width, 4);
//! assert_eq!(decoded, pixels);
//! ```

pub use block::BlockKind;
pub use compare::{compare, Mismatch};
pub use config::{Limits, Settings};
pub use error::{Error, Result};
pub use sample::{Sample, SampleWidth};
pub use telemetry::{BlockCounts, NoTelemetry, Report, Telemetry, TracingTelemetry};
pub use tile::TileExtent;

pub mod bits;
pub mod decode;
pub mod encode;
pub mod pnm;
pub mod stats;

mod block;
mod compare;
mod config;
mod cursor;
mod error;
mod header;
mod sample;
mod telemetry;
mod tile;

/// Size of the encoded header in bytes.
pub const HEADER_SIZE: usize = 10;

pub const MIN_TILE_SIZE: u8 = 4;
pub const MAX_TILE_SIZE: u8 = 64;
pub const MAX_CHANNELS: u8 = 16;
pub const MAX_BIT_DEPTH: u8 = 16;

/// The descriptor of a roaster image.
///
/// This value is parsed from the image header during decoding or is specified for encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Descriptor {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    /// Significant bits per channel, selecting the native sample width.
    pub bit_depth: u8,
    /// Edge length of the square tiles.
    pub tile_size: u8,
}

impl Descriptor {
    /// Checks every field against the ranges the format supports.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            return Err(Error::UnsupportedChannelCount(self.channels));
        }

        if !(MIN_TILE_SIZE..=MAX_TILE_SIZE).contains(&self.tile_size) {
            return Err(Error::UnsupportedTileSize(self.tile_size));
        }

        SampleWidth::for_bit_depth(self.bit_depth)?;

        Ok(())
    }

    /// Returns the in-memory width of the samples.
    #[inline]
    pub fn sample_width(&self) -> Result<SampleWidth> {
        SampleWidth::for_bit_depth(self.bit_depth)
    }

    /// Returns the number of samples of the decoded image.
    #[inline]
    pub fn sample_count(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(self.channels as usize))
            .ok_or(Error::ImageTooLarge)
    }

    /// Returns the size of the decoded image in bytes.
    #[inline]
    pub fn image_size(&self) -> Result<usize> {
        self.sample_count()?
            .checked_mul(self.sample_width()?.bytes())
            .ok_or(Error::ImageTooLarge)
    }

    /// Returns the number of tile-channel blocks in the encoded image.
    #[inline]
    pub fn block_count(&self) -> Result<usize> {
        let grid = self.grid();

        grid.columns()
            .checked_mul(grid.rows())
            .and_then(|tiles| tiles.checked_mul(self.channels as usize))
            .ok_or(Error::ImageTooLarge)
    }

    #[inline]
    pub(crate) fn grid(&self) -> tile::TileGrid {
        tile::TileGrid {
            width: self.width as usize,
            height: self.height as usize,
            tile_size: self.tile_size.max(1) as usize,
        }
    }
}

/// Compresses a native pixel buffer.
///
/// `pixels` holds `width * height * channels` samples, one byte each when
/// `bit_depth <= 8` and two little-endian bytes each otherwise.
pub fn compress(
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: u8,
    bit_depth: u8,
    tile_size: u8,
) -> Result<Vec<u8>> {
    Descriptor {
        width,
        height,
        channels,
        bit_depth,
        tile_size,
    }
    .encode_alloc(pixels)
}

/// Decompresses an encoded image into its descriptor and native pixel buffer.
pub fn decompress(encoded: &[u8]) -> Result<(Descriptor, Vec<u8>)> {
    Descriptor::decode_alloc(encoded)
}

/// Serializes the fixed size header of an image.
pub fn encode_header(
    width: u32,
    height: u32,
    bit_depth: u8,
    tile_size: u8,
    channels: u8,
) -> Result<[u8; HEADER_SIZE]> {
    Descriptor {
        width,
        height,
        channels,
        bit_depth,
        tile_size,
    }
    .encode_header()
}

/// Parses the fixed size header of an encoded image.
pub fn decode_header(encoded: &[u8]) -> Result<Descriptor> {
    Descriptor::decode_header(encoded)
}
