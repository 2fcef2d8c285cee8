//! Per tile statistics.
//!
//! A tile's residual width is derived from the range of its samples. While
//! scanning for that range the tile is staged into a contiguous buffer, so the
//! packing pass that follows reads one small block instead of scattered rows.

use crate::{sample::Sample, TileExtent};

/// Number of bits needed to represent `value`, zero for zero.
#[inline]
pub fn bit_length(value: u32) -> u8 {
    (u32::BITS - value.leading_zeros()) as u8
}

/// Residual width for a sample range of `max - min`.
///
/// At least one bit is always allocated.
#[inline]
pub fn tile_bpp(range: u32) -> u8 {
    bit_length(range).max(1)
}

/// Smallest and largest sample of one channel within a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileStats<S> {
    pub min: S,
    pub max: S,
}

impl<S: Sample> TileStats<S> {
    /// Statistics of an empty tile, ready to [`observe`](Self::observe) samples.
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: S::MAX,
            max: S::default(),
        }
    }

    #[inline]
    pub fn observe(&mut self, sample: S) {
        self.min = self.min.min(sample);
        self.max = self.max.max(sample);
    }

    #[inline]
    pub fn range(&self) -> u32 {
        self.max.to_u32() - self.min.to_u32()
    }

    #[inline]
    pub fn tile_bpp(&self) -> u8 {
        tile_bpp(self.range())
    }

    #[inline]
    pub fn all_equal(&self) -> bool {
        self.min == self.max
    }
}

/// A tile copied out of the source image, together with its channel statistics.
///
/// Samples keep the channel-interleaved layout of the source, with rows
/// `tile_size` pixels apart regardless of clipping.
pub struct TileStage<S> {
    tile_size: usize,
    channels: usize,
    extent: TileExtent,
    pixels: Vec<S>,
    stats: Vec<TileStats<S>>,
}

impl<S: Sample> TileStage<S> {
    pub fn new(tile_size: usize, channels: usize) -> Self {
        Self {
            tile_size,
            channels,
            extent: TileExtent {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            },
            pixels: vec![S::default(); tile_size * tile_size * channels],
            stats: vec![TileStats::empty(); channels],
        }
    }

    /// Copies the valid pixels of `extent` out of `image` and scans their range.
    ///
    /// `image` is a little-endian native sample buffer `width` pixels wide.
    pub fn load(&mut self, image: &[u8], width: usize, extent: TileExtent) {
        debug_assert!(extent.width <= self.tile_size && extent.height <= self.tile_size);

        let channels = self.channels;
        let row_len = extent.width * channels;

        self.extent = extent;
        self.stats.fill(TileStats::empty());

        for yy in 0..extent.height {
            let source = ((extent.y + yy) * width + extent.x) * channels;
            let staged = yy * self.tile_size * channels;

            for (i, pixel) in self.pixels[staged..staged + row_len].iter_mut().enumerate() {
                *pixel = S::read_le(image, source + i);
                self.stats[i % channels].observe(*pixel);
            }
        }
    }

    #[inline]
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    #[inline]
    pub fn stats(&self, channel: usize) -> TileStats<S> {
        self.stats[channel]
    }

    /// Valid samples of `channel` in row-major order.
    pub fn samples(&self, channel: usize) -> impl Iterator<Item = S> + '_ {
        let TileExtent { width, height, .. } = self.extent;
        let stride = self.tile_size * self.channels;

        (0..height).flat_map(move |yy| {
            self.pixels[yy * stride..]
                .iter()
                .skip(channel)
                .step_by(self.channels)
                .take(width)
                .copied()
        })
    }
}
