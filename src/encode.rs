use crate::{
    bits::BitWriter,
    block::{BlockKind, Metadata},
    sample::Sample,
    stats::TileStage,
    telemetry::{BlockCounts, Report},
    tile::TileGrid,
    Descriptor, Error, Result, SampleWidth, Settings, HEADER_SIZE,
};
use std::{fs, path::Path, time::Instant};

impl Descriptor {
    /// Encodes an image from a pixel slice into a file.
    #[inline]
    pub fn encode_file<P: AsRef<Path>>(&self, path: P, pixels: &[u8]) -> Result<()> {
        let encoded = self.encode_alloc(pixels)?;
        fs::write(path, encoded)?;
        Ok(())
    }

    /// Encodes an image from a pixel slice into a newly allocated `Vec`.
    #[inline]
    pub fn encode_alloc(&self, pixels: &[u8]) -> Result<Vec<u8>> {
        self.encode_with(pixels, &Settings::default())
    }

    /// Encodes an image from a pixel slice with explicit settings.
    pub fn encode_with(&self, pixels: &[u8], settings: &Settings) -> Result<Vec<u8>> {
        let start = Instant::now();

        let header = self.encode_header()?;
        settings.limits.check(self)?;

        let expected = self.image_size()?;
        if pixels.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let block_count = self.block_count()?;
        let mut encoded = Vec::with_capacity(HEADER_SIZE + expected + block_count * 3);
        encoded.extend_from_slice(&header);

        let blocks = match self.sample_width()? {
            SampleWidth::U8 => encode::<u8>(&mut encoded, self, pixels, settings.parallel),
            SampleWidth::U16 => encode::<u16>(&mut encoded, self, pixels, settings.parallel),
        };

        let report = Report {
            descriptor: *self,
            elapsed: start.elapsed(),
            raw_bytes: expected,
            encoded_bytes: encoded.len(),
            blocks,
        };
        tracing::debug!(
            raw_bytes = report.raw_bytes,
            encoded_bytes = report.encoded_bytes,
            uniform = blocks.uniform,
            flat = blocks.flat,
            packed = blocks.packed,
            "encoded {}x{} image",
            self.width,
            self.height
        );
        settings.telemetry.compressed(&report);

        Ok(encoded)
    }
}

fn encode<S: Sample>(
    encoded: &mut Vec<u8>,
    descriptor: &Descriptor,
    pixels: &[u8],
    parallel: bool,
) -> BlockCounts {
    let pixels = Pixels {
        grid: descriptor.grid(),
        channels: descriptor.channels as usize,
        data: pixels,
    };

    if parallel && pixels.grid.rows() > 1 {
        encode_parallel::<S>(encoded, &pixels)
    } else {
        encode_sequential::<S>(encoded, &pixels)
    }
}

fn encode_sequential<S: Sample>(encoded: &mut Vec<u8>, pixels: &Pixels) -> BlockCounts {
    let mut stage = TileStage::new(pixels.grid.tile_size, pixels.channels);
    let mut blocks = BlockCounts::default();

    for row in 0..pixels.grid.rows() {
        blocks.merge(encode_row::<S>(encoded, &mut stage, pixels, row));
    }

    blocks
}

/// Encodes every tile row on its own and concatenates the rows in order.
///
/// Block sizes only depend on their own tile, so the output is identical to
/// the sequential encoder.
#[cfg(feature = "parallel")]
fn encode_parallel<S: Sample>(encoded: &mut Vec<u8>, pixels: &Pixels) -> BlockCounts {
    use rayon::prelude::*;

    let rows: Vec<(Vec<u8>, BlockCounts)> = (0..pixels.grid.rows())
        .into_par_iter()
        .map_init(
            || TileStage::<S>::new(pixels.grid.tile_size, pixels.channels),
            |stage, row| {
                let mut encoded = Vec::new();
                let blocks = encode_row(&mut encoded, stage, pixels, row);
                (encoded, blocks)
            },
        )
        .collect();

    let mut blocks = BlockCounts::default();
    for (row, row_blocks) in rows {
        encoded.extend_from_slice(&row);
        blocks.merge(row_blocks);
    }

    blocks
}

#[cfg(not(feature = "parallel"))]
#[inline]
fn encode_parallel<S: Sample>(encoded: &mut Vec<u8>, pixels: &Pixels) -> BlockCounts {
    encode_sequential::<S>(encoded, pixels)
}

fn encode_row<S: Sample>(
    encoded: &mut Vec<u8>,
    stage: &mut TileStage<S>,
    pixels: &Pixels,
    row: usize,
) -> BlockCounts {
    let mut blocks = BlockCounts::default();

    for extent in pixels.grid.row(row) {
        stage.load(pixels.data, pixels.grid.width, extent);

        for channel in 0..pixels.channels {
            blocks.record(encode_block(encoded, stage, channel));
        }
    }

    blocks
}

/// Appends the block of one channel of the staged tile.
pub(crate) fn encode_block<S: Sample>(
    encoded: &mut Vec<u8>,
    stage: &TileStage<S>,
    channel: usize,
) -> BlockKind {
    let stats = stage.stats(channel);
    let metadata = Metadata {
        tile_bpp: stats.tile_bpp(),
        all_equal: stats.all_equal(),
    };

    encoded.push(metadata.to_byte());

    if metadata.has_anchor(S::BITS) {
        let index = encoded.len();
        encoded.resize(index + S::SIZE, 0);
        stats.min.write_le(&mut encoded[index..], 0);
    }

    let kind = BlockKind::of(metadata, S::BITS);
    if kind == BlockKind::Uniform {
        return kind;
    }

    let start = encoded.len();
    encoded.resize(start + metadata.residual_len(stage.tile_size()), 0);
    let residuals = &mut encoded[start..];

    if kind == BlockKind::Flat {
        stage
            .samples(channel)
            .enumerate()
            .for_each(|(i, sample)| sample.write_le(residuals, i));
    } else {
        let min = stats.min.to_u32();
        let mut bits = BitWriter::new(residuals);
        stage
            .samples(channel)
            .for_each(|sample| bits.write_bits(sample.to_u32() - min, metadata.tile_bpp));
    }

    kind
}

/// The source image, addressed by tiles.
struct Pixels<'a> {
    grid: TileGrid,
    channels: usize,
    data: &'a [u8],
}
