use crate::{
    bits::BitReader,
    block::{BlockKind, Metadata},
    cursor::ByteReader,
    sample::Sample,
    telemetry::{BlockCounts, Report},
    Descriptor, Error, Result, SampleWidth, Settings, TileExtent, HEADER_SIZE,
};
use std::{fs, marker::PhantomData, path::Path, time::Instant};

impl Descriptor {
    /// Decodes an image from a file into a newly allocated `Vec`.
    #[inline]
    pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<u8>)> {
        let encoded = fs::read(path)?;
        Self::decode_alloc(&encoded)
    }

    /// Decodes an image from a byte slice into a newly allocated `Vec`.
    #[inline]
    pub fn decode_alloc(encoded: &[u8]) -> Result<(Self, Vec<u8>)> {
        Self::decode_with(encoded, &Settings::default())
    }

    /// Decodes an image from a byte slice into a newly allocated `Vec` with explicit settings.
    ///
    /// No buffer is returned unless the whole image decoded.
    pub fn decode_with(encoded: &[u8], settings: &Settings) -> Result<(Self, Vec<u8>)> {
        let start = Instant::now();

        let descriptor = Self::decode_header(encoded)?;
        settings.limits.check(&descriptor)?;
        descriptor.check_body_len(encoded.len())?;

        let mut decoded = vec![0; descriptor.image_size()?];
        let blocks = descriptor.decode_body(encoded, &mut decoded)?;

        let report = Report {
            descriptor,
            elapsed: start.elapsed(),
            raw_bytes: decoded.len(),
            encoded_bytes: encoded.len(),
            blocks,
        };
        tracing::debug!(
            raw_bytes = report.raw_bytes,
            encoded_bytes = report.encoded_bytes,
            "decoded {}x{} image",
            descriptor.width,
            descriptor.height
        );
        settings.telemetry.decompressed(&report);

        Ok((descriptor, decoded))
    }

    /// Decodes an image from a byte slice into the `decoded` slice.
    ///
    /// `decoded` must hold exactly [`Descriptor::image_size`] bytes. Its
    /// contents are unspecified when an error is returned.
    pub fn decode_into(encoded: &[u8], decoded: &mut [u8]) -> Result<Self> {
        let descriptor = Self::decode_header(encoded)?;
        descriptor.check_body_len(encoded.len())?;

        let expected = descriptor.image_size()?;
        if decoded.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: decoded.len(),
            });
        }

        descriptor.decode_body(encoded, decoded)?;

        Ok(descriptor)
    }

    /// Every block starts with a metadata byte, so shorter input can be
    /// rejected before allocating the output.
    fn check_body_len(&self, encoded_len: usize) -> Result<()> {
        let available = encoded_len.saturating_sub(HEADER_SIZE);
        let needed = self.block_count()?;

        if available < needed {
            return Err(Error::TruncatedInput {
                offset: HEADER_SIZE,
                needed,
                available,
            });
        }

        Ok(())
    }

    fn decode_body(&self, encoded: &[u8], decoded: &mut [u8]) -> Result<BlockCounts> {
        let mut encoded = ByteReader::new(encoded);
        encoded.take(HEADER_SIZE)?;

        match self.sample_width()? {
            SampleWidth::U8 => decode::<u8>(&mut encoded, &mut Decoded::new(self, decoded), self),
            SampleWidth::U16 => decode::<u16>(&mut encoded, &mut Decoded::new(self, decoded), self),
        }
    }
}

fn decode<S: Sample>(
    encoded: &mut ByteReader,
    decoded: &mut Decoded<S>,
    descriptor: &Descriptor,
) -> Result<BlockCounts> {
    let tile_size = descriptor.tile_size as usize;
    let mut blocks = BlockCounts::default();

    for extent in descriptor.grid().tiles() {
        for channel in 0..descriptor.channels as usize {
            blocks.record(decode_block(encoded, decoded, extent, channel, tile_size)?);
        }
    }

    Ok(blocks)
}

/// Reads one block and writes its samples into the tile `extent` of `channel`.
pub(crate) fn decode_block<S: Sample>(
    encoded: &mut ByteReader,
    decoded: &mut Decoded<S>,
    extent: TileExtent,
    channel: usize,
    tile_size: usize,
) -> Result<BlockKind> {
    let offset = encoded.offset();
    let metadata = Metadata::from_byte(encoded.read_u8()?);

    if !metadata.all_equal && metadata.tile_bpp > S::BITS {
        return Err(Error::InvalidTileMetadata {
            offset,
            tile_bpp: metadata.tile_bpp,
        });
    }

    let min = if metadata.has_anchor(S::BITS) {
        encoded.read_sample::<S>()?
    } else {
        S::default()
    };

    let kind = BlockKind::of(metadata, S::BITS);
    let residuals = encoded.take(metadata.residual_len(tile_size))?;

    match kind {
        BlockKind::Uniform => decoded.fill(extent, channel, |_| min),
        BlockKind::Flat => decoded.fill(extent, channel, |i| S::read_le(residuals, i)),
        BlockKind::Packed => {
            let mut bits = BitReader::new(residuals);
            let min = min.to_u32();
            decoded.fill(extent, channel, |_| {
                S::from_u32(min.wrapping_add(bits.read_bits(metadata.tile_bpp)))
            });
        }
    }

    Ok(kind)
}

/// The output image, written tile by tile.
pub(crate) struct Decoded<'a, S> {
    width: usize,
    channels: usize,
    data: &'a mut [u8],
    sample: PhantomData<S>,
}

impl<'a, S: Sample> Decoded<'a, S> {
    #[inline]
    pub fn new(descriptor: &Descriptor, data: &'a mut [u8]) -> Self {
        Self {
            width: descriptor.width as usize,
            channels: descriptor.channels as usize,
            data,
            sample: PhantomData,
        }
    }

    /// Sets every valid sample of `channel` in `extent`, in row-major order.
    ///
    /// `sample` receives the index of the pixel within the tile.
    #[inline]
    fn fill(&mut self, extent: TileExtent, channel: usize, mut sample: impl FnMut(usize) -> S) {
        let mut i = 0;

        for y in extent.y..extent.y + extent.height {
            let row = (y * self.width + extent.x) * self.channels + channel;

            for x in 0..extent.width {
                sample(i).write_le(self.data, row + x * self.channels);
                i += 1;
            }
        }
    }
}
