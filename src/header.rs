use crate::{cursor::ByteReader, Descriptor, Error, Result, HEADER_SIZE};

const MASK_6BIT: u16 = 0b0011_1111;
const MASK_4BIT: u16 = 0b0000_1111;

const TILE_SIZE_SHIFT: u16 = 6;
const CHANNELS_SHIFT: u16 = 12;

/// Packs bit depth, tile size and channel count into the 16 bit format field.
///
/// Each value is stored minus one: 6 bits of depth, 6 bits of tile size, 4 bits
/// of channels.
#[inline]
pub(crate) fn pack_format(bit_depth: u8, tile_size: u8, channels: u8) -> u16 {
    ((bit_depth as u16 - 1) & MASK_6BIT)
        | (((tile_size as u16 - 1) & MASK_6BIT) << TILE_SIZE_SHIFT)
        | (((channels as u16 - 1) & MASK_4BIT) << CHANNELS_SHIFT)
}

/// Inverse of [`pack_format`], returning `(bit_depth, tile_size, channels)`.
#[inline]
pub(crate) fn unpack_format(format: u16) -> (u8, u8, u8) {
    (
        ((format & MASK_6BIT) + 1) as u8,
        (((format >> TILE_SIZE_SHIFT) & MASK_6BIT) + 1) as u8,
        (((format >> CHANNELS_SHIFT) & MASK_4BIT) + 1) as u8,
    )
}

impl Descriptor {
    /// Serializes the descriptor into the fixed size stream prefix.
    pub fn encode_header(&self) -> Result<[u8; HEADER_SIZE]> {
        self.validate()?;

        let mut header = [0; HEADER_SIZE];
        header[0..4].copy_from_slice(&self.width.to_le_bytes());
        header[4..8].copy_from_slice(&self.height.to_le_bytes());
        header[8..10].copy_from_slice(
            &pack_format(self.bit_depth, self.tile_size, self.channels).to_le_bytes(),
        );

        Ok(header)
    }

    /// Parses the descriptor from the start of an encoded image.
    ///
    /// Only the header is inspected, so this can be used to probe an image
    /// before committing to decode it.
    pub fn decode_header(encoded: &[u8]) -> Result<Self> {
        Self::read_header(&mut ByteReader::new(encoded))
    }

    pub(crate) fn read_header(encoded: &mut ByteReader) -> Result<Self> {
        let width = encoded.read_u32()?;
        let height = encoded.read_u32()?;
        let (bit_depth, tile_size, channels) = unpack_format(encoded.read_u16()?);

        if width == 0 || height == 0 {
            return Err(Error::InvalidHeader("image has no pixels"));
        }

        if tile_size < crate::MIN_TILE_SIZE {
            return Err(Error::InvalidHeader("tile size is smaller than 4"));
        }

        if bit_depth > crate::MAX_BIT_DEPTH {
            return Err(Error::UnsupportedBitDepth(bit_depth));
        }

        Ok(Descriptor {
            width,
            height,
            channels,
            bit_depth,
            tile_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_field_packs_values_minus_one() {
        let format = pack_format(16, 8, 3);
        assert_eq!(format & MASK_6BIT, 15);
        assert_eq!((format >> TILE_SIZE_SHIFT) & MASK_6BIT, 7);
        assert_eq!(format >> CHANNELS_SHIFT, 2);
        assert_eq!(unpack_format(format), (16, 8, 3));
    }

    #[test]
    fn format_field_covers_full_ranges() {
        assert_eq!(unpack_format(pack_format(64, 64, 16)), (64, 64, 16));
        assert_eq!(unpack_format(pack_format(1, 1, 1)), (1, 1, 1));
        assert_eq!(pack_format(64, 64, 16), u16::MAX);
        assert_eq!(pack_format(1, 1, 1), 0);
    }

    #[test]
    fn header_layout_is_little_endian() {
        let descriptor = Descriptor {
            width: 0x0102_0304,
            height: 7,
            channels: 3,
            bit_depth: 16,
            tile_size: 8,
        };

        let header = descriptor.encode_header().unwrap();
        assert_eq!(header, [0x04, 0x03, 0x02, 0x01, 7, 0, 0, 0, 0xCF, 0x21]);
        assert_eq!(Descriptor::decode_header(&header).unwrap(), descriptor);
    }

    #[test]
    fn rejects_small_tile_size() {
        let mut header = [0u8; HEADER_SIZE];
        header[0] = 4;
        header[4] = 4;
        header[8..10].copy_from_slice(&pack_format(8, 3, 1).to_le_bytes());

        assert!(matches!(
            Descriptor::decode_header(&header),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn rejects_empty_image() {
        let mut header = [0u8; HEADER_SIZE];
        header[4] = 4;
        header[8..10].copy_from_slice(&pack_format(8, 4, 1).to_le_bytes());

        assert!(matches!(
            Descriptor::decode_header(&header),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn rejects_wide_bit_depth() {
        let mut header = [0u8; HEADER_SIZE];
        header[0] = 4;
        header[4] = 4;
        header[8..10].copy_from_slice(&pack_format(24, 4, 1).to_le_bytes());

        assert!(matches!(
            Descriptor::decode_header(&header),
            Err(Error::UnsupportedBitDepth(24))
        ));
    }

    #[test]
    fn rejects_short_header() {
        assert!(matches!(
            Descriptor::decode_header(&[0; 9]),
            Err(Error::TruncatedInput { offset: 8, .. })
        ));
    }
}
