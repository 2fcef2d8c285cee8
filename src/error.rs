use thiserror::Error;

/// Errors that may occur while encoding or decoding a roaster image.
#[derive(Error, Debug)]
pub enum Error {
    /// The encoded header describes an image the format can not contain.
    #[error("invalid header: {0}")]
    InvalidHeader(&'static str),
    /// The encoded data ends before the next field could be read.
    #[error("truncated input at byte {offset}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// The pixel buffer does not match the size implied by the descriptor.
    #[error("pixel buffer holds {actual} bytes, descriptor requires {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
    /// Only bit depths of 1 to 16 bits per channel are supported.
    #[error("unsupported bit depth {0} (supported: 1 to 16)")]
    UnsupportedBitDepth(u8),
    /// Tiles must be between 4 and 64 pixels wide.
    #[error("unsupported tile size {0} (supported: 4 to 64)")]
    UnsupportedTileSize(u8),
    /// Images carry between 1 and 16 channels.
    #[error("unsupported channel count {0} (supported: 1 to 16)")]
    UnsupportedChannelCount(u8),
    /// Width and height must both be non-zero.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// A tile-channel block declares a residual width the sample type can not hold.
    #[error("invalid tile metadata at byte {offset}: residual width {tile_bpp} too wide")]
    InvalidTileMetadata { offset: usize, tile_bpp: u8 },
    /// Bit packing supports value widths of 1 to 32 bits.
    #[error("unsupported bit width {0} (supported: 1 to 32)")]
    InvalidBitWidth(u8),
    /// The image exceeds the configured pixel budget.
    #[error("image has {pixels} pixels, limit is {max_pixels}")]
    LimitExceeded { pixels: u64, max_pixels: u64 },
    /// The image size does not fit into addressable memory.
    #[error("image is too large to address")]
    ImageTooLarge,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
