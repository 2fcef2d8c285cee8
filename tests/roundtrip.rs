//! Roundtrip tests for the codec.
//!
//! These tests verify that decompress(compress(pixels)) reproduces the pixel
//! buffer byte for byte, across sample widths, tile sizes and image shapes.

use roaster::{
    compress, decompress, Descriptor, Error, Limits, Report, Settings, Telemetry, HEADER_SIZE,
};
use std::cell::RefCell;

/// Simple deterministic RNG for reproducible test patterns
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn next_u16(&mut self) -> u16 {
        (self.next_u64() >> 48) as u16
    }
}

/// Generate test patterns as native sample values, before byte serialization
mod patterns {
    use super::SimpleRng;

    pub fn uniform(len: usize, value: u16) -> Vec<u16> {
        vec![value; len]
    }

    /// Diagonal gradient over `0..=max`
    pub fn gradient(width: usize, height: usize, channels: usize, max: u16) -> Vec<u16> {
        let span = ((width - 1) + (height - 1)).max(1);
        let mut data = Vec::with_capacity(width * height * channels);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push((((x + y) * max as usize) / span) as u16 ^ c as u16);
                }
            }
        }
        data
    }

    /// Checkerboard of zero and `max`
    pub fn checkerboard(
        width: usize,
        height: usize,
        channels: usize,
        block: usize,
        max: u16,
    ) -> Vec<u16> {
        let mut data = Vec::with_capacity(width * height * channels);
        for y in 0..height {
            for x in 0..width {
                let value = if (x / block + y / block) % 2 == 0 { max } else { 0 };
                data.extend(std::iter::repeat(value).take(channels));
            }
        }
        data
    }

    /// Random noise limited to `bits` bits (deterministic)
    pub fn noise(len: usize, bits: u8, seed: u64) -> Vec<u16> {
        let mut rng = SimpleRng::new(seed);
        (0..len).map(|_| rng.next_u16() >> (16 - bits)).collect()
    }

    /// Smooth values with small local differences
    pub fn ramp_noise(len: usize, seed: u64) -> Vec<u16> {
        let mut rng = SimpleRng::new(seed);
        (0..len)
            .map(|i| (i as u16).wrapping_mul(3).wrapping_add(rng.next_u16() % 5))
            .collect()
    }
}

/// Serializes samples into the native buffer layout for `bit_depth`.
fn native(samples: &[u16], bit_depth: u8) -> Vec<u8> {
    if bit_depth <= 8 {
        samples.iter().map(|&sample| sample as u8).collect()
    } else {
        samples.iter().flat_map(|sample| sample.to_le_bytes()).collect()
    }
}

fn assert_roundtrip(
    width: u32,
    height: u32,
    channels: u8,
    bit_depth: u8,
    tile_size: u8,
    samples: &[u16],
) {
    let pixels = native(samples, bit_depth);
    let encoded = compress(&pixels, width, height, channels, bit_depth, tile_size).unwrap();
    let (descriptor, decoded) = decompress(&encoded).unwrap();

    assert_eq!(
        descriptor,
        Descriptor {
            width,
            height,
            channels,
            bit_depth,
            tile_size
        }
    );
    assert!(
        decoded == pixels,
        "roundtrip failed for {width}x{height}x{channels} at {bit_depth} bits, tile {tile_size}"
    );
}

#[test]
fn roundtrip_all_tile_sizes() {
    for tile_size in [4, 8, 16, 32] {
        for (bit_depth, max) in [(8, 255), (16, u16::MAX)] {
            let (width, height) = (67, 45);
            let len = width * height;
            let inputs = [
                patterns::gradient(width, height, 1, max),
                patterns::noise(len, bit_depth, 7),
                patterns::checkerboard(width, height, 1, 5, max),
                patterns::uniform(len, max / 3),
            ];

            for samples in &inputs {
                assert_roundtrip(67, 45, 1, bit_depth, tile_size, samples);
            }
        }
    }
}

#[test]
fn roundtrip_multi_channel() {
    let (width, height) = (33, 17);

    for channels in [2u8, 3, 4, 16] {
        let len = width * height * channels as usize;
        let gradient = patterns::gradient(width, height, channels as usize, 255);
        let seed = channels as u64;

        assert_roundtrip(33, 17, channels, 8, 8, &gradient);
        assert_roundtrip(33, 17, channels, 8, 8, &patterns::noise(len, 8, seed));
        assert_roundtrip(33, 17, channels, 16, 16, &patterns::noise(len, 16, seed));
    }
}

#[test]
fn roundtrip_odd_bit_depths() {
    let len = 40 * 40 * 3;

    for bit_depth in [1, 4, 7, 10, 12, 15] {
        let samples = patterns::noise(len, bit_depth, bit_depth as u64);
        assert_roundtrip(40, 40, 3, bit_depth, 8, &samples);
    }
}

#[test]
fn roundtrip_smooth_data() {
    let len = 100 * 50;
    assert_roundtrip(100, 50, 1, 16, 16, &patterns::ramp_noise(len, 11));
}

#[test]
fn roundtrip_images_smaller_than_a_tile() {
    assert_roundtrip(1, 1, 1, 8, 4, &[42]);
    assert_roundtrip(3, 2, 2, 16, 64, &patterns::noise(12, 16, 3));
    assert_roundtrip(1, 9, 1, 8, 4, &patterns::noise(9, 8, 4));
}

#[test]
fn boundary_tiles_are_clipped() {
    assert_roundtrip(10, 10, 1, 8, 4, &patterns::noise(10 * 10, 8, 99));

    // every tile, clipped or not, spans the full range and is stored flat at 16 bytes
    let samples = patterns::checkerboard(10, 10, 1, 1, 255);
    assert_roundtrip(10, 10, 1, 8, 4, &samples);
    let encoded = compress(&native(&samples, 8), 10, 10, 1, 8, 4).unwrap();
    assert_eq!(encoded.len(), HEADER_SIZE + 9 * (1 + 16));
}

#[test]
fn four_by_four_gradient() {
    let pixels = [0, 0, 0, 0, 10, 10, 10, 10, 20, 20, 20, 20, 30, 30, 30, 30];
    let encoded = compress(&pixels, 4, 4, 1, 8, 4).unwrap();

    // header, metadata, anchor, 16 residuals at 5 bits
    assert_eq!(encoded.len(), HEADER_SIZE + 1 + 1 + 10);
    assert_eq!(encoded[HEADER_SIZE], 5 - 1);
    assert_eq!(encoded[HEADER_SIZE + 1], 0);

    let residuals: Vec<u32> = pixels.iter().map(|&pixel| pixel as u32).collect();
    assert_eq!(
        &encoded[HEADER_SIZE + 2..],
        &roaster::bits::pack(&residuals, 5).unwrap()[..]
    );
    // rows 0, 10, 20, 30 at 5 bits, low bits first
    assert_eq!(
        &encoded[HEADER_SIZE + 2..],
        &[0x00, 0x00, 0xA0, 0x94, 0x52, 0x94, 0x52, 0xEA, 0xBD, 0xF7]
    );

    let (_, decoded) = decompress(&encoded).unwrap();
    assert_eq!(decoded, pixels);
}

#[test]
fn uniform_image_is_anchor_only() {
    let pixels = native(&patterns::uniform(16 * 16, 1234), 16);
    let encoded = compress(&pixels, 16, 16, 1, 16, 8).unwrap();

    // four blocks of metadata plus a two byte anchor
    assert_eq!(encoded.len(), HEADER_SIZE + 4 * 3);
    for block in encoded[HEADER_SIZE..].chunks(3) {
        assert_eq!(block, [0b0100_0000, 0xD2, 0x04]);
    }

    let (_, decoded) = decompress(&encoded).unwrap();
    assert_eq!(decoded, pixels);
}

#[test]
fn full_range_tile_is_stored_flat() {
    let mut samples = patterns::uniform(8 * 8, 500);
    samples[0] = 0;
    samples[63] = u16::MAX;

    let encoded = compress(&native(&samples, 16), 8, 8, 1, 16, 8).unwrap();
    assert_eq!(encoded.len(), HEADER_SIZE + 1 + 64 * 2);
    assert_eq!(encoded[HEADER_SIZE], 16 - 1);

    assert_roundtrip(8, 8, 1, 16, 8, &samples);
}

#[test]
fn truncated_streams_are_rejected() {
    let pixels = native(&patterns::noise(20 * 20 * 2, 8, 5), 8);
    let encoded = compress(&pixels, 20, 20, 2, 8, 8).unwrap();

    for len in [0, 5, HEADER_SIZE, HEADER_SIZE + 3, encoded.len() / 2, encoded.len() - 1] {
        let error = decompress(&encoded[..len]).unwrap_err();
        assert!(matches!(error, Error::TruncatedInput { .. }), "{len} bytes gave {error:?}");
    }
}

#[test]
fn invalid_parameters_are_rejected() {
    let pixels = [0u8; 64];

    assert!(matches!(compress(&pixels, 8, 8, 1, 8, 2), Err(Error::UnsupportedTileSize(2))));
    assert!(matches!(compress(&pixels, 8, 8, 1, 24, 4), Err(Error::UnsupportedBitDepth(24))));
    assert!(matches!(compress(&pixels, 8, 8, 0, 8, 4), Err(Error::UnsupportedChannelCount(0))));
    assert!(matches!(compress(&pixels, 0, 8, 1, 8, 4), Err(Error::InvalidDimensions { .. })));
    assert!(matches!(
        compress(&pixels, 8, 8, 2, 8, 4),
        Err(Error::BufferSizeMismatch {
            expected: 128,
            actual: 64
        })
    ));
}

#[test]
fn limits_apply_to_both_directions() {
    let descriptor = Descriptor {
        width: 32,
        height: 32,
        channels: 1,
        bit_depth: 8,
        tile_size: 8,
    };
    let pixels = native(&patterns::noise(32 * 32, 8, 1), 8);
    let settings = Settings::default().with_limits(Limits::none().with_max_pixels(1000));

    assert!(matches!(
        descriptor.encode_with(&pixels, &settings),
        Err(Error::LimitExceeded {
            pixels: 1024,
            max_pixels: 1000
        })
    ));

    let encoded = descriptor.encode_alloc(&pixels).unwrap();
    assert!(matches!(
        Descriptor::decode_with(&encoded, &settings),
        Err(Error::LimitExceeded { .. })
    ));
}

#[derive(Default)]
struct Recorder {
    reports: RefCell<Vec<(bool, Report)>>,
}

impl Telemetry for Recorder {
    fn compressed(&self, report: &Report) {
        self.reports.borrow_mut().push((true, *report));
    }

    fn decompressed(&self, report: &Report) {
        self.reports.borrow_mut().push((false, *report));
    }
}

#[test]
fn telemetry_receives_reports() {
    let descriptor = Descriptor {
        width: 16,
        height: 8,
        channels: 1,
        bit_depth: 8,
        tile_size: 8,
    };
    let mut samples = patterns::uniform(16 * 8, 9);
    samples[15] = 10;
    let pixels = native(&samples, 8);

    let recorder = Recorder::default();
    let settings = Settings::default().with_telemetry(&recorder);

    let encoded = descriptor.encode_with(&pixels, &settings).unwrap();
    Descriptor::decode_with(&encoded, &settings).unwrap();

    let reports = recorder.reports.borrow();
    assert_eq!(reports.len(), 2);

    let (compressed, report) = reports[0];
    assert!(compressed);
    assert_eq!(report.raw_bytes, 128);
    assert_eq!(report.encoded_bytes, encoded.len());
    assert_eq!(report.blocks.uniform, 1);
    assert_eq!(report.blocks.packed, 1);

    let (compressed, report) = reports[1];
    assert!(!compressed);
    assert_eq!(report.blocks.total(), 2);
}

#[test]
fn file_helpers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradient.roaster");

    let descriptor = Descriptor {
        width: 50,
        height: 30,
        channels: 3,
        bit_depth: 12,
        tile_size: 16,
    };
    let pixels = native(&patterns::gradient(50, 30, 3, 4095), 12);

    descriptor.encode_file(&path, &pixels).unwrap();
    let (decoded_descriptor, decoded) = Descriptor::decode_file(&path).unwrap();

    assert_eq!(decoded_descriptor, descriptor);
    assert_eq!(decoded, pixels);

    assert!(matches!(
        Descriptor::decode_file(dir.path().join("missing.roaster")),
        Err(Error::Io(_))
    ));
}

#[test]
fn compare_reports_corruption() {
    let descriptor = Descriptor {
        width: 10,
        height: 10,
        channels: 1,
        bit_depth: 8,
        tile_size: 4,
    };
    let pixels = native(&patterns::gradient(10, 10, 1, 255), 8);
    let encoded = descriptor.encode_alloc(&pixels).unwrap();
    let (_, mut decoded) = Descriptor::decode_alloc(&encoded).unwrap();
    assert!(roaster::compare(&descriptor, &pixels, &decoded).unwrap().is_empty());

    decoded[5 * 10 + 7] ^= 1;
    let mismatches = roaster::compare(&descriptor, &pixels, &decoded).unwrap();
    assert_eq!(mismatches.len(), 1);
    assert_eq!((mismatches[0].x, mismatches[0].y), (7, 5));
}
