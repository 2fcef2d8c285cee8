//! Netpbm container for decoded images.
//!
//! Roaster streams are not viewable by common tools, so decoded pixels can be
//! wrapped in the simplest format most viewers read: `P5` for gray, `P6` for
//! RGB and `P7` (PAM) for every other channel count.

use crate::{sample::Sample, Descriptor, Error, Result, SampleWidth};
use std::io::Write;

/// Writes `pixels` as a netpbm image.
///
/// The maximum value is `2^bit_depth - 1`. Two byte samples are converted to
/// the big-endian order netpbm requires.
pub fn write<W: Write>(mut writer: W, descriptor: &Descriptor, pixels: &[u8]) -> Result<()> {
    let expected = descriptor.image_size()?;
    if pixels.len() != expected {
        return Err(Error::BufferSizeMismatch {
            expected,
            actual: pixels.len(),
        });
    }

    let Descriptor { width, height, channels, .. } = *descriptor;
    let max_value = (1u32 << descriptor.bit_depth) - 1;

    match channels {
        1 | 3 => {
            let magic = if channels == 1 { "P5" } else { "P6" };
            write!(writer, "{magic}\n{width} {height}\n{max_value}\n")?;
        }
        _ => {
            write!(
                writer,
                "P7\nWIDTH {width}\nHEIGHT {height}\nDEPTH {channels}\nMAXVAL {max_value}\n"
            )?;
            write!(writer, "TUPLTYPE {}\nENDHDR\n", tuple_type(channels))?;
        }
    }

    match descriptor.sample_width()? {
        SampleWidth::U8 => writer.write_all(pixels)?,
        SampleWidth::U16 => {
            let swapped: Vec<u8> = (0..pixels.len() / <u16 as Sample>::SIZE)
                .flat_map(|index| <u16 as Sample>::read_le(pixels, index).to_be_bytes())
                .collect();
            writer.write_all(&swapped)?;
        }
    }

    Ok(())
}

/// Encodes `pixels` as a netpbm image into a newly allocated `Vec`.
pub fn encode(descriptor: &Descriptor, pixels: &[u8]) -> Result<Vec<u8>> {
    let mut encoded = Vec::with_capacity(pixels.len() + 64);
    write(&mut encoded, descriptor, pixels)?;
    Ok(encoded)
}

fn tuple_type(channels: u8) -> &'static str {
    match channels {
        1 => "GRAYSCALE",
        2 => "GRAYSCALE_ALPHA",
        3 => "RGB",
        4 => "RGB_ALPHA",
        _ => "UNKNOWN",
    }
}
