use crate::{sample::Sample, Descriptor, Error, Result, SampleWidth};

/// A sample that differs between two images of the same descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Mismatch {
    pub x: u32,
    pub y: u32,
    pub channel: u8,
    pub expected: u16,
    pub actual: u16,
}

/// Lists every sample where `actual` differs from `expected`, in buffer order.
///
/// Both buffers must hold exactly [`Descriptor::image_size`] bytes.
pub fn compare(descriptor: &Descriptor, expected: &[u8], actual: &[u8]) -> Result<Vec<Mismatch>> {
    let image_size = descriptor.image_size()?;

    for buffer in [expected, actual] {
        if buffer.len() != image_size {
            return Err(Error::BufferSizeMismatch {
                expected: image_size,
                actual: buffer.len(),
            });
        }
    }

    let mismatches = match descriptor.sample_width()? {
        SampleWidth::U8 => mismatches::<u8>(descriptor, expected, actual),
        SampleWidth::U16 => mismatches::<u16>(descriptor, expected, actual),
    };

    if !mismatches.is_empty() {
        tracing::debug!("{} of {} samples differ", mismatches.len(), descriptor.sample_count()?);
    }

    Ok(mismatches)
}

fn mismatches<S: Sample>(descriptor: &Descriptor, expected: &[u8], actual: &[u8]) -> Vec<Mismatch> {
    let width = descriptor.width as usize;
    let channels = descriptor.channels as usize;

    (0..expected.len() / S::SIZE)
        .filter_map(|index| {
            let (expected, actual) = (S::read_le(expected, index), S::read_le(actual, index));
            if expected == actual {
                return None;
            }

            let pixel = index / channels;
            Some(Mismatch {
                x: (pixel % width) as u32,
                y: (pixel / width) as u32,
                channel: (index % channels) as u8,
                expected: expected.to_u32() as u16,
                actual: actual.to_u32() as u16,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_position_of_each_difference() {
        let descriptor = Descriptor {
            width: 3,
            height: 2,
            channels: 2,
            bit_depth: 16,
            tile_size: 4,
        };
        let expected = vec![0; descriptor.image_size().unwrap()];
        let mut actual = expected.clone();
        // pixel (2, 1), channel 1
        actual[(5 * 2 + 1) * 2..][..2].copy_from_slice(&0x1234u16.to_le_bytes());
        // pixel (1, 0), channel 0
        actual[2 * 2] = 9;

        assert_eq!(
            compare(&descriptor, &expected, &actual).unwrap(),
            vec![
                Mismatch {
                    x: 1,
                    y: 0,
                    channel: 0,
                    expected: 0,
                    actual: 9
                },
                Mismatch {
                    x: 2,
                    y: 1,
                    channel: 1,
                    expected: 0,
                    actual: 0x1234
                },
            ]
        );
    }

    #[test]
    fn identical_images_have_no_mismatches() {
        let descriptor = Descriptor {
            width: 4,
            height: 4,
            channels: 1,
            bit_depth: 8,
            tile_size: 4,
        };
        let pixels: Vec<u8> = (0..16).collect();

        assert!(compare(&descriptor, &pixels, &pixels).unwrap().is_empty());
        assert!(matches!(
            compare(&descriptor, &pixels, &pixels[1..]),
            Err(Error::BufferSizeMismatch {
                expected: 16,
                actual: 15
            })
        ));
    }
}
