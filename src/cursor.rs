use crate::{sample::Sample, Error, Result};

/// Sequential little-endian reader over encoded data.
///
/// Every read checks the remaining length first and reports the offset it
/// failed at.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    #[inline]
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Borrows the next `len` bytes and advances past them.
    #[inline]
    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self
            .offset
            .checked_add(len)
            .and_then(|end| self.data.get(self.offset..end))
            .ok_or(Error::TruncatedInput {
                offset: self.offset,
                needed: len,
                available: self.remaining(),
            })?;

        self.offset += len;
        Ok(bytes)
    }

    #[inline]
    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    #[inline]
    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    #[inline]
    pub(crate) fn read_sample<S: Sample>(&mut self) -> Result<S> {
        Ok(S::read_le(self.take(S::SIZE)?, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_fields() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xCD, 0xAB];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(reader.read_sample::<u16>().unwrap(), 0xABCD);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn short_read_reports_offset_and_does_not_advance() {
        let data = [0u8; 3];
        let mut reader = ByteReader::new(&data);
        reader.read_u8().unwrap();

        match reader.read_u32() {
            Err(Error::TruncatedInput {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncated input, got {other:?}"),
        }

        assert_eq!(reader.offset(), 1);
        assert_eq!(reader.take(2).unwrap(), &[0, 0]);
    }
}
