use crate::error::IoError;
use std::io::Read;

/// A single interface the rest of the core uses for all input.
///
/// Two implementations exist: [`BufferSource`], which advances a cursor over
/// an owned in-memory window, and [`StreamSource`], which reads forward from
/// any [`Read`] implementor. Both are interchangeable by every parser in
/// this workspace — no parser branches on which one it was given.
pub trait ByteSource {
    fn read_u8(&mut self) -> Result<u8, IoError>;
    fn read_u16_be(&mut self) -> Result<u16, IoError>;
    fn read_u32_be(&mut self) -> Result<u32, IoError>;
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, IoError>;

    /// Number of bytes consumed so far.
    fn position(&self) -> u64;

    /// Number of bytes remaining, if known. `None` for an unbounded stream.
    fn remaining(&self) -> Option<u64>;
}

/// A bounded byte window: `start <= current <= end`. Every read advances
/// `current` and fails with [`IoError::EndOfData`] if it would cross `end`.
pub struct BufferSource<'a> {
    data: &'a [u8],
    start: usize,
    end: usize,
    current: usize,
}

impl<'a> BufferSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        let end = data.len();
        BufferSource {
            data,
            start: 0,
            end,
            current: 0,
        }
    }

    /// A sub-window of `data[start..end]`, e.g. for a record bounded by a declared length.
    pub fn bounded(data: &'a [u8], start: usize, end: usize) -> Self {
        let end = end.min(data.len());
        BufferSource {
            data,
            start,
            end,
            current: start,
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], IoError> {
        if self.current + n > self.end {
            return Err(IoError::EndOfData {
                position: self.current as u64,
            });
        }
        let slice = &self.data[self.current..self.current + n];
        self.current += n;
        Ok(slice)
    }
}

impl<'a> ByteSource for BufferSource<'a> {
    fn read_u8(&mut self) -> Result<u8, IoError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16_be(&mut self) -> Result<u16, IoError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32_be(&mut self) -> Result<u32, IoError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, IoError> {
        Ok(self.take(n)?.to_vec())
    }

    fn position(&self) -> u64 {
        (self.current - self.start) as u64
    }

    fn remaining(&self) -> Option<u64> {
        Some((self.end - self.current) as u64)
    }
}

/// Reads forward from any [`Read`] implementor, tracking position for error
/// messages. Unlike [`BufferSource`] the remaining length is not known ahead
/// of time unless the caller supplies one via [`StreamSource::bounded`].
pub struct StreamSource<R: Read> {
    inner: R,
    position: u64,
    limit: Option<u64>,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R) -> Self {
        StreamSource {
            inner,
            position: 0,
            limit: None,
        }
    }

    /// Bound this source to `limit` further bytes, e.g. a record's declared length.
    pub fn bounded(inner: R, limit: u64) -> Self {
        StreamSource {
            inner,
            position: 0,
            limit: Some(limit),
        }
    }

    fn check_budget(&self, n: u64) -> Result<(), IoError> {
        if let Some(limit) = self.limit {
            if self.position + n > limit {
                return Err(IoError::EndOfData {
                    position: self.position,
                });
            }
        }
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), IoError> {
        self.check_budget(buf.len() as u64)?;
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                IoError::EndOfData {
                    position: self.position,
                }
            } else {
                IoError::io(e, self.position)
            }
        })?;
        self.position += buf.len() as u64;
        Ok(())
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn read_u8(&mut self) -> Result<u8, IoError> {
        let mut b = [0u8; 1];
        self.fill(&mut b)?;
        Ok(b[0])
    }

    fn read_u16_be(&mut self) -> Result<u16, IoError> {
        let mut b = [0u8; 2];
        self.fill(&mut b)?;
        Ok(u16::from_be_bytes(b))
    }

    fn read_u32_be(&mut self) -> Result<u32, IoError> {
        let mut b = [0u8; 4];
        self.fill(&mut b)?;
        Ok(u32::from_be_bytes(b))
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, IoError> {
        let mut buf = vec![0u8; n];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn remaining(&self) -> Option<u64> {
        self.limit.map(|l| l.saturating_sub(self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_source_reads_big_endian() {
        let data = [0x00, 0x01, 0xDE, 0xAD, 0xBE, 0xEF];
        let mut src = BufferSource::new(&data);
        assert_eq!(src.read_u16_be().unwrap(), 1);
        assert_eq!(src.read_u32_be().unwrap(), 0xDEADBEEF);
        assert_eq!(src.position(), 6);
    }

    #[test]
    fn buffer_source_end_of_data() {
        let data = [0x01];
        let mut src = BufferSource::new(&data);
        assert!(matches!(
            src.read_u16_be(),
            Err(IoError::EndOfData { .. })
        ));
    }

    #[test]
    fn stream_source_respects_bound() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut src = StreamSource::bounded(&data[..], 2);
        assert_eq!(src.read_u16_be().unwrap(), 0x0102);
        assert!(matches!(
            src.read_u8(),
            Err(IoError::EndOfData { .. })
        ));
    }

    #[test]
    fn endian_independence() {
        // the same on-wire bytes decode identically regardless of host endianness
        let data = [0x12, 0x34, 0x56, 0x78];
        let mut a = BufferSource::new(&data);
        let mut b = StreamSource::new(&data[..]);
        assert_eq!(a.read_u32_be().unwrap(), b.read_u32_be().unwrap());
        assert_eq!(a.read_u32_be().unwrap_err().to_string().is_empty(), false);
    }
}
