use crate::error::IoError;
use std::io::Write;

/// Write-side counterpart to [`crate::ByteSource`].
pub trait ByteSink {
    fn write_u8(&mut self, v: u8) -> Result<(), IoError>;
    fn write_u16_be(&mut self, v: u16) -> Result<(), IoError>;
    fn write_u32_be(&mut self, v: u32) -> Result<(), IoError>;
    fn write_bytes(&mut self, v: &[u8]) -> Result<(), IoError>;
    fn position(&self) -> u64;
}

/// Writes into an owned, growable byte buffer.
pub struct BufferSink {
    buf: Vec<u8>,
}

impl BufferSink {
    pub fn new() -> Self {
        BufferSink { buf: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSink for BufferSink {
    fn write_u8(&mut self, v: u8) -> Result<(), IoError> {
        self.buf.push(v);
        Ok(())
    }

    fn write_u16_be(&mut self, v: u16) -> Result<(), IoError> {
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    fn write_u32_be(&mut self, v: u32) -> Result<(), IoError> {
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<(), IoError> {
        self.buf.extend_from_slice(v);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.buf.len() as u64
    }
}

/// A bounded variant of [`BufferSink`] that fails with [`IoError::Overflow`]
/// instead of growing past a fixed capacity, for callers writing into a
/// caller-owned window (e.g. a fixed-offset binary record field).
pub struct BoundedBufferSink<'a> {
    buf: &'a mut [u8],
    current: usize,
}

impl<'a> BoundedBufferSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        BoundedBufferSink { buf, current: 0 }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), IoError> {
        let needed = bytes.len();
        let available = self.buf.len() - self.current;
        if needed > available {
            return Err(IoError::Overflow { needed, available });
        }
        self.buf[self.current..self.current + needed].copy_from_slice(bytes);
        self.current += needed;
        Ok(())
    }
}

impl<'a> ByteSink for BoundedBufferSink<'a> {
    fn write_u8(&mut self, v: u8) -> Result<(), IoError> {
        self.put(&[v])
    }

    fn write_u16_be(&mut self, v: u16) -> Result<(), IoError> {
        self.put(&v.to_be_bytes())
    }

    fn write_u32_be(&mut self, v: u32) -> Result<(), IoError> {
        self.put(&v.to_be_bytes())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<(), IoError> {
        self.put(v)
    }

    fn position(&self) -> u64 {
        self.current as u64
    }
}

/// Writes forward into any [`Write`] implementor.
pub struct StreamSink<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> StreamSink<W> {
    pub fn new(inner: W) -> Self {
        StreamSink { inner, position: 0 }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), IoError> {
        self.inner
            .write_all(bytes)
            .map_err(|e| IoError::io(e, self.position))?;
        self.position += bytes.len() as u64;
        Ok(())
    }
}

impl<W: Write> ByteSink for StreamSink<W> {
    fn write_u8(&mut self, v: u8) -> Result<(), IoError> {
        self.put(&[v])
    }

    fn write_u16_be(&mut self, v: u16) -> Result<(), IoError> {
        self.put(&v.to_be_bytes())
    }

    fn write_u32_be(&mut self, v: u32) -> Result<(), IoError> {
        self.put(&v.to_be_bytes())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<(), IoError> {
        self.put(v)
    }

    fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_roundtrip() {
        let mut sink = BufferSink::new();
        sink.write_u16_be(0x0102).unwrap();
        sink.write_u32_be(0xDEADBEEF).unwrap();
        assert_eq!(sink.into_inner(), vec![0x01, 0x02, 0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn bounded_sink_overflows() {
        let mut buf = [0u8; 2];
        let mut sink = BoundedBufferSink::new(&mut buf);
        assert!(sink.write_u16_be(1).is_ok());
        assert!(matches!(
            sink.write_u8(1),
            Err(IoError::Overflow { .. })
        ));
    }
}
