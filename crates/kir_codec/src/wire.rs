//! Little-endian primitive readers and writers.

use crate::error::{EncodeError, FormatError};

/// Growable little-endian output buffer.
#[derive(Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    /// Writes a `u32` length prefix followed by the bytes.
    pub(crate) fn blob(&mut self, b: &[u8], what: &'static str) -> Result<(), EncodeError> {
        self.u32(len_u32(b.len(), what)?);
        self.bytes(b);
        Ok(())
    }

    pub(crate) fn string(&mut self, s: &str, what: &'static str) -> Result<(), EncodeError> {
        self.blob(s.as_bytes(), what)
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

pub(crate) fn len_u32(len: usize, what: &'static str) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::TooLarge { what, len })
}

pub(crate) fn len_u16(len: usize, what: &'static str) -> Result<u16, EncodeError> {
    u16::try_from(len).map_err(|_| EncodeError::TooLarge { what, len })
}

/// Bounds-checked little-endian reader over a slice.
///
/// `origin` is the absolute offset of the slice in the whole input, so
/// errors from nested readers still report file positions.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    origin: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8], origin: usize) -> Self {
        Self {
            data,
            pos: 0,
            origin,
        }
    }

    pub(crate) fn offset(&self) -> usize {
        self.origin + self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], FormatError> {
        if self.remaining() < n {
            return Err(FormatError::Truncated {
                offset: self.offset(),
                context,
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self, context: &'static str) -> Result<u8, FormatError> {
        Ok(self.array::<1>(context)?[0])
    }

    pub(crate) fn u16(&mut self, context: &'static str) -> Result<u16, FormatError> {
        self.array(context).map(u16::from_le_bytes)
    }

    pub(crate) fn u32(&mut self, context: &'static str) -> Result<u32, FormatError> {
        self.array(context).map(u32::from_le_bytes)
    }

    pub(crate) fn u64(&mut self, context: &'static str) -> Result<u64, FormatError> {
        self.array(context).map(u64::from_le_bytes)
    }

    pub(crate) fn i64(&mut self, context: &'static str) -> Result<i64, FormatError> {
        self.array(context).map(i64::from_le_bytes)
    }

    pub(crate) fn f32(&mut self, context: &'static str) -> Result<f32, FormatError> {
        self.array(context).map(f32::from_le_bytes)
    }

    pub(crate) fn f64(&mut self, context: &'static str) -> Result<f64, FormatError> {
        self.array(context).map(f64::from_le_bytes)
    }

    /// Reads a 0/1 byte.
    pub(crate) fn flag(&mut self, context: &'static str) -> Result<bool, FormatError> {
        let offset = self.offset();
        match self.u8(context)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(FormatError::InvalidValue {
                offset,
                context,
                found: u64::from(other),
            }),
        }
    }

    /// Reads a `u32` length-prefixed UTF-8 string.
    pub(crate) fn string(&mut self, context: &'static str) -> Result<String, FormatError> {
        let len = self.u32(context)? as usize;
        self.utf8(len, context)
    }

    /// Reads `len` bytes as UTF-8.
    pub(crate) fn utf8(&mut self, len: usize, context: &'static str) -> Result<String, FormatError> {
        let offset = self.offset();
        let bytes = self.take(len, context)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FormatError::InvalidUtf8 { offset })
    }

    /// Splits off the next `len` bytes as an independent reader.
    pub(crate) fn sub(&mut self, len: usize, context: &'static str) -> Result<Reader<'a>, FormatError> {
        let origin = self.offset();
        let data = self.take(len, context)?;
        Ok(Reader::new(data, origin))
    }

    /// Rejects counts whose minimum encoded size exceeds the remaining bytes,
    /// before anything is allocated for them.
    pub(crate) fn check_count(
        &self,
        count: u64,
        min_item_size: usize,
        context: &'static str,
    ) -> Result<usize, FormatError> {
        let needed = count.saturating_mul(min_item_size as u64);
        if needed > self.remaining() as u64 {
            return Err(FormatError::CountTooLarge {
                count,
                offset: self.offset(),
                context,
            });
        }
        Ok(count as usize)
    }

    pub(crate) fn expect_end(&self, context: &'static str) -> Result<(), FormatError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(FormatError::TrailingBytes {
                offset: self.offset(),
                remaining,
                context,
            }),
        }
    }
}
