// Bounds-checked field access over the descriptor block

use crate::error::{Result, TrcError};

/// Byte order of every multi-byte field and sample in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    /// Decode the `COMM_ORDER` word: 0 = HIFIRST, 1 = LOFIRST.
    pub fn from_flag(flag: u16) -> Result<Self> {
        match flag {
            0 => Ok(ByteOrder::BigEndian),
            1 => Ok(ByteOrder::LittleEndian),
            other => Err(TrcError::InvalidByteOrder(other)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ByteOrder::BigEndian => "HIFIRST",
            ByteOrder::LittleEndian => "LOFIRST",
        }
    }
}

/// Reads typed values at offsets relative to `base` within `buf`.
#[derive(Clone, Copy)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
    base: usize,
    order: ByteOrder,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8], base: usize, order: ByteOrder) -> Self {
        FieldReader { buf, base, order }
    }

    fn bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let start = self.base + offset;
        let end = start + N;
        self.buf
            .get(start..end)
            .and_then(|b| b.try_into().ok())
            .ok_or(TrcError::BufferTruncated {
                needed: end,
                available: self.buf.len(),
            })
    }

    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.bytes::<1>(offset)?[0])
    }

    pub fn i16(&self, offset: usize) -> Result<i16> {
        let b = self.bytes(offset)?;
        Ok(match self.order {
            ByteOrder::BigEndian => i16::from_be_bytes(b),
            ByteOrder::LittleEndian => i16::from_le_bytes(b),
        })
    }

    pub fn u16(&self, offset: usize) -> Result<u16> {
        let b = self.bytes(offset)?;
        Ok(match self.order {
            ByteOrder::BigEndian => u16::from_be_bytes(b),
            ByteOrder::LittleEndian => u16::from_le_bytes(b),
        })
    }

    pub fn i32(&self, offset: usize) -> Result<i32> {
        let b = self.bytes(offset)?;
        Ok(match self.order {
            ByteOrder::BigEndian => i32::from_be_bytes(b),
            ByteOrder::LittleEndian => i32::from_le_bytes(b),
        })
    }

    pub fn f32(&self, offset: usize) -> Result<f32> {
        let b = self.bytes(offset)?;
        Ok(match self.order {
            ByteOrder::BigEndian => f32::from_be_bytes(b),
            ByteOrder::LittleEndian => f32::from_le_bytes(b),
        })
    }

    pub fn f64(&self, offset: usize) -> Result<f64> {
        let b = self.bytes(offset)?;
        Ok(match self.order {
            ByteOrder::BigEndian => f64::from_be_bytes(b),
            ByteOrder::LittleEndian => f64::from_le_bytes(b),
        })
    }

    /// Fixed-length ASCII string, cut at the first NUL.
    pub fn string(&self, offset: usize, len: usize) -> Result<String> {
        let start = self.base + offset;
        let end = start + len;
        let raw = self.buf.get(start..end).ok_or(TrcError::BufferTruncated {
            needed: end,
            available: self.buf.len(),
        })?;
        Ok(nul_terminated(raw))
    }
}

pub(crate) fn nul_terminated(raw: &[u8]) -> String {
    let text = raw.split(|&b| b == 0).next().unwrap_or(&[]);
    String::from_utf8_lossy(text).into_owned()
}
