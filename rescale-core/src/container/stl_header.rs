use crate::error::{RescaleError, Result};
use crate::util::fill::read_full;
use std::io::{Read, Write};

pub const TEXT_LEN: usize = 80;
pub const HEADER_LEN: usize = 84;

/// Leading unit of a binary STL file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StlHeader {
    /// Opaque header text, copied through untouched.
    pub text: [u8; TEXT_LEN],
    /// Declared number of triangle records (little-endian u32 on disk).
    pub triangle_count: u32,
}

impl StlHeader {
    pub fn from_bytes(buf: &[u8; HEADER_LEN]) -> Self {
        let mut text = [0u8; TEXT_LEN];
        text.copy_from_slice(&buf[..TEXT_LEN]);
        let mut count = [0u8; 4];
        count.copy_from_slice(&buf[TEXT_LEN..]);
        Self {
            text,
            triangle_count: u32::from_le_bytes(count),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[..TEXT_LEN].copy_from_slice(&self.text);
        buf[TEXT_LEN..].copy_from_slice(&self.triangle_count.to_le_bytes());
        buf
    }

    pub fn write_to(&self, mut w: impl Write) -> std::io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Reads exactly 84 bytes; anything shorter is a truncated header.
    pub fn read_from(mut r: impl Read) -> Result<Self> {
        let mut buf = [0u8; HEADER_LEN];
        let got = read_full(&mut r, &mut buf)?;
        if got < HEADER_LEN {
            return Err(RescaleError::TruncatedStlHeader { got });
        }
        Ok(Self::from_bytes(&buf))
    }
}
