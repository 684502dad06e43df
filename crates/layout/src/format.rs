//! Segment footer constants and little-endian field cursors.
//!
//! ## Footer (8 bytes, last in every segment)
//!
//! ```text
//! [sentinel: u32 LE][checksum: u32 LE]
//! ```
//!
//! The checksum covers the segment's fields **and** the sentinel, but not
//! itself. The sentinel keeps an all-`0xFF` (erased) or all-zero region from
//! ever matching a checksum by accident.

use byteorder::{ByteOrder, LittleEndian};

/// Size of the footer sentinel in bytes.
pub const SENTINEL_LEN: usize = 4;

/// Size of the footer checksum in bytes.
pub const CHECKSUM_LEN: usize = 4;

/// Size of the whole footer: 4 (`sentinel`) + 4 (`checksum`).
pub const FOOTER_LEN: usize = SENTINEL_LEN + CHECKSUM_LEN;

/// Sentinel value written into every ROM default image.
pub const SENTINEL_DEFAULT: u32 = 0xDEAD_BEEF;

/// Checksum value stored in every ROM default image (refreshed on restore).
pub const CHECKSUM_DEFAULT: u32 = 0;

/// Parsed segment footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub sentinel: u32,
    pub checksum: u32,
}

impl Footer {
    /// Footer carried by the ROM default images.
    pub const DEFAULT: Footer = Footer {
        sentinel: SENTINEL_DEFAULT,
        checksum: CHECKSUM_DEFAULT,
    };

    /// Reads a footer from the first [`FOOTER_LEN`] bytes of `buf`.
    #[must_use]
    pub fn read(buf: &[u8]) -> Footer {
        Footer {
            sentinel: LittleEndian::read_u32(&buf[..SENTINEL_LEN]),
            checksum: LittleEndian::read_u32(&buf[SENTINEL_LEN..FOOTER_LEN]),
        }
    }

    /// Writes the footer into the first [`FOOTER_LEN`] bytes of `buf`.
    pub fn write(&self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[..SENTINEL_LEN], self.sentinel);
        LittleEndian::write_u32(&mut buf[SENTINEL_LEN..FOOTER_LEN], self.checksum);
    }
}

/// Sequential little-endian writer over a fixed field buffer.
///
/// Panics if a segment codec writes past its declared field length, which is
/// a layout bug rather than a runtime condition.
pub struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FieldWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf[self.pos] = v;
        self.pos += 1;
    }

    pub fn put_u16(&mut self, v: u16) {
        LittleEndian::write_u16(&mut self.buf[self.pos..self.pos + 2], v);
        self.pos += 2;
    }

    pub fn put_bytes(&mut self, v: &[u8]) {
        self.buf[self.pos..self.pos + v.len()].copy_from_slice(v);
        self.pos += v.len();
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Sequential little-endian reader over a fixed field buffer.
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn u8(&mut self) -> u8 {
        let v = self.buf[self.pos];
        self.pos += 1;
        v
    }

    pub fn u16(&mut self) -> u16 {
        let v = LittleEndian::read_u16(&self.buf[self.pos..self.pos + 2]);
        self.pos += 2;
        v
    }

    pub fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }
}
