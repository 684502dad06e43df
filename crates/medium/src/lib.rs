//! # Medium - backing non-volatile storage
//!
//! The configuration store keeps its whole image in one contiguous block of
//! byte-addressable non-volatile storage. This crate defines the blocking
//! byte-range interface the store consumes, plus two implementations:
//!
//! | Type           | Backing                      | Used by                       |
//! |----------------|------------------------------|-------------------------------|
//! | [`RamMedium`]  | `Vec<u8>` with fault hooks   | tests, benchmarks             |
//! | [`FileMedium`] | a fixed-size file            | the shell, host-side tooling  |
//!
//! An erased medium reads back as [`ERASED_BYTE`] everywhere, the way a
//! blank EEPROM or flash sector does.
//!
//! ## Example
//!
//! ```rust
//! use medium::{Medium, RamMedium, ERASED_BYTE};
//!
//! let mut m = RamMedium::new(16);
//! m.write(4, b"abcd").unwrap();
//!
//! let mut buf = [0u8; 6];
//! m.read(3, &mut buf).unwrap();
//! assert_eq!(&buf, &[ERASED_BYTE, b'a', b'b', b'c', b'd', ERASED_BYTE]);
//! ```

mod file;
mod ram;

pub use file::FileMedium;
pub use ram::{MediumStats, RamMedium};

use std::io;
use thiserror::Error;

/// Value of every byte on a freshly erased medium.
pub const ERASED_BYTE: u8 = 0xFF;

/// Errors reported by a [`Medium`].
#[derive(Debug, Error)]
pub enum MediumError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The requested byte range does not fit on the medium.
    #[error("range {offset}+{len} exceeds medium capacity {capacity}")]
    OutOfBounds {
        /// First byte of the requested range.
        offset: usize,
        /// Length of the requested range.
        len: usize,
        /// Total size of the medium.
        capacity: usize,
    },
}

/// Blocking byte-range access to a fixed-size non-volatile medium.
///
/// Every call completes (or fails) before returning. Implementations do not
/// interpret the bytes they move; validation is the caller's job.
pub trait Medium {
    /// Total size of the medium in bytes.
    fn capacity(&self) -> usize;

    /// Fills `buf` with the bytes starting at `offset`.
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), MediumError>;

    /// Writes `data` starting at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), MediumError>;

    /// Erases the whole medium to [`ERASED_BYTE`].
    fn clear(&mut self) -> Result<(), MediumError>;
}

impl<M: Medium + ?Sized> Medium for &mut M {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), MediumError> {
        (**self).read(offset, buf)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), MediumError> {
        (**self).write(offset, data)
    }

    fn clear(&mut self) -> Result<(), MediumError> {
        (**self).clear()
    }
}

/// Checks that `offset..offset + len` lies inside a medium of `capacity` bytes.
pub(crate) fn check_range(offset: usize, len: usize, capacity: usize) -> Result<(), MediumError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(MediumError::OutOfBounds {
            offset,
            len,
            capacity,
        }),
    }
}
