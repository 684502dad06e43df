use std::io;

use crate::{check_range, Medium, MediumError, ERASED_BYTE};

/// Operation counters kept by [`RamMedium`].
///
/// Counts every call, including ones that failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediumStats {
    pub reads: u64,
    pub writes: u64,
    pub clears: u64,
}

/// In-memory medium with operation counters and fault injection.
///
/// Faults are one-shot and consumed in call order:
///
/// - [`fail_next_reads`](Self::fail_next_reads) / [`fail_next_writes`](Self::fail_next_writes)
///   make the next `n` calls return an I/O error without touching the bytes.
/// - [`truncate_next_write`](Self::truncate_next_write) makes the next write
///   store only its first `keep` bytes and still report success, the way a
///   power cut during a bulk write looks to the caller.
#[derive(Debug, Clone)]
pub struct RamMedium {
    bytes: Vec<u8>,
    stats: MediumStats,
    failing_reads: u32,
    failing_writes: u32,
    truncate_at: Option<usize>,
}

impl RamMedium {
    /// Creates an erased medium of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self::from_bytes(vec![ERASED_BYTE; capacity])
    }

    /// Creates a medium holding exactly `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            stats: MediumStats::default(),
            failing_reads: 0,
            failing_writes: 0,
            truncate_at: None,
        }
    }

    /// Raw medium contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Raw mutable medium contents, bypassing counters and faults.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Counters since creation or the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> MediumStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = MediumStats::default();
    }

    /// Makes the next `n` reads fail.
    pub fn fail_next_reads(&mut self, n: u32) {
        self.failing_reads = n;
    }

    /// Makes the next `n` writes and clears fail.
    pub fn fail_next_writes(&mut self, n: u32) {
        self.failing_writes = n;
    }

    /// Makes the next write persist only its first `keep` bytes.
    pub fn truncate_next_write(&mut self, keep: usize) {
        self.truncate_at = Some(keep);
    }

    fn take_write_fault(&mut self) -> Result<(), MediumError> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(io::Error::new(io::ErrorKind::Other, "injected write fault").into());
        }
        Ok(())
    }
}

impl Medium for RamMedium {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), MediumError> {
        self.stats.reads += 1;
        check_range(offset, buf.len(), self.bytes.len())?;
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(io::Error::new(io::ErrorKind::Other, "injected read fault").into());
        }
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), MediumError> {
        self.stats.writes += 1;
        check_range(offset, data.len(), self.bytes.len())?;
        self.take_write_fault()?;

        let keep = match self.truncate_at.take() {
            Some(keep) => keep.min(data.len()),
            None => data.len(),
        };
        self.bytes[offset..offset + keep].copy_from_slice(&data[..keep]);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), MediumError> {
        self.stats.clears += 1;
        self.take_write_fault()?;
        self.bytes.fill(ERASED_BYTE);
        Ok(())
    }
}
