use std::fmt;

use layout::{Meta, MIRROR_LEN, SEGMENT_COUNT};
use log::info;
use medium::Medium;

use crate::Store;

/// Snapshot of store-wide bookkeeping for the status reporter.
///
/// The store does not serialize this itself; a [`StatusSink`] decides how it
/// is transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStatus {
    /// Bytes the image occupies on the medium.
    pub total_bytes: usize,
    pub segment_count: usize,
    pub meta_version: u16,
    pub error_counter: u16,
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version={} bytesConsumed={} structures={} errorCounter={}",
            self.meta_version, self.total_bytes, self.segment_count, self.error_counter
        )
    }
}

/// Receiver of status snapshots, typically the messaging layer.
pub trait StatusSink {
    fn send_status(&mut self, status: &StoreStatus);
}

impl<F: FnMut(&StoreStatus)> StatusSink for F {
    fn send_status(&mut self, status: &StoreStatus) {
        self(status)
    }
}

impl<M: Medium> Store<M> {
    #[must_use]
    pub fn status(&self) -> StoreStatus {
        let meta: Meta = self.mirror.read();
        StoreStatus {
            total_bytes: MIRROR_LEN,
            segment_count: SEGMENT_COUNT,
            meta_version: meta.version,
            error_counter: meta.error_counter,
        }
    }

    /// Hands the current status snapshot to `sink`.
    pub fn transmit_status<S: StatusSink + ?Sized>(&self, sink: &mut S) {
        let status = self.status();
        info!("status: {}", status);
        sink.send_status(&status);
    }
}
