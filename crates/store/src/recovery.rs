//! Integrity check and selective recovery.
//!
//! Every segment is checked on its own so that, for example, a damaged alarm
//! address never forces regeneration of working network credentials. All
//! restored segments are made consistent in RAM first and then persisted in
//! one commit.

use layout::{Meta, SegmentId};
use log::{error, warn};
use medium::Medium;

use crate::Store;

/// How the mirror was populated at boot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The image was read from the medium.
    #[default]
    Loaded,
    /// The medium could not be read; the mirror holds defaults.
    FellBackToDefaults {
        /// The last error reported by the medium.
        error: String,
    },
}

/// Checksum comparison for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHealth {
    pub id: SegmentId,
    /// CRC-32 computed over the segment's fields and sentinel.
    pub expected: u32,
    /// Checksum found in the footer.
    pub stored: u32,
}

impl SegmentHealth {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.expected == self.stored
    }
}

/// Outcome of one [`Store::recover`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Segments whose checksum did not match, in table order.
    pub corrupt: Vec<SegmentId>,
    /// Corrupt segments that were replaced by their defaults.
    pub restored: Vec<SegmentId>,
    /// Meta error counter after the pass.
    pub error_counter: u16,
    /// Whether the pass committed the store.
    pub committed: bool,
    /// Why the commit failed, if it did. The mirror is consistent regardless.
    pub commit_error: Option<String>,
}

impl RecoveryReport {
    /// `true` if every segment passed its check.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.corrupt.is_empty()
    }
}

/// Everything that happened while a store was opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootReport {
    pub load: LoadOutcome,
    pub recovery: RecoveryReport,
}

impl<M: Medium> Store<M> {
    /// Compares the computed and stored checksum of every segment, without
    /// changing anything.
    #[must_use]
    pub fn check(&self) -> Vec<SegmentHealth> {
        SegmentId::ALL
            .iter()
            .map(|&id| SegmentHealth {
                id,
                expected: self.mirror.compute_checksum(id),
                stored: self.mirror.stored_checksum(id),
            })
            .collect()
    }

    /// Checks every segment and restores the corrupt ones that allow it.
    ///
    /// # Steps
    ///
    /// 1. For each segment, compare the computed and stored checksum.
    /// 2. On mismatch, log both values. If the segment is rewritable, copy
    ///    its ROM default over it and refresh its checksum.
    /// 3. If anything was restored, bump the meta error counter (saturating),
    ///    refresh the meta checksum and commit the whole mirror once.
    ///
    /// Segments that are not rewritable are reported and left as they are.
    /// A healthy store performs no write at all. A failed commit is logged
    /// and recorded in the report; the mirror stays consistent in RAM.
    pub fn recover(&mut self) -> RecoveryReport {
        let mut report = RecoveryReport::default();

        for health in self.check() {
            if health.is_healthy() {
                continue;
            }
            let id = health.id;
            error!(
                "segment {} ({}) is corrupt (expected 0x{:08X}, stored 0x{:08X})",
                id.index(),
                id,
                health.expected,
                health.stored
            );
            report.corrupt.push(id);

            if id.descriptor().rewrite_when_corrupt {
                self.mirror.restore_default(id);
                self.mirror.refresh_checksum(id);
                report.restored.push(id);
                warn!("segment {} ({}) restored to defaults", id.index(), id);
            }
        }

        if !report.restored.is_empty() {
            let mut meta: Meta = self.mirror.read();
            meta.record_recovery();
            self.mirror.write(&meta);

            match self.commit() {
                Ok(()) => report.committed = true,
                Err(e) => {
                    error!("recovered configuration not persisted: {}", e);
                    report.commit_error = Some(e.to_string());
                }
            }
        }

        report.error_counter = self.mirror.read::<Meta>().error_counter;
        report
    }
}
