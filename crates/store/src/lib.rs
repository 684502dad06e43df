//! # Store - integrity-checked configuration store
//!
//! Ties the [`layout`] image and a [`medium`] together into the persistent
//! configuration store every other firmware module reads its settings from.
//!
//! ## Boot sequence
//!
//! ```text
//! Store::open
//!   |
//!   v
//! capacity check ──(too small)──> StoreError::Capacity
//!   |
//!   v
//! load_mirror() ── whole-image read at base address (retried)
//!   |                 └─(still failing)─> RAM defaults, no write
//!   v
//! recover() ────── per-segment CRC check
//!   |                 ├─ corrupt + rewritable ──> ROM default + fresh checksum
//!   |                 └─ corrupt + protected ───> logged, left untouched
//!   v
//! (any restored?) ─ yes ─> error_counter += 1 (saturating) ─> one commit()
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module       | Purpose                                                   |
//! |--------------|-----------------------------------------------------------|
//! | [`lib.rs`]   | `Store` struct, `open`, accessors, `StoreError`           |
//! | [`persist`]  | `load_mirror`, `commit`, `clear`, retry and read-back     |
//! | [`recovery`] | `check`, `recover`, boot and recovery reports             |
//! | [`guard`]    | scoped write guards that refresh checksums on drop        |
//! | [`status`]   | status snapshot and the sink it is handed to              |
//!
//! ## Updating configuration
//!
//! Mutable access only exists through guards, so a changed segment always
//! carries a matching checksum before it can be committed:
//!
//! ```rust
//! use config::StoreConfig;
//! use layout::{Io, Text, Alarm};
//! use medium::RamMedium;
//! use store::Store;
//!
//! let mut store = Store::open(RamMedium::new(512), &StoreConfig::default()).unwrap();
//!
//! store.edit::<Io>().led_brightness_run = 200;
//! store.update(|alarm: &mut Alarm| alarm.home_address = Text::new("1 Main St").unwrap());
//! store.commit().unwrap();
//! ```

mod guard;
mod persist;
mod recovery;
mod status;

pub use guard::{RawSegmentGuard, SegmentGuard};
pub use recovery::{BootReport, LoadOutcome, RecoveryReport, SegmentHealth};
pub use status::{StatusSink, StoreStatus};

use config::StoreConfig;
use layout::{Mirror, Segment, SegmentDescriptor, DESCRIPTORS, MIRROR_LEN, SEGMENT_COUNT};
use log::info;
use medium::{Medium, MediumError};
use thiserror::Error;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The medium cannot hold the image at the configured base address.
    #[error("medium holds {capacity} bytes, store needs {required} (base address {base_address})")]
    Capacity {
        capacity: usize,
        required: usize,
        base_address: usize,
    },

    /// The medium reported a failure.
    #[error("medium error: {0}")]
    Medium(#[from] MediumError),

    /// A commit reported success but the medium reads back different bytes.
    #[error("commit verification failed: {mismatched} of {len} bytes differ")]
    VerifyMismatch { mismatched: usize, len: usize },
}

/// The configuration store: a RAM mirror of the persisted image plus the
/// medium it is loaded from and committed to.
///
/// There is exactly one logical owner; every operation is blocking and runs
/// to completion on the caller's thread.
pub struct Store<M: Medium> {
    pub(crate) medium: M,
    pub(crate) mirror: Mirror,
    pub(crate) base_address: usize,
    pub(crate) io_attempts: u32,
    pub(crate) verify_commits: bool,
    pub(crate) boot: BootReport,
}

impl<M: Medium> std::fmt::Debug for Store<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("base_address", &self.base_address)
            .field("capacity", &self.medium.capacity())
            .field("io_attempts", &self.io_attempts)
            .field("verify_commits", &self.verify_commits)
            .field("boot", &self.boot)
            .field("mirror", &self.mirror)
            .finish()
    }
}

impl<M: Medium> Store<M> {
    /// Opens the store: loads the mirror from `medium` and runs the integrity
    /// check, restoring and committing corrupt segments where allowed.
    ///
    /// Corruption and I/O failures during boot are logged and recorded in
    /// [`boot_report`](Self::boot_report); they never prevent the store from
    /// opening.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Capacity`] if the medium is too small for the
    /// image at `config.base_address`.
    pub fn open(medium: M, config: &StoreConfig) -> Result<Self, StoreError> {
        let required = config.base_address.saturating_add(MIRROR_LEN);
        if medium.capacity() < required {
            return Err(StoreError::Capacity {
                capacity: medium.capacity(),
                required,
                base_address: config.base_address,
            });
        }

        info!(
            "configuration store is {} bytes in {} segments",
            MIRROR_LEN, SEGMENT_COUNT
        );

        let mut store = Self {
            medium,
            mirror: Mirror::zeroed(),
            base_address: config.base_address,
            io_attempts: config.io_attempts(),
            verify_commits: config.verify_commits,
            boot: BootReport::default(),
        };

        let load = store.load_mirror();
        let recovery = store.recover();
        store.boot = BootReport { load, recovery };

        Ok(store)
    }

    /// Read-only view of the RAM mirror.
    #[must_use]
    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    /// Size of the RAM mirror in bytes.
    #[must_use]
    pub fn mirror_len(&self) -> usize {
        MIRROR_LEN
    }

    /// The descriptor table.
    #[must_use]
    pub fn descriptors(&self) -> &'static [SegmentDescriptor; SEGMENT_COUNT] {
        &DESCRIPTORS
    }

    /// Decodes a typed copy of segment `S` from the mirror.
    #[must_use]
    pub fn read<S: Segment>(&self) -> S {
        self.mirror.read()
    }

    /// What happened while the store was opened.
    #[must_use]
    pub fn boot_report(&self) -> &BootReport {
        &self.boot
    }

    /// Offset of the image on the medium.
    #[must_use]
    pub fn base_address(&self) -> usize {
        self.base_address
    }

    #[must_use]
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Releases the medium, discarding uncommitted changes.
    pub fn into_medium(self) -> M {
        self.medium
    }
}

#[cfg(test)]
mod tests;
