//! Load, commit and clear: the only operations that touch the medium.
//!
//! Each one is a single blocking bulk operation. A failed attempt is retried
//! up to the configured number of extra attempts; commits are read back and
//! compared so a silently truncated write is caught before it is reported as
//! success.

use layout::{Mirror, MIRROR_LEN};
use log::{debug, error, info, warn};
use medium::Medium;

use crate::{LoadOutcome, Store, StoreError};

impl<M: Medium> Store<M> {
    /// Runs `op` until it succeeds or the attempts are exhausted.
    fn with_retries<T, F>(&mut self, what: &str, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut(&mut Self) -> Result<T, StoreError>,
    {
        let attempts = self.io_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(self) {
                Ok(v) => return Ok(v),
                Err(e) if attempt < attempts => {
                    warn!("{} attempt {}/{} failed: {}", what, attempt, attempts, e);
                    attempt += 1;
                }
                Err(e) => {
                    error!("{} failed after {} attempt(s): {}", what, attempts, e);
                    return Err(e);
                }
            }
        }
    }

    /// Populates the mirror with a whole-image read at the base address.
    ///
    /// Does not validate anything; [`recover`](Store::recover) must run next.
    /// If every attempt fails the mirror is filled with defaults so the
    /// firmware can keep running, and nothing is written back: the medium may
    /// still hold good data that a later boot can read.
    pub(crate) fn load_mirror(&mut self) -> LoadOutcome {
        let mut image = [0u8; MIRROR_LEN];
        let result = self.with_retries("load", |store| {
            store.medium.read(store.base_address, &mut image)?;
            Ok(())
        });

        match result {
            Ok(()) => {
                debug!("loaded {} bytes from base address {}", MIRROR_LEN, self.base_address);
                self.mirror = Mirror::from_bytes(image);
                LoadOutcome::Loaded
            }
            Err(e) => {
                error!("cannot load configuration, running on defaults: {}", e);
                self.mirror = Mirror::with_defaults();
                LoadOutcome::FellBackToDefaults {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Writes the whole mirror to the medium at the base address.
    ///
    /// Segment checksums are written as they stand in the mirror; the write
    /// guards keep them current.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Medium`] if the medium keeps failing, or
    /// [`StoreError::VerifyMismatch`] if every attempt reads back different
    /// bytes. The mirror is unchanged either way.
    pub fn commit(&mut self) -> Result<(), StoreError> {
        let image = *self.mirror.as_bytes();
        self.with_retries("commit", |store| {
            store.medium.write(store.base_address, &image)?;
            if store.verify_commits {
                store.verify_image(&image)?;
            }
            Ok(())
        })?;
        info!(
            "committed {} bytes at base address {}",
            MIRROR_LEN, self.base_address
        );
        Ok(())
    }

    fn verify_image(&mut self, image: &[u8; MIRROR_LEN]) -> Result<(), StoreError> {
        let mut readback = [0u8; MIRROR_LEN];
        self.medium.read(self.base_address, &mut readback)?;
        let mismatched = image
            .iter()
            .zip(readback.iter())
            .filter(|(a, b)| a != b)
            .count();
        if mismatched != 0 {
            return Err(StoreError::VerifyMismatch {
                mismatched,
                len: MIRROR_LEN,
            });
        }
        Ok(())
    }

    /// Erases the entire medium, not just the image.
    ///
    /// The mirror keeps its contents for the rest of the session. On the next
    /// boot every segment fails its check and the rewritable ones are
    /// restored to defaults in a single commit, which makes this the factory
    /// reset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Medium`] if the erase keeps failing.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        warn!(
            "erasing {} bytes of configuration medium",
            self.medium.capacity()
        );
        self.with_retries("clear", |store| {
            store.medium.clear()?;
            Ok(())
        })?;
        info!("configuration medium erased; defaults apply from next boot");
        Ok(())
    }
}
