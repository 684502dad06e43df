//! # Config - store settings
//!
//! Runtime settings for the configuration store and its backing medium.
//! Every setting has a default and can be overridden through an environment
//! variable:
//!
//! ```text
//! NVM_PATH          backing file path                    (default: "nvm.bin")
//! NVM_CAPACITY      backing medium size in bytes         (default: 512)
//! NVM_BASE_ADDRESS  offset of the mirror on the medium   (default: 0)
//! NVM_SYNC          fsync after every write              (default: "true")
//! NVM_IO_RETRIES    extra attempts per load/commit/clear (default: 1)
//! NVM_VERIFY        read back and compare after commit   (default: "true")
//! ```
//!
//! Unlike a silent fallback, a variable that is present but cannot be parsed
//! is reported as an error naming the variable.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Default backing file path.
pub const DEFAULT_PATH: &str = "nvm.bin";
/// Default backing medium size in bytes.
pub const DEFAULT_CAPACITY: usize = 512;
/// Default offset of the mirror image on the medium.
pub const DEFAULT_BASE_ADDRESS: usize = 0;
/// Default number of extra attempts after a failed medium operation.
pub const DEFAULT_IO_RETRIES: u32 = 1;

/// Settings shared by the store and the medium it runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// File emulating the non-volatile medium.
    pub path: PathBuf,
    /// Size of the medium in bytes. Must hold `base_address + mirror length`.
    pub capacity: usize,
    /// Byte offset at which the mirror image is loaded and committed.
    pub base_address: usize,
    /// If `true`, every medium write is followed by `sync_all()`.
    pub sync: bool,
    /// Extra attempts after a failed load, commit or clear.
    pub io_retries: u32,
    /// If `true`, every commit is read back and compared with the mirror.
    pub verify_commits: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            capacity: DEFAULT_CAPACITY,
            base_address: DEFAULT_BASE_ADDRESS,
            sync: true,
            io_retries: DEFAULT_IO_RETRIES,
            verify_commits: true,
        }
    }
}

impl StoreConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Missing keys take their defaults. Used by [`from_env`](Self::from_env)
    /// and by tests that must not touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let path = lookup("NVM_PATH").map(PathBuf::from).unwrap_or(defaults.path);
        let capacity = parse_or(&lookup, "NVM_CAPACITY", defaults.capacity)?;
        let base_address = parse_or(&lookup, "NVM_BASE_ADDRESS", defaults.base_address)?;
        let sync = parse_or(&lookup, "NVM_SYNC", defaults.sync)?;
        let io_retries = parse_or(&lookup, "NVM_IO_RETRIES", defaults.io_retries)?;
        let verify_commits = parse_or(&lookup, "NVM_VERIFY", defaults.verify_commits)?;

        anyhow::ensure!(capacity > 0, "NVM_CAPACITY must be greater than zero");
        anyhow::ensure!(
            base_address < capacity,
            "NVM_BASE_ADDRESS ({}) must lie inside the medium (capacity {})",
            base_address,
            capacity
        );

        Ok(Self {
            path,
            capacity,
            base_address,
            sync,
            io_retries,
            verify_commits,
        })
    }

    /// Total number of attempts for a single medium operation.
    #[must_use]
    pub fn io_attempts(&self) -> u32 {
        self.io_retries.saturating_add(1)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
