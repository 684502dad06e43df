use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::{check_range, Medium, MediumError, ERASED_BYTE};

/// A fixed-size file emulating an EEPROM.
///
/// The file is created on first use and padded with [`ERASED_BYTE`] up to
/// `capacity`, so a new file behaves like a blank part. Bytes beyond
/// `capacity` in an existing larger file are left alone and never addressed.
#[derive(Debug)]
pub struct FileMedium {
    file: File,
    path: PathBuf,
    capacity: usize,
    sync: bool,
}

impl FileMedium {
    /// Opens (or creates) the backing file.
    ///
    /// # Arguments
    ///
    /// * `path` - file system path for the medium image.
    /// * `capacity` - addressable size in bytes.
    /// * `sync` - if true, every `write`/`clear` is followed by `sync_all()`.
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize, sync: bool) -> Result<Self, MediumError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)?;

        let existing = file.metadata()?.len() as usize;
        if existing < capacity {
            debug!(
                "padding {} from {} to {} bytes",
                path.display(),
                existing,
                capacity
            );
            file.seek(SeekFrom::Start(existing as u64))?;
            file.write_all(&vec![ERASED_BYTE; capacity - existing])?;
            file.flush()?;
            if sync {
                file.sync_all()?;
            }
        }

        Ok(Self {
            file,
            path,
            capacity,
            sync,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn finish_write(&mut self) -> Result<(), MediumError> {
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }
}

impl Medium for FileMedium {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), MediumError> {
        check_range(offset, buf.len(), self.capacity)?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), MediumError> {
        check_range(offset, data.len(), self.capacity)?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(data)?;
        self.finish_write()
    }

    fn clear(&mut self) -> Result<(), MediumError> {
        debug!("erasing {} ({} bytes)", self.path.display(), self.capacity);
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&vec![ERASED_BYTE; self.capacity])?;
        self.finish_write()
    }
}
