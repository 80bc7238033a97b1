use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};

use crate::StorageError;

/// MmapFile is a read-only, shared mapping of a whole file.
///
/// The mapping lives exactly as long as the value: every slice handed out
/// borrows from it, and dropping it unmaps the region.
pub struct MmapFile {
    path: PathBuf,
    len: usize,
    mmap: Mmap,
}

impl MmapFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_owned();
        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        let f = File::open(&path).map_err(io_err)?;
        let meta = f.metadata().map_err(io_err)?;
        let len = meta.len() as usize;

        let mmap = unsafe { MmapOptions::new().offset(0).len(len).map(&f) }.map_err(|source| {
            StorageError::Map {
                path: path.clone(),
                source,
            }
        })?;
        tracing::debug!(path = %path.display(), len, "mapped file");

        // the descriptor is not needed once the region is mapped
        drop(f);

        Ok(Self { path, len, mmap })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// offset_of returns the byte offset of `data` from the start of the
    /// mapping, or None when `data` does not start inside the mapped region.
    pub fn offset_of(&self, data: &[u8]) -> Option<u64> {
        let base = self.mmap.as_ptr() as usize;
        let ptr = data.as_ptr() as usize;
        if ptr < base || ptr > base + self.len {
            return None;
        }
        Some((ptr - base) as u64)
    }
}

impl Deref for MmapFile {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl Drop for MmapFile {
    fn drop(&mut self) {
        tracing::debug!(path = %self.path.display(), "unmapping file");
    }
}
