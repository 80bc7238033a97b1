use std::io;
use std::path::PathBuf;

pub mod mmap;

pub use mmap::MmapFile;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("mmap {path}: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
