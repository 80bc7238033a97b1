use std::io;

use pilosa_roaring::DecodeError;
use pilosa_storage::StorageError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bad column count: {0}")]
    MalformedRecord(usize),

    #[error("invalid bitmap id: {0:?}")]
    InvalidBitmapId(String),

    #[error("invalid profile id: {0:?}")]
    InvalidProfileId(String),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: DecodeError,
    },

    #[error("path required")]
    PathRequired,

    #[error("database required")]
    DatabaseRequired,

    #[error("frame required")]
    FrameRequired,

    #[error("output file required")]
    OutputRequired,

    #[error("backup file required")]
    BackupFileRequired,

    #[error("op required")]
    OpRequired,

    #[error("unknown bench op: {0:?}")]
    UnknownBenchOp(String),

    #[error("operation count required")]
    CountRequired,

    #[error(transparent)]
    Client(#[from] anyhow::Error),
}
