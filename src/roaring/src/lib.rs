//! Contract between the file tooling and a bitmap container codec.
//!
//! A [`Codec`] turns the raw bytes of a data file into a [`DecodedBitmap`]
//! that borrows from those bytes. The tooling never looks inside a
//! container itself; it only reads the directory exposed by
//! [`DecodedBitmap::info`] and the verdict of [`DecodedBitmap::check`].

use std::fmt::{Display, Formatter};

pub mod portable;

pub use portable::PortableCodec;

/// Codec decodes the serialized form of a bitmap.
pub trait Codec {
    fn decode<'a>(&self, data: &'a [u8]) -> Result<Box<dyn DecodedBitmap<'a> + 'a>, DecodeError>;
}

/// DecodedBitmap is a bitmap attached to the bytes it was decoded from.
pub trait DecodedBitmap<'a> {
    /// info returns the container directory and pending op count.
    fn info(&self) -> BitmapInfo<'a>;

    /// check validates the internal consistency of the bitmap. Several
    /// independent defects may be reported in a single pass.
    fn check(&self) -> Result<(), CheckError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Array,
    Run,
    Bitmap,
}

impl Display for ContainerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Array => write!(f, "array"),
            Self::Run => write!(f, "run"),
            Self::Bitmap => write!(f, "bitmap"),
        }
    }
}

/// ContainerInfo describes a single physical container.
#[derive(Debug, Clone)]
pub struct ContainerInfo<'a> {
    pub key: u64,
    pub kind: ContainerKind,
    /// cardinality
    pub n: u32,
    /// allocated size in bytes
    pub alloc: u32,
    /// the container payload, borrowed from the decoded bytes
    pub data: &'a [u8],
}

/// BitmapInfo holds the container directory of a bitmap.
#[derive(Debug, Clone, Default)]
pub struct BitmapInfo<'a> {
    pub containers: Vec<ContainerInfo<'a>>,
    /// number of pending operations not yet compacted into containers
    pub op_n: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid cookie: {0:#x}")]
    InvalidCookie(u32),

    #[error("short {what}: need {need} bytes, have {have}")]
    Short {
        what: &'static str,
        need: usize,
        have: usize,
    },

    #[error("container {key} out of bounds: ends at {end}, data is {len} bytes")]
    ContainerOutOfBounds { key: u64, end: usize, len: usize },
}

/// ErrorList is an ordered list of structural defects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList(Vec<String>);

impl ErrorList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, err: impl Into<String>) {
        self.0.push(err.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    /// into_result returns Ok when no defect was recorded.
    pub fn into_result(self) -> Result<(), CheckError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CheckError::List(self))
        }
    }
}

impl From<Vec<String>> for ErrorList {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl Display for ErrorList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CheckError {
    #[error("{0}")]
    Single(String),

    #[error("{0}")]
    List(ErrorList),
}

impl CheckError {
    /// defects flattens the error into one message per defect.
    pub fn defects(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::List(list) => list.iter().collect(),
        }
    }
}
