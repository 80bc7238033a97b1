use std::path::Path;

/// Extension of the top-n cache stored next to a fragment.
pub const CACHE_EXTENSION: &'static str = "cache";

/// Extension of a fragment snapshot that is still being written.
pub const SNAPSHOTTING_EXTENSION: &'static str = "snapshotting";

/// FileKind identifies a data file by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A fragment's bitmap container file. Fragment files carry no extension.
    Bitmap,
    Cache,
    Snapshotting,
    /// No handler applies to the file.
    Unhandled,
}

impl FileKind {
    pub fn classify(path: impl AsRef<Path>) -> Self {
        let name = match path.as_ref().file_name() {
            Some(name) => name.to_string_lossy(),
            None => return Self::Bitmap,
        };

        match name.rfind('.') {
            None => Self::Bitmap,
            Some(i) => match &name[i + 1..] {
                CACHE_EXTENSION => Self::Cache,
                SNAPSHOTTING_EXTENSION => Self::Snapshotting,
                _ => Self::Unhandled,
            },
        }
    }
}
