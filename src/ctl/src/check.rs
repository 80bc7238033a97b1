use std::io::Write;
use std::path::{Path, PathBuf};

use pilosa_roaring::Codec;
use pilosa_storage::MmapFile;

use crate::classify::FileKind;
use crate::{Error, Result};

/// CheckCommand performs a consistency check on fragment data files.
///
/// Defects found in a file are reported and do not stop the run. Any
/// failure to open, map or decode a file aborts the remaining paths.
#[derive(Debug, Clone)]
pub struct CheckCommand {
    pub paths: Vec<PathBuf>,
}

impl CheckCommand {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn run(
        &self,
        codec: &dyn Codec,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        for path in &self.paths {
            match FileKind::classify(path) {
                FileKind::Bitmap => {
                    let defects = check_bitmap_file(path, codec, stdout)?;
                    tracing::info!(path = %path.display(), defects, "checked");
                }
                FileKind::Cache => {
                    writeln!(stderr, "{}: ignoring cache file", path.display())?;
                }
                FileKind::Snapshotting => {
                    writeln!(stderr, "{}: ignoring snapshot file", path.display())?;
                }
                FileKind::Unhandled => {
                    tracing::debug!(path = %path.display(), "skipping unhandled file");
                }
            }
        }

        Ok(())
    }
}

/// check_bitmap_file prints one line per defect followed by an `ok` line.
/// Returns the number of defects.
fn check_bitmap_file(path: &Path, codec: &dyn Codec, w: &mut dyn Write) -> Result<usize> {
    let mmap = MmapFile::open(path)?;
    let bm = codec
        .decode(mmap.as_slice())
        .map_err(|source| Error::Decode {
            path: path.display().to_string(),
            source,
        })?;

    let mut defects = 0;
    if let Err(err) = bm.check() {
        for defect in err.defects() {
            writeln!(w, "{}: {}", path.display(), defect)?;
            defects += 1;
        }
    }

    // Printed even when defects were listed above.
    writeln!(w, "{}: ok", path.display())?;

    Ok(defects)
}
