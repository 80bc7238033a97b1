use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use pilosa_roaring::{BitmapInfo, Codec};
use pilosa_storage::MmapFile;
use pilosa_utils::time::format_elapsed;
use tabwriter::TabWriter;

use crate::{Error, Result};

/// InspectCommand prints the container directory of a fragment data file.
/// The file is mapped read-only and never modified.
#[derive(Debug, Clone)]
pub struct InspectCommand {
    pub path: PathBuf,
}

impl InspectCommand {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn run(
        &self,
        codec: &dyn Codec,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        let mmap = MmapFile::open(&self.path)?;

        let t = Instant::now();
        write!(stderr, "unmarshaling bitmap...")?;
        let bm = match codec.decode(mmap.as_slice()) {
            Ok(bm) => bm,
            Err(source) => {
                writeln!(stderr)?;
                return Err(Error::Decode {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };
        writeln!(stderr, " ({})", format_elapsed(t.elapsed()))?;

        let t = Instant::now();
        write!(stderr, "calculating stats...")?;
        let info = bm.info();
        writeln!(stderr, " ({})", format_elapsed(t.elapsed()))?;

        tracing::info!(
            path = %self.path.display(),
            containers = info.containers.len(),
            ops = info.op_n,
            "inspected"
        );

        write_info(&mmap, &info, stdout)
    }
}

fn write_info(mmap: &MmapFile, info: &BitmapInfo<'_>, w: &mut dyn Write) -> Result<()> {
    writeln!(w, "== Bitmap Info ==")?;
    writeln!(w, "Containers: {}", info.containers.len())?;
    writeln!(w, "Operations: {}", info.op_n)?;
    writeln!(w)?;

    writeln!(w, "== Containers ==")?;
    let mut tw = TabWriter::new(&mut *w).minwidth(0).padding(1);
    writeln!(tw, "KEY\tTYPE\t{:>8}\t{:>8}\tOFFSET", "N", "ALLOC")?;
    for c in &info.containers {
        write!(tw, "{}\t{}\t{:>8}\t{:>8}\t", c.key, c.kind, c.n, c.alloc)?;
        match mmap.offset_of(c.data) {
            Some(offset) => writeln!(tw, "0x{:08x}", offset)?,
            None => writeln!(tw, "-")?,
        }
    }
    tw.flush()?;
    drop(tw);
    w.flush()?;

    Ok(())
}
