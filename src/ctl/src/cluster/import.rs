use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::bit::{csv_reader, read_row, Bit};
use crate::cluster::ClusterClient;
use crate::sort::DEFAULT_BIT_CAPACITY;
use crate::{Error, Result};

/// Number of bits buffered before they are sent to the cluster.
pub const DEFAULT_BUFFER_SIZE: usize = 10_000_000;

/// ImportCommand bulk loads CSV bit files into a frame.
///
/// Rows are buffered and sent one slice at a time whenever the buffer
/// fills. A bad row aborts the import; batches sent before it stay applied.
#[derive(Debug, Clone)]
pub struct ImportCommand {
    pub database: String,
    pub frame: String,
    pub paths: Vec<PathBuf>,
    pub buffer_size: usize,
}

impl Default for ImportCommand {
    fn default() -> Self {
        Self {
            database: String::new(),
            frame: String::new(),
            paths: Vec::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ImportCommand {
    pub async fn run(&self, client: &dyn ClusterClient) -> Result<()> {
        if self.database.is_empty() {
            return Err(Error::DatabaseRequired);
        } else if self.frame.is_empty() {
            return Err(Error::FrameRequired);
        } else if self.paths.is_empty() {
            return Err(Error::PathRequired);
        }

        for path in &self.paths {
            self.import_path(client, path).await?;
        }

        Ok(())
    }

    async fn import_path(&self, client: &dyn ClusterClient, path: &Path) -> Result<()> {
        let f = File::open(path).map_err(|source| Error::Open {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), "importing");

        let buffer_size = self.buffer_size.max(1);
        let mut r = csv_reader(f);
        let mut record = StringRecord::new();
        let mut bits = Vec::with_capacity(buffer_size.min(DEFAULT_BIT_CAPACITY));

        while r.read_record(&mut record)? {
            if let Some(bit) = read_row(&record)? {
                bits.push(bit);
            }

            if bits.len() >= buffer_size {
                self.import_bits(client, &mut bits).await?;
            }
        }

        if !bits.is_empty() {
            self.import_bits(client, &mut bits).await?;
        }

        Ok(())
    }

    /// import_bits sends the buffered bits grouped by slice and empties the
    /// buffer.
    async fn import_bits(&self, client: &dyn ClusterClient, bits: &mut Vec<Bit>) -> Result<()> {
        let mut by_slice: BTreeMap<u64, Vec<Bit>> = BTreeMap::new();
        for bit in bits.drain(..) {
            by_slice.entry(bit.slice()).or_default().push(bit);
        }

        for (slice, bits) in by_slice {
            tracing::info!(slice, n = bits.len(), "importing slice");
            client
                .import(&self.database, &self.frame, slice, &bits)
                .await?;
        }

        Ok(())
    }
}
