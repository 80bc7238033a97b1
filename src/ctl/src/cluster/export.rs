use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::cluster::ClusterClient;
use crate::{Error, Result};

/// ExportCommand bulk exports a frame to CSV, one slice at a time.
///
/// Rows are written to `path` when set, otherwise to stdout.
#[derive(Debug, Clone, Default)]
pub struct ExportCommand {
    pub database: String,
    pub frame: String,
    pub path: Option<PathBuf>,
}

impl ExportCommand {
    pub async fn run<W>(&self, client: &dyn ClusterClient, stdout: &mut W) -> Result<()>
    where
        W: AsyncWrite + Send + Unpin,
    {
        if self.database.is_empty() {
            return Err(Error::DatabaseRequired);
        } else if self.frame.is_empty() {
            return Err(Error::FrameRequired);
        }

        match &self.path {
            Some(path) => {
                let mut f = File::create(path).await.map_err(|source| Error::Open {
                    path: path.display().to_string(),
                    source,
                })?;
                self.export(client, &mut f).await?;
                f.flush().await?;
                f.sync_all().await?;
            }
            None => {
                self.export(client, &mut *stdout).await?;
                stdout.flush().await?;
            }
        }

        Ok(())
    }

    async fn export(
        &self,
        client: &dyn ClusterClient,
        w: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<()> {
        let max_slices = client.max_slice_by_database().await?;
        let max_slice = max_slices.get(&self.database).copied().unwrap_or(0);

        for slice in 0..=max_slice {
            tracing::info!(db = %self.database, frame = %self.frame, slice, "exporting slice");
            client
                .export_csv(&self.database, &self.frame, slice, w)
                .await?;
        }

        Ok(())
    }
}
