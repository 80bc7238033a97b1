use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::cluster::ClusterClient;
use crate::{Error, Result};

/// BackupCommand backs up a frame from across the cluster into a single file.
#[derive(Debug, Clone, Default)]
pub struct BackupCommand {
    pub database: String,
    pub frame: String,
    pub path: Option<PathBuf>,
}

impl BackupCommand {
    pub async fn run(&self, client: &dyn ClusterClient) -> Result<()> {
        let path = self.path.as_ref().ok_or(Error::OutputRequired)?;

        let mut f = File::create(path).await.map_err(|source| Error::Open {
            path: path.display().to_string(),
            source,
        })?;

        if let Err(e) = client.backup_to(&mut f, &self.database, &self.frame).await {
            drop(f);
            if let Err(rm) = tokio::fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %rm, "remove partial backup");
            }
            return Err(e.into());
        }

        // sync before reporting success so the archive is durable
        f.flush().await?;
        f.sync_all().await?;
        tracing::info!(db = %self.database, frame = %self.frame, path = %path.display(), "backup complete");

        Ok(())
    }
}

/// RestoreCommand restores a frame to the cluster from a backup file.
#[derive(Debug, Clone, Default)]
pub struct RestoreCommand {
    pub database: String,
    pub frame: String,
    pub path: Option<PathBuf>,
}

impl RestoreCommand {
    pub async fn run(&self, client: &dyn ClusterClient) -> Result<()> {
        let path = self.path.as_ref().ok_or(Error::BackupFileRequired)?;

        let mut f = File::open(path).await.map_err(|source| Error::Open {
            path: path.display().to_string(),
            source,
        })?;

        client
            .restore_from(&mut f, &self.database, &self.frame)
            .await?;
        tracing::info!(db = %self.database, frame = %self.frame, path = %path.display(), "restore complete");

        Ok(())
    }
}
