//! Commands that talk to a running cluster.
//!
//! The transport is not part of this crate: commands are written against
//! [`ClusterClient`] and take the client from the caller.

use std::collections::HashMap;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::bit::Bit;

pub mod backup;
pub mod bench;
pub mod export;
pub mod import;
mod unconnected;

#[cfg(test)]
pub(crate) mod mock;

pub use backup::{BackupCommand, RestoreCommand};
pub use bench::BenchCommand;
pub use export::ExportCommand;
pub use import::ImportCommand;
pub use unconnected::UnconnectedClient;

/// QueryResult is the raw response of a query.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub results: Vec<String>,
}

#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// import sets the bits of one slice of a frame.
    async fn import(&self, db: &str, frame: &str, slice: u64, bits: &[Bit]) -> anyhow::Result<()>;

    /// export_csv writes the bits of one slice of a frame as CSV rows.
    async fn export_csv(
        &self,
        db: &str,
        frame: &str,
        slice: u64,
        w: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> anyhow::Result<()>;

    /// backup_to streams an archive of a frame from across the cluster.
    async fn backup_to(
        &self,
        w: &mut (dyn AsyncWrite + Send + Unpin),
        db: &str,
        frame: &str,
    ) -> anyhow::Result<()>;

    /// restore_from restores a frame from an archive.
    async fn restore_from(
        &self,
        r: &mut (dyn AsyncRead + Send + Unpin),
        db: &str,
        frame: &str,
    ) -> anyhow::Result<()>;

    /// max_slice_by_database returns the highest slice index of each database.
    async fn max_slice_by_database(&self) -> anyhow::Result<HashMap<String, u64>>;

    async fn execute_query(
        &self,
        db: &str,
        query: &str,
        allow_write: bool,
    ) -> anyhow::Result<QueryResult>;
}
