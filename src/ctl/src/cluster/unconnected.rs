use std::collections::HashMap;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::bit::Bit;
use crate::cluster::{ClusterClient, QueryResult};

/// UnconnectedClient stands in for a cluster when no transport is
/// configured. Every call fails naming the requested host.
#[derive(Debug, Clone)]
pub struct UnconnectedClient {
    host: String,
}

impl UnconnectedClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    fn err<T>(&self) -> anyhow::Result<T> {
        Err(anyhow::anyhow!(
            "{}: no cluster transport configured",
            self.host
        ))
    }
}

#[async_trait]
impl ClusterClient for UnconnectedClient {
    async fn import(
        &self,
        _db: &str,
        _frame: &str,
        _slice: u64,
        _bits: &[Bit],
    ) -> anyhow::Result<()> {
        self.err()
    }

    async fn export_csv(
        &self,
        _db: &str,
        _frame: &str,
        _slice: u64,
        _w: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> anyhow::Result<()> {
        self.err()
    }

    async fn backup_to(
        &self,
        _w: &mut (dyn AsyncWrite + Send + Unpin),
        _db: &str,
        _frame: &str,
    ) -> anyhow::Result<()> {
        self.err()
    }

    async fn restore_from(
        &self,
        _r: &mut (dyn AsyncRead + Send + Unpin),
        _db: &str,
        _frame: &str,
    ) -> anyhow::Result<()> {
        self.err()
    }

    async fn max_slice_by_database(&self) -> anyhow::Result<HashMap<String, u64>> {
        self.err()
    }

    async fn execute_query(
        &self,
        _db: &str,
        _query: &str,
        _allow_write: bool,
    ) -> anyhow::Result<QueryResult> {
        self.err()
    }
}
