use std::collections::HashMap;
use std::sync::Mutex;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::bit::Bit;
use crate::cluster::{ClusterClient, QueryResult};

/// MockClient serves a fixed archive and records every call.
#[derive(Default)]
pub(crate) struct MockClient {
    pub max_slices: HashMap<String, u64>,
    pub archive: Vec<u8>,
    pub calls: Mutex<Vec<String>>,
    pub restored: Mutex<Vec<u8>>,
    pub imported: Mutex<Vec<(u64, Vec<Bit>)>>,
}

impl MockClient {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ClusterClient for MockClient {
    async fn import(&self, db: &str, frame: &str, slice: u64, bits: &[Bit]) -> anyhow::Result<()> {
        self.record(format!("import {} {} {} {}", db, frame, slice, bits.len()));
        self.imported.lock().unwrap().push((slice, bits.to_vec()));
        Ok(())
    }

    async fn export_csv(
        &self,
        db: &str,
        frame: &str,
        slice: u64,
        w: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> anyhow::Result<()> {
        self.record(format!("export {} {} {}", db, frame, slice));
        w.write_all(format!("{},{}\n", slice, slice * 10).as_bytes())
            .await?;
        Ok(())
    }

    async fn backup_to(
        &self,
        w: &mut (dyn AsyncWrite + Send + Unpin),
        db: &str,
        frame: &str,
    ) -> anyhow::Result<()> {
        self.record(format!("backup {} {}", db, frame));
        w.write_all(&self.archive).await?;
        Ok(())
    }

    async fn restore_from(
        &self,
        r: &mut (dyn AsyncRead + Send + Unpin),
        db: &str,
        frame: &str,
    ) -> anyhow::Result<()> {
        self.record(format!("restore {} {}", db, frame));
        let mut buf = Vec::new();
        r.read_to_end(&mut buf).await?;
        *self.restored.lock().unwrap() = buf;
        Ok(())
    }

    async fn max_slice_by_database(&self) -> anyhow::Result<HashMap<String, u64>> {
        Ok(self.max_slices.clone())
    }

    async fn execute_query(
        &self,
        db: &str,
        query: &str,
        allow_write: bool,
    ) -> anyhow::Result<QueryResult> {
        if !allow_write {
            return Err(anyhow::anyhow!("write not allowed"));
        }
        self.record(format!("query {} {}", db, query));
        Ok(QueryResult::default())
    }
}
