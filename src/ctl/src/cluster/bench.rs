use std::time::Instant;

use pilosa_utils::time::format_elapsed;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::cluster::ClusterClient;
use crate::{Error, Result};

const MAX_BITMAP_ID: u64 = 1000;
const MAX_PROFILE_ID: u64 = 100000;

/// BenchCommand executes a benchmark for a given operation against a database.
#[derive(Debug, Clone, Default)]
pub struct BenchCommand {
    pub database: String,
    pub frame: String,

    /// name of the operation to execute
    pub op: String,
    /// number of iterations
    pub n: usize,
}

impl BenchCommand {
    pub async fn run<W>(&self, client: &dyn ClusterClient, stdout: &mut W) -> Result<()>
    where
        W: AsyncWrite + Send + Unpin,
    {
        match self.op.as_str() {
            "set-bit" => self.run_set_bit(client, stdout).await,
            "" => Err(Error::OpRequired),
            op => Err(Error::UnknownBenchOp(op.to_string())),
        }
    }

    /// run_set_bit executes a benchmark of random SetBit() operations.
    async fn run_set_bit<W>(&self, client: &dyn ClusterClient, stdout: &mut W) -> Result<()>
    where
        W: AsyncWrite + Send + Unpin,
    {
        if self.n == 0 {
            return Err(Error::CountRequired);
        } else if self.database.is_empty() {
            return Err(Error::DatabaseRequired);
        } else if self.frame.is_empty() {
            return Err(Error::FrameRequired);
        }

        let mut rng = StdRng::from_entropy();
        let t = Instant::now();

        for _ in 0..self.n {
            let bitmap_id = rng.gen_range(0..MAX_BITMAP_ID);
            let profile_id = rng.gen_range(0..MAX_PROFILE_ID);

            let q = format!(
                r#"SetBit(id={}, frame="{}", profileID={})"#,
                bitmap_id, self.frame, profile_id
            );
            client.execute_query(&self.database, &q, true).await?;
        }

        let elapsed = t.elapsed();
        let line = format!(
            "Executed {} operations in {} ({:.3} op/sec)\n",
            self.n,
            format_elapsed(elapsed),
            self.n as f64 / elapsed.as_secs_f64()
        );
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;

        Ok(())
    }
}
