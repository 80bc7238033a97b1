use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use pilosa_ctl::check::CheckCommand;
use pilosa_ctl::cluster::import::DEFAULT_BUFFER_SIZE;
use pilosa_ctl::cluster::{
    BackupCommand, BenchCommand, ExportCommand, ImportCommand, RestoreCommand, UnconnectedClient,
};
use pilosa_ctl::inspect::InspectCommand;
use pilosa_ctl::sort::SortCommand;
use pilosa_roaring::PortableCodec;
use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Pilosactl is a tool for interacting with a pilosa server and its data files.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Parser)]
#[clap(name = "pilosactl", about, version)]
struct Config {
    /// Log progress to stderr; RUST_LOG overrides the level
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Subcommand)]
enum Command {
    /// Imports data from a CSV file
    Import(ImportArgs),

    /// Exports data to a CSV file
    Export(OutputArgs),

    /// Sorts a data file for optimal import speed
    ///
    /// The file is CSV with rows of BITMAPID,PROFILEID[,TIMESTAMP] and no
    /// header. The sorted rows are written to STDOUT.
    Sort(PathArg),

    /// Backs up a frame to an archive file
    Backup(OutputArgs),

    /// Restores a frame from an archive file
    Restore(RestoreArgs),

    /// Inspects a fragment data file and prints container stats
    Inspect(PathArg),

    /// Performs a consistency check of fragment data files
    Check(PathsArg),

    /// Benchmarks operations
    Bench(BenchArgs),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Args)]
struct PathArg {
    pub path: PathBuf,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Args)]
struct PathsArg {
    #[clap(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Args)]
struct ClusterArgs {
    /// host:port of the cluster
    #[clap(long, default_value = "localhost:15000")]
    pub host: String,

    #[clap(short = 'd', long, default_value = "")]
    pub database: String,

    #[clap(short = 'f', long, default_value = "")]
    pub frame: String,
}

impl ClusterArgs {
    fn client(&self) -> UnconnectedClient {
        UnconnectedClient::new(self.host.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Args)]
struct ImportArgs {
    #[clap(flatten)]
    pub cluster: ClusterArgs,

    /// Number of bits to buffer before sending them to the cluster
    #[clap(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    pub paths: Vec<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Args)]
struct OutputArgs {
    #[clap(flatten)]
    pub cluster: ClusterArgs,

    /// Output file
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Args)]
struct RestoreArgs {
    #[clap(flatten)]
    pub cluster: ClusterArgs,

    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Args)]
struct BenchArgs {
    #[clap(flatten)]
    pub cluster: ClusterArgs,

    /// Operation to execute, e.g. set-bit
    #[clap(long, default_value = "")]
    pub op: String,

    /// Number of operations to execute
    #[clap(short = 'n', default_value_t = 0)]
    pub n: usize,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("off")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

async fn run(config: Config, stdout: &mut dyn Write, stderr: &mut dyn Write) -> anyhow::Result<()> {
    match config.command {
        Command::Import(arg) => {
            let client = arg.cluster.client();
            let cmd = ImportCommand {
                database: arg.cluster.database,
                frame: arg.cluster.frame,
                paths: arg.paths,
                buffer_size: arg.buffer_size,
            };
            cmd.run(&client).await?
        }
        Command::Export(arg) => {
            let client = arg.cluster.client();
            let cmd = ExportCommand {
                database: arg.cluster.database,
                frame: arg.cluster.frame,
                path: arg.output,
            };
            cmd.run(&client, &mut tokio::io::stdout()).await?
        }
        Command::Sort(arg) => SortCommand::new(arg.path).run(stdout)?,
        Command::Backup(arg) => {
            let client = arg.cluster.client();
            let cmd = BackupCommand {
                database: arg.cluster.database,
                frame: arg.cluster.frame,
                path: arg.output,
            };
            cmd.run(&client).await?
        }
        Command::Restore(arg) => {
            let client = arg.cluster.client();
            let cmd = RestoreCommand {
                database: arg.cluster.database,
                frame: arg.cluster.frame,
                path: arg.path,
            };
            cmd.run(&client).await?
        }
        Command::Inspect(arg) => {
            InspectCommand::new(arg.path).run(&PortableCodec, stdout, stderr)?
        }
        Command::Check(arg) => CheckCommand::new(arg.paths).run(&PortableCodec, stdout, stderr)?,
        Command::Bench(arg) => {
            let client = arg.cluster.client();
            let cmd = BenchCommand {
                database: arg.cluster.database,
                frame: arg.cluster.frame,
                op: arg.op,
                n: arg.n,
            };
            cmd.run(&client, &mut tokio::io::stdout()).await?
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_tracing(config.verbose);

    eprintln!("pilosactl {}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(?config, "config");

    let ret = {
        let mut stdout = io::stdout().lock();
        let mut stderr = io::stderr().lock();
        run(config, &mut stdout, &mut stderr).await
    };

    // error messages already carry their cause
    if let Err(err) = ret {
        eprintln!("{}", err);
        process::exit(1);
    }
}
