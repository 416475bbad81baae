//! Replays recorded task events through the job pipeline.
//!
//! Usage:
//!
//! ```text
//! replay <config-path> <events-path> [artifacts-path]
//! ```
//!
//! `config-path` holds a JSON [`BridgeConfig`]. `events-path` holds one JSON
//! [`TaskEvent`] per line. The optional `artifacts-path` holds a JSON array
//! of [`ArtifactFixture`] entries served by the in-memory artifact lister:
//!
//! ```json
//! [
//!   {
//!     "taskId": "fB7ZGTtaQ3SIqgsH1nq2aA",
//!     "runId": 0,
//!     "artifacts": ["public/logs/live_backing.log", "public/build/target.zip"]
//!   }
//! ]
//! ```
//!
//! Every published job is written to stdout as one JSON line. Logs go to
//! stderr and honour `RUST_LOG`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use taskcluster_treeherder::config::{BridgeConfig, ConfigError};
use taskcluster_treeherder::job::{
    adapters::{
        ChannelJobPublisher, PublishedJob,
        memory::{ArtifactFixture, InMemoryArtifactLister},
    },
    services::{JobPipeline, TaskEvent},
};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Builder;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Queue depth between the reader, the pipeline and the writer.
const CHANNEL_CAPACITY: usize = 64;
/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "taskcluster_treeherder=info,replay=info";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while replaying events.
#[derive(Debug, Error)]
enum ReplayError {
    #[error("usage: replay <config-path> <events-path> [artifacts-path]")]
    Usage,
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid event on line {line}: {source}")]
    Event {
        line: usize,
        source: serde_json::Error,
    },
    #[error("invalid artifact fixture: {0}")]
    Fixture(serde_json::Error),
    #[error("failed to encode published job: {0}")]
    Encode(serde_json::Error),
    #[error("pipeline stopped before all events were submitted")]
    PipelineClosed,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Parsed command-line arguments.
struct ReplayArgs {
    config: PathBuf,
    events: PathBuf,
    artifacts: Option<PathBuf>,
}

impl ReplayArgs {
    fn parse(args: impl IntoIterator<Item = OsString>) -> Result<Self, ReplayError> {
        let mut positional = args.into_iter().map(PathBuf::from);
        let config = positional.next().ok_or(ReplayError::Usage)?;
        let events = positional.next().ok_or(ReplayError::Usage)?;
        let artifacts = positional.next();
        if positional.next().is_some() {
            return Err(ReplayError::Usage);
        }
        Ok(Self {
            config,
            events,
            artifacts,
        })
    }
}

fn main() -> Result<(), BoxError> {
    init_tracing();
    let args = ReplayArgs::parse(std::env::args_os().skip(1))?;
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(replay(args))
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn replay(args: ReplayArgs) -> Result<(), BoxError> {
    let config = BridgeConfig::from_json_file(&args.config)?;
    let events = read_events(&args.events).await?;
    let fixtures = match &args.artifacts {
        Some(path) => read_fixtures(path).await?,
        None => Vec::new(),
    };
    tracing::info!(
        events = events.len(),
        fixtures = fixtures.len(),
        workers = config.worker_count,
        "starting replay"
    );

    let lister = Arc::new(InMemoryArtifactLister::from_fixtures(fixtures));
    let (publisher, outbound_jobs) = ChannelJobPublisher::channel(CHANNEL_CAPACITY);
    let pipeline = JobPipeline::from_config(&config, lister, Arc::new(publisher));

    let writer = tokio::spawn(write_jobs(outbound_jobs));
    let (inbound, receiver) = mpsc::channel(CHANNEL_CAPACITY);
    let running = tokio::spawn(pipeline.run(receiver));

    for event in events {
        inbound
            .send(event)
            .await
            .map_err(|_| ReplayError::PipelineClosed)?;
    }
    drop(inbound);

    let summary = running.await?;
    let written = writer.await??;
    tracing::info!(
        written,
        rejected = summary.rejected,
        partially_linked = summary.partially_linked,
        lost = summary.lost,
        "replay finished"
    );
    Ok(())
}

async fn read_events(path: &Path) -> Result<Vec<TaskEvent>, ReplayError> {
    let raw = read_file(path).await?;
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ReplayError::Event {
                line: index + 1,
                source,
            })
        })
        .collect()
}

async fn read_fixtures(path: &Path) -> Result<Vec<ArtifactFixture>, ReplayError> {
    let raw = read_file(path).await?;
    serde_json::from_str(&raw).map_err(ReplayError::Fixture)
}

async fn read_file(path: &Path) -> Result<String, ReplayError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReplayError::Read {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_jobs(mut jobs: mpsc::Receiver<PublishedJob>) -> Result<usize, BoxError> {
    let mut stdout = tokio::io::stdout();
    let mut written = 0;
    while let Some(entry) = jobs.recv().await {
        let mut line = serde_json::to_string(&entry).map_err(ReplayError::Encode)?;
        line.push('\n');
        stdout.write_all(line.as_bytes()).await?;
        written += 1;
    }
    stdout.flush().await?;
    Ok(written)
}
