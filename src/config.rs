//! Runtime configuration for the queue-to-dashboard bridge.
//!
//! Configuration is read from a JSON document whose keys use camelCase.
//! Every key is optional; omitted keys take the defaults shown below.
//!
//! ```json
//! {
//!   "routePrefix": "tc-treeherder",
//!   "queueBaseUrl": "https://queue.taskcluster.net/v1",
//!   "inspectorBaseUrl": "https://tools.taskcluster.net/task-inspector",
//!   "logArtifacts": {
//!     "public/logs/live_backing.log": "builds-4h",
//!     "public/logs/chain_of_trust.log": "chain-of-trust"
//!   },
//!   "workerCount": 4
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Default route prefix identifying dashboard-bound tasks.
pub const DEFAULT_ROUTE_PREFIX: &str = "tc-treeherder";
/// Default queue API root used to build artifact URLs.
pub const DEFAULT_QUEUE_BASE_URL: &str = "https://queue.taskcluster.net/v1";
/// Default task inspector root used for `inspect` links.
pub const DEFAULT_INSPECTOR_BASE_URL: &str = "https://tools.taskcluster.net/task-inspector";
/// Default number of pipeline workers.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Errors returned while loading or validating configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: Arc<std::io::Error>,
    },

    /// The configuration document is not valid JSON for [`BridgeConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(Arc<serde_json::Error>),

    /// The route prefix is empty or contains a dot.
    #[error("route prefix '{0}' must be a single non-empty route segment")]
    InvalidRoutePrefix(String),

    /// The worker pool must have at least one worker.
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,
}

/// Mapping from exact artifact names to dashboard log labels.
///
/// Artifacts listed here are surfaced as log references in addition to
/// their regular links.
///
/// # Examples
///
/// ```
/// use taskcluster_treeherder::config::LogArtifactTable;
///
/// let table = LogArtifactTable::default();
/// assert_eq!(table.label_for("public/logs/live_backing.log"), Some("builds-4h"));
/// assert_eq!(table.label_for("public/logs/live.log"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogArtifactTable(BTreeMap<String, String>);

impl LogArtifactTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds or replaces an entry.
    #[must_use]
    pub fn with_entry(
        mut self,
        artifact_name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.0.insert(artifact_name.into(), label.into());
        self
    }

    /// Returns the log label for an artifact name, if it is a known log.
    #[must_use]
    pub fn label_for(&self, artifact_name: &str) -> Option<&str> {
        self.0.get(artifact_name).map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LogArtifactTable {
    fn default() -> Self {
        Self::empty()
            .with_entry("public/logs/live_backing.log", "builds-4h")
            .with_entry("public/logs/chain_of_trust.log", "chain-of-trust")
    }
}

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    /// First segment of routes addressed to the dashboard.
    pub route_prefix: String,
    /// Queue API root for artifact download URLs.
    pub queue_base_url: String,
    /// Task inspector root for `inspect` links.
    pub inspector_base_url: String,
    /// Artifacts surfaced as dashboard logs.
    pub log_artifacts: LogArtifactTable,
    /// Number of concurrent pipeline workers.
    pub worker_count: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            route_prefix: DEFAULT_ROUTE_PREFIX.to_owned(),
            queue_base_url: DEFAULT_QUEUE_BASE_URL.to_owned(),
            inspector_base_url: DEFAULT_INSPECTOR_BASE_URL.to_owned(),
            log_artifacts: LogArtifactTable::default(),
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

impl BridgeConfig {
    /// Parses and validates configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and a validation
    /// variant when a value is out of range.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(Arc::new(err)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// the errors of [`BridgeConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file_path = path.as_ref();
        let raw = std::fs::read_to_string(file_path).map_err(|err| ConfigError::Read {
            path: file_path.to_path_buf(),
            source: Arc::new(err),
        })?;
        Self::from_json_str(&raw)
    }

    /// Checks value constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRoutePrefix`] or
    /// [`ConfigError::InvalidWorkerCount`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.route_prefix.is_empty() || self.route_prefix.contains('.') {
            return Err(ConfigError::InvalidRoutePrefix(self.route_prefix.clone()));
        }
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        Ok(())
    }
}
