//! Task definition as submitted to the queue.

use super::JobKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable description of a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    /// Provisioner responsible for the worker pool.
    pub provisioner_id: String,
    /// Worker type the task runs on.
    pub worker_type: String,
    /// Routes the task publishes to; dashboard routes encode project and
    /// revision.
    #[serde(default)]
    pub routes: Vec<String>,
    /// Human-facing task metadata.
    pub metadata: TaskMetadata,
    /// Extension block with consumer-specific hints.
    #[serde(default)]
    pub extra: TaskExtra,
}

impl TaskDefinition {
    /// Returns the dashboard display hints, if the task carries any.
    #[must_use]
    pub const fn treeherder(&self) -> Option<&TreeherderConfig> {
        self.extra.treeherder.as_ref()
    }
}

/// Task metadata supplied by the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Short task name.
    pub name: String,
    /// Owner email address.
    pub owner: String,
    /// Markdown description.
    #[serde(default)]
    pub description: String,
    /// Link to the source that created the task.
    #[serde(default)]
    pub source: String,
}

/// Consumer-specific extension block of a task definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskExtra {
    /// Dashboard display hints.
    #[serde(default)]
    pub treeherder: Option<TreeherderConfig>,
}

/// Dashboard display hints attached to a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeherderConfig {
    /// Job symbol shown in the dashboard.
    #[serde(default)]
    pub symbol: String,
    /// Name of the job group.
    #[serde(default)]
    pub group_name: Option<String>,
    /// Symbol of the job group.
    #[serde(default)]
    pub group_symbol: Option<String>,
    /// Product the job builds or tests.
    #[serde(default)]
    pub product_name: Option<String>,
    /// Kind of job.
    #[serde(default)]
    pub job_kind: Option<JobKind>,
    /// Visibility tier.
    #[serde(default)]
    pub tier: Option<u8>,
    /// Machine platform the job targets.
    #[serde(default)]
    pub machine: Option<MachinePlatform>,
    /// Build collections; keys become job labels.
    #[serde(default)]
    pub collection: BTreeMap<String, bool>,
    /// Reason the job was scheduled.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Platform description used by the dashboard to place a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachinePlatform {
    /// Platform name.
    pub platform: String,
    /// Operating system family.
    #[serde(default)]
    pub os: Option<String>,
    /// CPU architecture.
    #[serde(default)]
    pub architecture: Option<String>,
}
