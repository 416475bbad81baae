//! Shared test helpers for in-memory bridge integration tests.

use std::sync::Arc;

use rstest::fixture;
use serde_json::{Map, Value, json};
use taskcluster_treeherder::config::BridgeConfig;
use taskcluster_treeherder::job::{
    adapters::memory::{InMemoryArtifactLister, InMemoryJobPublisher},
    domain::TaskId,
    services::{JobPipeline, TaskEvent},
};

/// Slug of the primary task used by the integration tests.
pub const TASK_SLUG: &str = "fB7ZGTtaQ3SIqgsH1nq2aA";
/// UUID form of [`TASK_SLUG`].
pub const TASK_UUID: &str = "7c1ed919-3b5a-4374-88aa-0b07d67ab668";
/// Slug of a second, unrelated task.
pub const OTHER_SLUG: &str = "b3xTuq4xTUSfXqX0hSHkfQ";
/// Queue root used in artifact URLs.
pub const QUEUE_BASE: &str = "https://queue.example.test/v1";

/// Pipeline type used across integration tests.
pub type TestPipeline = JobPipeline<InMemoryArtifactLister, InMemoryJobPublisher>;

/// In-memory adapters shared between a pipeline and its assertions.
pub struct Bridge {
    pub config: BridgeConfig,
    pub lister: Arc<InMemoryArtifactLister>,
    pub publisher: Arc<InMemoryJobPublisher>,
}

impl Bridge {
    /// Creates a pipeline over this bridge's adapters.
    #[must_use]
    pub fn pipeline(&self) -> TestPipeline {
        JobPipeline::from_config(
            &self.config,
            Arc::clone(&self.lister),
            Arc::clone(&self.publisher),
        )
    }
}

/// Provides a bridge with default configuration and a custom queue root.
#[fixture]
pub fn bridge() -> Bridge {
    let config = BridgeConfig {
        queue_base_url: QUEUE_BASE.to_owned(),
        ..BridgeConfig::default()
    };
    Bridge {
        config,
        lister: Arc::new(InMemoryArtifactLister::new()),
        publisher: Arc::new(InMemoryJobPublisher::new()),
    }
}

/// Parses a slug known to be valid.
///
/// # Panics
///
/// Panics when `slug` is not a valid task id.
#[must_use]
pub fn task_id(slug: &str) -> TaskId {
    TaskId::new(slug).unwrap_or_else(|err| panic!("test slug is valid: {err}"))
}

/// Returns a run in wire form.
#[must_use]
pub fn run_json(run_id: u32, state: &str, reason_resolved: Option<&str>) -> Value {
    let reason_created = if run_id == 0 { "scheduled" } else { "retry" };
    let mut run = Map::new();
    run.insert("runId".to_owned(), json!(run_id));
    run.insert("state".to_owned(), json!(state));
    run.insert("reasonCreated".to_owned(), json!(reason_created));
    run.insert("scheduled".to_owned(), json!("2016-03-01T10:00:00.000Z"));
    if state != "pending" {
        run.insert("started".to_owned(), json!("2016-03-01T10:01:30.250Z"));
        run.insert("workerGroup".to_owned(), json!("us-east-1"));
        run.insert("workerId".to_owned(), json!("i-0abc"));
    }
    if !matches!(state, "pending" | "running") {
        run.insert("resolved".to_owned(), json!("2016-03-01T10:31:45.500Z"));
    }
    if let Some(reason) = reason_resolved {
        run.insert("reasonResolved".to_owned(), json!(reason));
    }
    Value::Object(run)
}

/// Builds a task event as it would arrive from the queue.
///
/// # Errors
///
/// Returns an error when the document does not deserialize.
pub fn event_json(
    slug: &str,
    kind: &str,
    run_id: u32,
    runs: &[Value],
    outcome: Option<&str>,
) -> Result<TaskEvent, serde_json::Error> {
    let mut event = Map::new();
    event.insert("kind".to_owned(), json!(kind));
    event.insert("task".to_owned(), task_json());
    event.insert(
        "status".to_owned(),
        json!({
            "taskId": slug,
            "retriesLeft": 4,
            "runs": runs,
        }),
    );
    event.insert("runId".to_owned(), json!(run_id));
    if let Some(value) = outcome {
        event.insert("outcome".to_owned(), json!(value));
    }
    serde_json::from_value(Value::Object(event))
}

/// Returns the definition of a reftest task routed to a `v2` push.
fn task_json() -> Value {
    json!({
        "provisionerId": "aws-provisioner-v1",
        "workerType": "desktop-test",
        "routes": [
            "index.gecko.v2.try.latest",
            "tc-treeherder.v2.try.f00dcafe.1024",
        ],
        "metadata": {
            "name": "Linux opt reftest",
            "owner": "sheriff@example.test",
            "description": "Reftests on Linux",
            "source": "https://example.test/try/file/taskcluster",
        },
        "extra": {
            "treeherder": {
                "symbol": "R1",
                "groupSymbol": "R",
                "groupName": "Reftests",
                "productName": "firefox",
                "jobKind": "test",
                "tier": 2,
                "machine": { "platform": "linux64" },
                "collection": { "opt": true },
            },
        },
    })
}
