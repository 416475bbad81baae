//! In-memory integration tests for task lifecycles flowing through the
//! pipeline.

use super::helpers::{
    Bridge, OTHER_SLUG, TASK_SLUG, TASK_UUID, bridge, event_json, run_json, task_id,
};
use rstest::rstest;
use taskcluster_treeherder::job::{
    domain::{CompletionOutcome, JobKind, JobResult, JobState, RunId},
    services::{PipelineError, TaskEvent},
};
use tokio::sync::mpsc;

fn states_of(bridge: &Bridge, job_guid: &str) -> Vec<(JobState, JobResult)> {
    bridge
        .publisher
        .history(job_guid)
        .iter()
        .map(|job| (job.state(), job.result()))
        .collect()
}

fn first_run_event(slug: &str, kind: &str, state: &str) -> eyre::Result<TaskEvent> {
    Ok(event_json(slug, kind, 0, &[run_json(0, state, None)], None)?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_is_published_in_order(bridge: Bridge) -> eyre::Result<()> {
    let pipeline = bridge.pipeline();
    let events = [
        first_run_event(TASK_SLUG, "pending", "pending")?,
        first_run_event(TASK_SLUG, "running", "running")?,
        event_json(
            TASK_SLUG,
            "completed",
            0,
            &[run_json(0, "completed", Some("completed"))],
            Some("success"),
        )?,
    ];

    for event in &events {
        pipeline.process(event).await?;
    }

    let job_guid = format!("{TASK_UUID}/0");
    eyre::ensure!(
        states_of(&bridge, &job_guid)
            == [
                (JobState::Pending, JobResult::Unknown),
                (JobState::Running, JobResult::Unknown),
                (JobState::Completed, JobResult::Success),
            ]
    );

    let history = bridge.publisher.history(&job_guid);
    let completed = history
        .last()
        .ok_or_else(|| eyre::eyre!("expected a completed job"))?;
    eyre::ensure!(completed.project() == "try");
    eyre::ensure!(completed.revision() == "f00dcafe");
    eyre::ensure!(completed.push_id() == Some(1024));
    eyre::ensure!(completed.tier() == 2);
    eyre::ensure!(completed.job_kind() == JobKind::Test);
    eyre::ensure!(completed.platform() == Some("linux64"));
    eyre::ensure!(completed.labels() == ["opt".to_owned()]);
    eyre::ensure!(
        completed.time_started().map(|ts| ts.as_str()) == Some("2016-03-01T10:01:30.250Z")
    );
    eyre::ensure!(
        completed.time_finished().map(|ts| ts.as_str()) == Some("2016-03-01T10:31:45.500Z")
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn worker_failure_outcome_is_testfailed(bridge: Bridge) -> eyre::Result<()> {
    let event = event_json(
        TASK_SLUG,
        "completed",
        0,
        &[run_json(0, "completed", Some("completed"))],
        Some("failure"),
    )?;

    let enriched = bridge.pipeline().process(&event).await?;

    eyre::ensure!(enriched.job.result() == JobResult::Testfailed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lost_worker_is_retried_on_a_new_run(bridge: Bridge) -> eyre::Result<()> {
    let pipeline = bridge.pipeline();
    let lost = event_json(
        TASK_SLUG,
        "exception",
        0,
        &[run_json(0, "exception", Some("claim-expired"))],
        None,
    )?;
    let retry = event_json(
        TASK_SLUG,
        "pending",
        1,
        &[
            run_json(0, "exception", Some("claim-expired")),
            run_json(1, "pending", None),
        ],
        None,
    )?;

    let first = pipeline.process(&lost).await?;
    let second = pipeline.process(&retry).await?;

    eyre::ensure!(first.job.result() == JobResult::Retry);
    eyre::ensure!(first.job.is_retried());
    eyre::ensure!(second.job.job_guid() == format!("{TASK_UUID}/1"));
    eyre::ensure!(second.job.retry_id() == RunId::new(1));
    eyre::ensure!(second.job.reason() == "scheduled");
    eyre::ensure!(second.job.state() == JobState::Pending);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn event_for_missing_run_is_rejected(bridge: Bridge) -> eyre::Result<()> {
    let event = event_json(
        TASK_SLUG,
        "running",
        2,
        &[run_json(0, "running", None)],
        None,
    )?;

    let result = bridge.pipeline().process(&event).await;

    eyre::ensure!(
        matches!(result, Err(PipelineError::Mapping(_))),
        "expected mapping error, got {result:?}"
    );
    eyre::ensure!(bridge.publisher.published().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_tasks_keep_their_own_order(bridge: Bridge) -> eyre::Result<()> {
    let slugs = [TASK_SLUG, OTHER_SLUG];
    let mut events: Vec<TaskEvent> = Vec::new();
    for state in ["pending", "running", "failed"] {
        for slug in slugs {
            events.push(first_run_event(slug, state, state)?);
        }
    }

    let (inbound, receiver) = mpsc::channel(events.len());
    for event in events {
        inbound.send(event).await?;
    }
    drop(inbound);
    let summary = bridge.pipeline().run(receiver).await;

    eyre::ensure!(summary.received == 6);
    eyre::ensure!(summary.published == 6);
    eyre::ensure!(summary.rejected == 0);
    for slug in slugs {
        let job_guid = format!("{}/0", task_id(slug).as_uuid());
        eyre::ensure!(
            states_of(&bridge, &job_guid)
                == [
                    (JobState::Pending, JobResult::Unknown),
                    (JobState::Running, JobResult::Unknown),
                    (JobState::Completed, JobResult::Busted),
                ],
            "unexpected history for {slug}"
        );
    }
    Ok(())
}

#[rstest]
#[case("pending", false, false)]
#[case("running", true, false)]
#[case("completed", true, true)]
fn wire_runs_carry_the_timestamps_of_their_state(
    #[case] state: &str,
    #[case] started: bool,
    #[case] resolved: bool,
) -> eyre::Result<()> {
    let event = first_run_event(TASK_SLUG, state, state)?;

    let run = event
        .status
        .runs
        .first()
        .ok_or_else(|| eyre::eyre!("expected one run"))?;
    eyre::ensure!(run.state == state);
    eyre::ensure!(run.started.is_some() == started);
    eyre::ensure!(run.resolved.is_some() == resolved);
    eyre::ensure!(event.outcome == CompletionOutcome::Success);
    Ok(())
}
