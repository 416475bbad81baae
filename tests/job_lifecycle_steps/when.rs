//! When steps for task lifecycle BDD scenarios.

use super::world::{JobLifecycleWorld, run_async};
use rstest_bdd_macros::when;
use taskcluster_treeherder::job::{
    domain::{CompletionOutcome, Run, RunId, StatusSnapshot, Timestamp},
    services::{EventKind, TaskEvent},
};

const SCHEDULED: &str = "2016-03-01T10:00:00.000Z";
const STARTED: &str = "2016-03-01T10:01:30.250Z";
const RESOLVED: &str = "2016-03-01T10:31:45.500Z";

/// Moves a run to `state` and submits the resulting event.
fn submit(
    world: &mut JobLifecycleWorld,
    run_id: u32,
    kind: EventKind,
    reason_resolved: Option<String>,
    outcome: CompletionOutcome,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?.clone();
    let task = world
        .task
        .clone()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;
    let index = usize::try_from(run_id)?;
    while world.runs.len() <= index {
        let next = u32::try_from(world.runs.len())?;
        let mut run = Run::pending(RunId::new(next), "scheduled");
        run.scheduled = Some(Timestamp::new(SCHEDULED)?);
        world.runs.push(run);
    }
    let run = world
        .runs
        .get_mut(index)
        .ok_or_else(|| eyre::eyre!("run {run_id} missing after insertion"))?;
    run.state = kind.as_str().to_owned();
    if kind != EventKind::Pending {
        run.started = Some(Timestamp::new(STARTED)?);
    }
    if !matches!(kind, EventKind::Pending | EventKind::Running) {
        run.resolved = Some(Timestamp::new(RESOLVED)?);
    }
    run.reason_resolved = reason_resolved;

    let event = TaskEvent {
        kind,
        task,
        status: StatusSnapshot {
            task_id,
            retries_left: 5,
            runs: world.runs.clone(),
        },
        run_id: RunId::new(run_id),
        outcome,
    };
    world.last_result = Some(run_async(world.pipeline.process(&event)));
    Ok(())
}

#[when(r#"the queue reports run {run_id:u32} as "{state}""#)]
fn queue_reports_run(
    world: &mut JobLifecycleWorld,
    run_id: u32,
    state: String,
) -> Result<(), eyre::Report> {
    let kind = match state.as_str() {
        "pending" => EventKind::Pending,
        "running" => EventKind::Running,
        other => return Err(eyre::eyre!("unsupported reported state '{other}'")),
    };
    submit(world, run_id, kind, None, CompletionOutcome::Success)
}

#[when(r#"the worker completes run {run_id:u32} with outcome "{outcome}""#)]
fn worker_completes_run(
    world: &mut JobLifecycleWorld,
    run_id: u32,
    outcome: String,
) -> Result<(), eyre::Report> {
    let completion = match outcome.as_str() {
        "success" => CompletionOutcome::Success,
        "failure" => CompletionOutcome::Failure,
        other => return Err(eyre::eyre!("unsupported outcome '{other}'")),
    };
    submit(
        world,
        run_id,
        EventKind::Completed,
        Some("completed".to_owned()),
        completion,
    )
}

#[when(r#"the queue resolves run {run_id:u32} as an exception with reason "{reason}""#)]
fn queue_resolves_exception(
    world: &mut JobLifecycleWorld,
    run_id: u32,
    reason: String,
) -> Result<(), eyre::Report> {
    submit(
        world,
        run_id,
        EventKind::Exception,
        Some(reason),
        CompletionOutcome::Success,
    )
}
