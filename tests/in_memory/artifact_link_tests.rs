//! In-memory integration tests for artifact enrichment of published jobs.

use super::helpers::{Bridge, QUEUE_BASE, TASK_SLUG, bridge, event_json, run_json, task_id};
use rstest::rstest;
use taskcluster_treeherder::job::{
    domain::{LogReference, RunId},
    services::ARTIFACT_LINK_LABEL,
};
use tokio::sync::mpsc;

fn completed_event() -> eyre::Result<taskcluster_treeherder::job::services::TaskEvent> {
    Ok(event_json(
        TASK_SLUG,
        "completed",
        0,
        &[run_json(0, "completed", Some("completed"))],
        Some("success"),
    )?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_page_of_a_large_listing_is_linked(bridge: Bridge) -> eyre::Result<()> {
    let names: Vec<String> = (0..2500)
        .map(|index| format!("public/chunks/chunk-{index:04}.bin"))
        .collect();
    bridge
        .lister
        .record(&task_id(TASK_SLUG), RunId::new(0), names.clone());

    let enriched = bridge.pipeline().process(&completed_event()?).await?;

    let linked: Vec<&str> = enriched
        .job
        .links()
        .iter()
        .filter(|link| link.label == ARTIFACT_LINK_LABEL)
        .map(|link| link.url.as_str())
        .collect();
    eyre::ensure!(enriched.is_complete());
    eyre::ensure!(linked.len() == names.len());
    eyre::ensure!(bridge.lister.call_count() == 3);
    let expected_last = format!(
        "{QUEUE_BASE}/task/{TASK_SLUG}/runs/0/artifacts/public/chunks/chunk-2499.bin"
    );
    eyre::ensure!(linked.last() == Some(&expected_last.as_str()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn live_log_is_published_as_log_reference(bridge: Bridge) -> eyre::Result<()> {
    bridge.lister.record(
        &task_id(TASK_SLUG),
        RunId::new(0),
        [
            "public/logs/live.log",
            "public/logs/live_backing.log",
            "public/test_info/live_backing.log",
        ],
    );

    bridge.pipeline().process(&completed_event()?).await?;

    let published = bridge.publisher.published();
    let job = &published
        .first()
        .ok_or_else(|| eyre::eyre!("expected a published job"))?
        .job;
    let expected = LogReference {
        name: "builds-4h".to_owned(),
        url: format!(
            "{QUEUE_BASE}/task/{TASK_SLUG}/runs/0/artifacts/public/logs/live_backing.log"
        ),
    };
    eyre::ensure!(job.logs() == [expected]);
    let texts: Vec<&str> = job
        .links()
        .iter()
        .filter(|link| link.label == ARTIFACT_LINK_LABEL)
        .map(|link| link.link_text.as_str())
        .collect();
    eyre::ensure!(texts == ["live.log", "live_backing.log", "live_backing.log (1)"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_failure_still_publishes_the_job(bridge: Bridge) -> eyre::Result<()> {
    let id = task_id(TASK_SLUG);
    bridge.lister.record(&id, RunId::new(0), ["public/a.txt"]);
    bridge.lister.fail_page(&id, RunId::new(0), 0);

    let (inbound, receiver) = mpsc::channel(1);
    inbound.send(completed_event()?).await?;
    drop(inbound);
    let summary = bridge.pipeline().run(receiver).await;

    eyre::ensure!(summary.published == 1);
    eyre::ensure!(summary.partially_linked == 1);
    let published = bridge.publisher.published();
    let job = &published
        .first()
        .ok_or_else(|| eyre::eyre!("expected a published job"))?
        .job;
    eyre::ensure!(job.links().len() == 1, "only the inspect link is expected");
    Ok(())
}
