//! Given steps for task lifecycle BDD scenarios.

use super::world::JobLifecycleWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskcluster_treeherder::job::domain::{
    RunId, TaskDefinition, TaskExtra, TaskId, TaskMetadata, TreeherderConfig,
};

#[given(r#"a task "{slug}" routed to "{route}""#)]
fn task_routed_to(
    world: &mut JobLifecycleWorld,
    slug: String,
    route: String,
) -> Result<(), eyre::Report> {
    let task_id = TaskId::new(slug).wrap_err("parse scenario task id")?;
    world.task = Some(TaskDefinition {
        provisioner_id: "aws-provisioner-v1".to_owned(),
        worker_type: "gecko-t-linux".to_owned(),
        routes: vec![route],
        metadata: TaskMetadata {
            name: "Linux debug crashtest".to_owned(),
            owner: "ci@example.test".to_owned(),
            description: "Crashtests".to_owned(),
            source: "https://example.test/source".to_owned(),
        },
        extra: TaskExtra {
            treeherder: Some(TreeherderConfig {
                symbol: "C".to_owned(),
                group_symbol: Some("R".to_owned()),
                ..TreeherderConfig::default()
            }),
        },
    });
    world.task_id = Some(task_id);
    Ok(())
}

#[given(r#"run {run_id:u32} uploaded artifacts "{names}""#)]
fn run_uploaded_artifacts(
    world: &mut JobLifecycleWorld,
    run_id: u32,
    names: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?.clone();
    world
        .lister
        .record(&task_id, RunId::new(run_id), names.split(','));
    Ok(())
}

#[given("listing page {page:usize} of run {run_id:u32} fails")]
fn listing_page_fails(
    world: &mut JobLifecycleWorld,
    page: usize,
    run_id: u32,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?.clone();
    world.lister.fail_page(&task_id, RunId::new(run_id), page);
    Ok(())
}
