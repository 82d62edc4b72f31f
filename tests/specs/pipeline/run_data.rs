//! End-to-end specs for the run-data pipeline.

use crate::prelude::*;

#[tokio::test]
async fn a_discovered_run_is_analysed_archived_and_annotated() {
    let world = World::new();
    world.seed_complete_run().await;
    world.seed_flowcell(None, 1);

    // Discovery queues exactly one pending job against the tagged path.
    let broker = world.broker(WorkKind::OntRunData);
    assert_eq!(broker.request_work(window_start(), None).await.unwrap(), 1);

    let mut job = world
        .store
        .find_jobs(RUN, WorkKind::OntRunData, None, None)
        .unwrap()
        .remove(0);
    assert_eq!(job.state, WorkState::Pending);
    assert_eq!(job.input_path, RUN);

    // One engine pass drives the job to completion.
    let command = world.write_script("echo '>seq' > consensus.fasta");
    let worker = world.data_worker(&command);
    world.engine.run(&mut job, &worker).await.unwrap();
    assert_eq!(job.state, WorkState::Completed);

    // The output tree landed in the job's archive collection, tagged with
    // the run's identity.
    let result_collection = format!("{ARCHIVE_ROOT}/{}", job.id);
    assert!(world
        .archive
        .exists(&format!("{result_collection}/output/consensus.fasta"))
        .await
        .unwrap());

    let tags = world.archive.metadata(&result_collection).await.unwrap();
    assert!(tags.contains(&Avu::new("experiment_name", EXPERIMENT).with_namespace("ont")));
    assert!(tags.contains(&Avu::new("instrument_slot", SLOT).with_namespace("ont")));

    // Scratch was unstaged.
    assert!(!world.scratch.path().join(job.id.to_string()).exists());
}

#[tokio::test]
async fn a_duplicate_broker_pass_adds_no_work() {
    let world = World::new();
    world.seed_complete_run().await;
    world.seed_flowcell(None, 1);

    let broker = world.broker(WorkKind::OntRunData);
    assert_eq!(broker.request_work(window_start(), None).await.unwrap(), 1);
    assert_eq!(broker.request_work(window_start(), None).await.unwrap(), 0);

    let jobs = world
        .store
        .find_jobs(RUN, WorkKind::OntRunData, None, None)
        .unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].state, WorkState::Pending);
}

#[tokio::test]
async fn an_incomplete_run_waits_for_its_final_report() {
    let world = World::new();
    world.seed_incomplete_run().await;
    world.seed_flowcell(None, 1);

    let broker = world.broker(WorkKind::OntRunData);
    assert_eq!(broker.request_work(window_start(), None).await.unwrap(), 1);

    let mut job = world
        .store
        .find_jobs(RUN, WorkKind::OntRunData, None, None)
        .unwrap()
        .remove(0);

    let command = world.write_script("echo '>seq' > consensus.fasta");
    let worker = world.data_worker(&command);

    // No completion marker: the stage step declines and the job stays put.
    world.engine.run(&mut job, &worker).await.unwrap();
    assert_eq!(job.state, WorkState::Pending);

    // The report arrives; the next pass runs the whole pipeline.
    world.mark_run_complete();
    world.engine.run(&mut job, &worker).await.unwrap();
    assert_eq!(job.state, WorkState::Completed);
}

#[tokio::test]
async fn an_interrupted_job_resumes_from_its_checkpoint() {
    let world = World::new();
    world.seed_complete_run().await;
    world.seed_flowcell(None, 1);

    let broker = world.broker(WorkKind::OntRunData);
    broker.request_work(window_start(), None).await.unwrap();
    let mut job = world
        .store
        .find_jobs(RUN, WorkKind::OntRunData, None, None)
        .unwrap()
        .remove(0);

    // First pass stops after staging, as if the process died there.
    let command = world.write_script("echo '>seq' > consensus.fasta");
    let worker = world.data_worker(&command);
    assert!(worker.stage_input(&job).await.unwrap());
    world.store.transition(&mut job, WorkState::Staged).unwrap();

    // A fresh pass picks up from STAGED and completes.
    world.engine.run(&mut job, &worker).await.unwrap();
    assert_eq!(job.state, WorkState::Completed);
}

#[tokio::test]
async fn analysis_failure_is_terminal_but_not_conclusive() {
    let world = World::new();
    world.seed_complete_run().await;
    world.seed_flowcell(None, 1);

    let broker = world.broker(WorkKind::OntRunData);
    broker.request_work(window_start(), None).await.unwrap();
    let mut job = world
        .store
        .find_jobs(RUN, WorkKind::OntRunData, None, None)
        .unwrap()
        .remove(0);

    let command = world.write_script("echo 'no reference genome' >&2\nexit 1");
    let worker = world.data_worker(&command);

    let err = world.engine.run(&mut job, &worker).await.unwrap_err();
    assert!(err.to_string().contains("no reference genome"));
    assert_eq!(job.state, WorkState::Failed);

    // Re-running the engine over the failed job is a no-op.
    world.engine.run(&mut job, &worker).await.unwrap();
    assert_eq!(job.state, WorkState::Failed);

    // FAILED is not an ONTRunData end state, so the dataset may be queued
    // again for a fresh attempt.
    let retry = world.store.insert_job(RUN, WorkKind::OntRunData).unwrap();
    assert!(retry.is_some());
}
