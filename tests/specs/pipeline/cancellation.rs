//! Cancellation specs.

use crate::prelude::*;
use wb_storage::StoreError;

#[tokio::test]
async fn cancelling_a_staged_job_frees_scratch_and_concludes_the_dataset() {
    let world = World::new();
    world.seed_complete_run().await;

    let mut job = world
        .store
        .insert_job(RUN, WorkKind::OntRunData)
        .unwrap()
        .unwrap();
    world.store.attach_meta(&job, EXPERIMENT, SLOT).unwrap();

    let command = world.write_script("echo '>seq' > consensus.fasta");
    let worker = world.data_worker(&command);

    // Stage, then cancel.
    assert!(worker.stage_input(&job).await.unwrap());
    world.store.transition(&mut job, WorkState::Staged).unwrap();
    let scratch = world.scratch.path().join(job.id.to_string());
    assert!(scratch.exists());

    world.engine.cancel(&mut job, &worker).await.unwrap();
    assert_eq!(job.state, WorkState::Cancelled);
    assert!(!scratch.exists());

    // CANCELLED is an end state for this kind: the dataset is concluded.
    let err = world.store.insert_job(RUN, WorkKind::OntRunData).unwrap_err();
    assert!(matches!(err, StoreError::JobAlreadyConcluded { .. }));
}

#[tokio::test]
async fn an_operator_can_cancel_a_failed_job() {
    let world = World::new();
    world.seed_complete_run().await;

    let mut job = world
        .store
        .insert_job(RUN, WorkKind::OntRunData)
        .unwrap()
        .unwrap();

    let command = world.write_script("exit 1");
    let worker = world.data_worker(&command);
    world.engine.run(&mut job, &worker).await.unwrap_err();
    assert_eq!(job.state, WorkState::Failed);

    world.engine.cancel(&mut job, &worker).await.unwrap();
    assert_eq!(job.state, WorkState::Cancelled);
}
