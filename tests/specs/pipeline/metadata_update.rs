//! End-to-end specs for the metadata-update pipeline.

use crate::prelude::*;

#[tokio::test]
async fn a_multiplexed_run_is_annotated_per_barcode() {
    let world = World::new();
    world.seed_complete_run().await;
    for n in 1..=12 {
        world.seed_flowcell(Some(n), n);
        world
            .archive
            .add_collection(&format!("{RUN}/barcode{n:02}"));
    }

    let broker = world.broker(WorkKind::OntRunMetadataUpdate);
    assert_eq!(broker.request_work(window_start(), None).await.unwrap(), 1);

    let mut job = world
        .store
        .find_jobs(RUN, WorkKind::OntRunMetadataUpdate, None, None)
        .unwrap()
        .remove(0);

    world
        .engine
        .run(&mut job, &world.metadata_worker())
        .await
        .unwrap();
    assert_eq!(job.state, WorkState::Completed);

    // Top collection gains the platform identity.
    let tags = world.archive.metadata(RUN).await.unwrap();
    assert!(tags.contains(&Avu::new("experiment_name", EXPERIMENT).with_namespace("ont")));
    assert!(tags.contains(&Avu::new("instrument_slot", SLOT).with_namespace("ont")));

    // Every barcode sub-collection gains its index plus sample/study tags.
    for n in 1..=12i64 {
        let tags = world
            .archive
            .metadata(&format!("{RUN}/barcode{n:02}"))
            .await
            .unwrap();
        assert!(tags.contains(&Avu::new("tag_index", n)));
        assert!(tags.contains(&Avu::new("sample_name", format!("sample {n}"))));
        assert!(tags.contains(&Avu::new("study_id", "study_03")));
        assert!(tags.contains(&Avu::new("study_name", "Study Z")));
    }
}

#[tokio::test]
async fn a_single_sample_run_is_annotated_at_the_top_level() {
    let world = World::new();
    world.seed_complete_run().await;
    world.seed_flowcell(None, 1);

    let broker = world.broker(WorkKind::OntRunMetadataUpdate);
    broker.request_work(window_start(), None).await.unwrap();
    let mut job = world
        .store
        .find_jobs(RUN, WorkKind::OntRunMetadataUpdate, None, None)
        .unwrap()
        .remove(0);

    world
        .engine
        .run(&mut job, &world.metadata_worker())
        .await
        .unwrap();

    let tags = world.archive.metadata(RUN).await.unwrap();
    assert!(tags.contains(&Avu::new("sample_id", "sample1")));
    assert!(tags.contains(&Avu::new("sample_name", "sample 1")));
    assert!(tags.contains(&Avu::new("study_id", "study_03")));
    assert!(tags.contains(&Avu::new("study_name", "Study Z")));
}

#[tokio::test]
async fn a_completed_update_can_be_queued_again() {
    let world = World::new();
    world.seed_complete_run().await;
    world.seed_flowcell(None, 1);

    let broker = world.broker(WorkKind::OntRunMetadataUpdate);
    assert_eq!(broker.request_work(window_start(), None).await.unwrap(), 1);
    let mut job = world
        .store
        .find_jobs(RUN, WorkKind::OntRunMetadataUpdate, None, None)
        .unwrap()
        .remove(0);
    world
        .engine
        .run(&mut job, &world.metadata_worker())
        .await
        .unwrap();
    assert_eq!(job.state, WorkState::Completed);

    // Completion does not conclude a metadata update: warehouse changes can
    // be re-applied by a later pass.
    assert_eq!(broker.request_work(window_start(), None).await.unwrap(), 1);
}
