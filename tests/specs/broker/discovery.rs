//! Discovery specs: warehouse tuples resolve through archive metadata.

use crate::prelude::*;

#[tokio::test]
async fn discovery_requires_both_warehouse_and_archive_presence() {
    let world = World::new();
    // In the warehouse, but not yet tagged in the archive.
    world.seed_flowcell(None, 1);

    let broker = world.broker(WorkKind::OntRunData);
    assert_eq!(broker.request_work(window_start(), None).await.unwrap(), 0);

    // The run reaches the archive and is tagged; the next pass queues it.
    world.seed_complete_run().await;
    assert_eq!(broker.request_work(window_start(), None).await.unwrap(), 1);
}

#[tokio::test]
async fn discovery_attaches_the_platform_identity() {
    let world = World::new();
    world.seed_complete_run().await;
    world.seed_flowcell(None, 1);

    let broker = world.broker(WorkKind::OntRunData);
    broker.request_work(window_start(), None).await.unwrap();

    let job = world
        .store
        .find_jobs(RUN, WorkKind::OntRunData, None, None)
        .unwrap()
        .remove(0);
    let metas = world.store.meta_for(job.id).unwrap();
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0].experiment_name, EXPERIMENT);
    assert_eq!(metas[0].instrument_slot, SLOT);
}

#[tokio::test]
async fn each_kind_queues_its_own_job_for_the_same_dataset() {
    let world = World::new();
    world.seed_complete_run().await;
    world.seed_flowcell(None, 1);

    assert_eq!(
        world
            .broker(WorkKind::OntRunData)
            .request_work(window_start(), None)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        world
            .broker(WorkKind::OntRunMetadataUpdate)
            .request_work(window_start(), None)
            .await
            .unwrap(),
        1
    );

    assert_eq!(world.store.find_in_progress().unwrap().len(), 2);
}

#[tokio::test]
async fn tuples_outside_the_window_are_ignored() {
    let world = World::new();
    world.seed_complete_run().await;
    world.seed_flowcell(None, 1);

    let after_everything = updated_at() + chrono::Duration::days(1);
    let broker = world.broker(WorkKind::OntRunData);
    assert_eq!(broker.request_work(after_everything, None).await.unwrap(), 0);
}
