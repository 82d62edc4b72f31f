// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const INPUT: &str = "/testZone/home/irods/expt1/20190904_1514_GA10000_flowcell101_cf751ba1";

fn store() -> StateStore {
    let store = StateStore::open_in_memory().unwrap();
    store.initialize().unwrap();
    store
}

/// Drive a job along the happy path up to (and including) `until`.
fn advance(store: &StateStore, job: &mut WorkInstance, until: WorkState) {
    let path = [
        WorkState::Staged,
        WorkState::Started,
        WorkState::Succeeded,
        WorkState::Archived,
        WorkState::Annotated,
        WorkState::Unstaged,
        WorkState::Completed,
    ];
    for state in path {
        store.transition(job, state).unwrap();
        if state == until {
            return;
        }
    }
}

#[test]
fn initialize_is_idempotent() {
    let store = StateStore::open_in_memory().unwrap();
    store.initialize().unwrap();
    store.initialize().unwrap();

    // The dictionary was seeded exactly once.
    let job = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();
    assert_eq!(job.state, WorkState::Pending);
}

#[test]
fn insert_returns_a_pending_job() {
    let store = store();
    let job = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();

    assert_eq!(job.input_path, INPUT);
    assert_eq!(job.work_kind, WorkKind::OntRunData);
    assert_eq!(job.state, WorkState::Pending);
    assert_eq!(job.created, job.last_updated);
}

#[test]
fn duplicate_insert_is_a_no_op() {
    let store = store();
    store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();

    assert!(store.insert_job(INPUT, WorkKind::OntRunData).unwrap().is_none());

    let jobs = store.find_jobs(INPUT, WorkKind::OntRunData, None, None).unwrap();
    assert_eq!(jobs.len(), 1);
}

#[test]
fn kinds_do_not_block_each_other() {
    let store = store();
    store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();
    let meta_job = store
        .insert_job(INPUT, WorkKind::OntRunMetadataUpdate)
        .unwrap();
    assert!(meta_job.is_some());
}

#[test]
fn concluded_pair_rejects_new_work() {
    let store = store();
    let mut job = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();
    store.transition(&mut job, WorkState::Cancelled).unwrap();

    let err = store.insert_job(INPUT, WorkKind::OntRunData).unwrap_err();
    assert!(matches!(err, StoreError::JobAlreadyConcluded { .. }));
}

#[test]
fn completed_metadata_update_can_be_requeued() {
    let store = store();
    let mut job = store
        .insert_job(INPUT, WorkKind::OntRunMetadataUpdate)
        .unwrap()
        .unwrap();
    advance(&store, &mut job, WorkState::Completed);

    // COMPLETED is not an end state for metadata updates.
    let again = store.insert_job(INPUT, WorkKind::OntRunMetadataUpdate).unwrap();
    assert!(again.is_some());
}

#[test]
fn completed_run_data_cannot_be_requeued() {
    let store = store();
    let mut job = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();
    advance(&store, &mut job, WorkState::Completed);

    let err = store.insert_job(INPUT, WorkKind::OntRunData).unwrap_err();
    assert!(matches!(err, StoreError::JobAlreadyConcluded { .. }));
}

#[test]
fn failed_run_data_permits_new_work() {
    let store = store();
    let mut job = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();
    advance(&store, &mut job, WorkState::Started);
    store.transition(&mut job, WorkState::Failed).unwrap();

    // FAILED is not an ONTRunData end state and goes nowhere on its own, so
    // a fresh attempt may be queued alongside it.
    let retry = store.insert_job(INPUT, WorkKind::OntRunData).unwrap();
    assert!(retry.is_some());
}

#[test]
fn illegal_transition_is_rejected_and_not_committed() {
    let store = store();
    let mut job = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();

    let err = store.transition(&mut job, WorkState::Succeeded).unwrap_err();
    assert!(matches!(err, StoreError::InvalidTransition(_)));

    // Memory and database both still show PENDING.
    assert_eq!(job.state, WorkState::Pending);
    assert_eq!(store.find_job(job.id).unwrap().state, WorkState::Pending);
}

#[test]
fn transition_bumps_last_updated() {
    let store = store();
    let mut job = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();
    let before = job.last_updated;

    store.transition(&mut job, WorkState::Staged).unwrap();
    assert!(job.last_updated >= before);
    assert_eq!(store.find_job(job.id).unwrap().state, WorkState::Staged);
}

#[test]
fn transition_validates_against_the_stored_state() {
    let store = store();
    let mut job = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();

    // A stale copy of the record cannot force an illegal move.
    let mut stale = job.clone();
    store.transition(&mut job, WorkState::Staged).unwrap();
    let err = store.transition(&mut stale, WorkState::Staged).unwrap_err();
    assert!(matches!(err, StoreError::InvalidTransition(_)));
}

#[test]
fn find_jobs_filters_by_state() {
    let store = store();
    let mut cancelled = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();
    store.transition(&mut cancelled, WorkState::Cancelled).unwrap();

    let err = store.insert_job(INPUT, WorkKind::OntRunData).unwrap_err();
    assert!(matches!(err, StoreError::JobAlreadyConcluded { .. }));

    let found = store
        .find_jobs(INPUT, WorkKind::OntRunData, Some(&[WorkState::Cancelled]), None)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, cancelled.id);

    let none = store
        .find_jobs(INPUT, WorkKind::OntRunData, None, Some(&[WorkState::Cancelled]))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn find_in_progress_excludes_terminal_states() {
    let store = store();
    let pending = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();
    let mut done = store
        .insert_job("/testZone/home/irods/expt2", WorkKind::OntRunData)
        .unwrap()
        .unwrap();
    advance(&store, &mut done, WorkState::Completed);

    let in_progress = store.find_in_progress().unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].id, pending.id);
}

#[test]
fn find_job_reports_missing_ids() {
    let store = store();
    assert!(matches!(
        store.find_job(99).unwrap_err(),
        StoreError::JobNotFound(99)
    ));
}

#[test]
fn meta_rows_share_the_job_lifetime() {
    let store = store();
    let job = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();

    store
        .attach_meta(&job, "multiplexed_experiment_001", 1)
        .unwrap();
    store
        .attach_meta(&job, "multiplexed_experiment_001", 3)
        .unwrap();

    let metas = store.meta_for(job.id).unwrap();
    assert_eq!(metas.len(), 2);
    assert_eq!(metas[0].experiment_name, "multiplexed_experiment_001");
    assert_eq!(metas[0].instrument_slot, 1);
    assert_eq!(metas[1].instrument_slot, 3);
}

#[test]
fn history_of_a_completed_job_is_legal() {
    let store = store();
    let mut job = store.insert_job(INPUT, WorkKind::OntRunData).unwrap().unwrap();

    let mut history = vec![job.state];
    advance(&store, &mut job, WorkState::Completed);
    history.extend([
        WorkState::Staged,
        WorkState::Started,
        WorkState::Succeeded,
        WorkState::Archived,
        WorkState::Annotated,
        WorkState::Unstaged,
        WorkState::Completed,
    ]);

    for pair in history.windows(2) {
        assert!(pair[0].can_transition(pair[1]));
    }
}
