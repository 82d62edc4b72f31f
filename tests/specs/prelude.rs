//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use wb_adapters::FakeArchive;
use wb_adapters::FakeWarehouse;
use wb_core::{Flowcell, Sample, Study};
use wb_engine::{Broker, OntRunDataWorker, OntRunMetadataWorker, PipelineEngine, COMPLETION_MARKER};
use wb_storage::StateStore;

pub use wb_adapters::ArchiveClient;
pub use wb_core::{Avu, WorkKind, WorkState};
pub use wb_engine::Worker;

pub const EXPERIMENT: &str = "multiplexed_experiment_001";
pub const SLOT: i64 = 1;
pub const RUN: &str =
    "/testZone/home/irods/synthetic/multiplexed_experiment_001/20190904_1514_GA10000_flowcell101_cf751ba1";
pub const ARCHIVE_ROOT: &str = "/testZone/archive/workbot";

/// One warehouse update time safely inside every test's search window.
pub fn updated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 6, 30, 0, 0, 0).unwrap()
}

/// The broker search window start used across the specs.
pub fn window_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 6, 16, 0, 0, 0).unwrap()
}

/// Everything a spec needs: the store, both fakes, an engine, and a scratch
/// directory whose lifetime is tied to the world.
pub struct World {
    pub store: StateStore,
    pub archive: Arc<FakeArchive>,
    pub warehouse: Arc<FakeWarehouse>,
    pub engine: PipelineEngine,
    pub scratch: tempfile::TempDir,
}

impl World {
    pub fn new() -> Self {
        let store = StateStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        Self {
            engine: PipelineEngine::new(store.clone()),
            store,
            archive: Arc::new(FakeArchive::new()),
            warehouse: Arc::new(FakeWarehouse::new()),
            scratch: tempfile::tempdir().unwrap(),
        }
    }

    /// Seed the run collection with its primary tags and raw reads, without
    /// the completion marker.
    pub async fn seed_incomplete_run(&self) {
        self.archive
            .add_data_object(&format!("{RUN}/fast5/read_0001.fast5"), b"squiggles");
        self.archive
            .meta_add(
                RUN,
                &[
                    Avu::new("experiment_name", EXPERIMENT).with_namespace("ont"),
                    Avu::new("instrument_slot", SLOT).with_namespace("ont"),
                ],
            )
            .await
            .unwrap();
    }

    /// Seed a complete, tagged run.
    pub async fn seed_complete_run(&self) {
        self.seed_incomplete_run().await;
        self.mark_run_complete();
    }

    pub fn mark_run_complete(&self) {
        self.archive
            .add_data_object(&format!("{RUN}/{COMPLETION_MARKER}"), b"report");
    }

    /// Seed one warehouse flowcell row for the standard run.
    pub fn seed_flowcell(&self, tag: Option<i64>, sample_index: i64) {
        self.warehouse
            .add_flowcell(updated_at(), flowcell(tag, sample_index));
    }

    pub fn broker(&self, kind: WorkKind) -> Broker {
        Broker::new(
            self.store.clone(),
            self.archive.clone(),
            self.warehouse.clone(),
            kind,
        )
    }

    pub fn data_worker(&self, command: &str) -> OntRunDataWorker {
        OntRunDataWorker::new(
            self.archive.clone(),
            self.store.clone(),
            ARCHIVE_ROOT,
            self.scratch.path(),
            command,
        )
    }

    pub fn metadata_worker(&self) -> OntRunMetadataWorker {
        OntRunMetadataWorker::new(
            self.archive.clone(),
            self.warehouse.clone(),
            self.store.clone(),
        )
    }

    /// Write an executable analysis stub and return its path as a command.
    pub fn write_script(&self, body: &str) -> String {
        write_script(self.scratch.path(), body)
    }
}

pub fn flowcell(tag: Option<i64>, sample_index: i64) -> Flowcell {
    Flowcell {
        experiment_name: EXPERIMENT.to_string(),
        instrument_slot: SLOT,
        tag_identifier: tag,
        tag_sequence: None,
        sample: Sample {
            lims_id: Some(format!("sample{sample_index}")),
            name: Some(format!("sample {sample_index}")),
            accession_number: None,
            donor_id: None,
            supplier_name: None,
            consent_withdrawn: false,
        },
        study: Study {
            lims_id: Some("study_03".to_string()),
            name: Some("Study Z".to_string()),
            accession_number: None,
        },
    }
}

pub fn write_script(dir: &Path, body: &str) -> String {
    let path = dir.join("analysis.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path.display().to_string()
}
