// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker for refreshing warehouse-sourced metadata on archived ONT runs.
//!
//! No data moves: stage, analyse, archive and unstage are bare state
//! advances. The annotate step decorates the existing run collection (and
//! its barcode sub-collections when the run is multiplexed) with sample and
//! study tags drawn from the warehouse.

use crate::{EngineError, Worker};
use async_trait::async_trait;
use std::sync::Arc;
use wb_adapters::{ArchiveClient, WarehouseClient};
use wb_core::metadata;
use wb_core::{Avu, WorkInstance};
use wb_storage::StateStore;

pub struct OntRunMetadataWorker {
    archive: Arc<dyn ArchiveClient>,
    warehouse: Arc<dyn WarehouseClient>,
    store: StateStore,
}

impl std::fmt::Debug for OntRunMetadataWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntRunMetadataWorker").finish()
    }
}

impl OntRunMetadataWorker {
    pub fn new(
        archive: Arc<dyn ArchiveClient>,
        warehouse: Arc<dyn WarehouseClient>,
        store: StateStore,
    ) -> Self {
        Self {
            archive,
            warehouse,
            store,
        }
    }
}

#[async_trait]
impl Worker for OntRunMetadataWorker {
    async fn stage_input(&self, _job: &WorkInstance) -> Result<bool, EngineError> {
        Ok(true)
    }

    async fn run_analysis(&self, _job: &WorkInstance) -> Result<(), EngineError> {
        Ok(())
    }

    async fn archive_output(&self, _job: &WorkInstance) -> Result<(), EngineError> {
        Ok(())
    }

    async fn annotate(&self, job: &WorkInstance) -> Result<(), EngineError> {
        // This worker annotates one run; merged datasets are out of its
        // remit, so anything but a single identity row is an error.
        let metas = self.store.meta_for(job.id)?;
        let meta = match metas.as_slice() {
            [meta] => meta,
            other => {
                return Err(EngineError::MetadataCardinality {
                    job: job.id,
                    count: other.len(),
                })
            }
        };

        tracing::info!(
            job = job.id,
            experiment = %meta.experiment_name,
            slot = meta.instrument_slot,
            "searching the warehouse for flowcell information"
        );
        let flowcells = self
            .warehouse
            .flowcells_for(&meta.experiment_name, meta.instrument_slot)
            .await?;

        let run_avus = metadata::experiment_slot_avus(&meta.experiment_name, meta.instrument_slot);
        self.archive.meta_add(&job.input_path, &run_avus).await?;

        for flowcell in &flowcells {
            match flowcell.tag_identifier {
                Some(tag) => {
                    // Barcode directory naming style of the ONT de-plexers.
                    let path = format!("{}/{}", job.input_path, metadata::barcode_dir(tag));
                    tracing::debug!(job = job.id, %path, tag, "annotating barcode collection");

                    self.archive
                        .meta_add(&path, &[Avu::new(metadata::TAG_INDEX, tag)])
                        .await?;
                    self.archive
                        .meta_add(&path, &metadata::study_avus(&flowcell.study))
                        .await?;
                    self.archive
                        .meta_add(&path, &metadata::sample_avus(&flowcell.sample))
                        .await?;
                }
                None => {
                    // Single-sample run: tags go on the run collection itself.
                    self.archive
                        .meta_add(&job.input_path, &metadata::study_avus(&flowcell.study))
                        .await?;
                    self.archive
                        .meta_add(&job.input_path, &metadata::sample_avus(&flowcell.sample))
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn unstage(&self, _job: &WorkInstance) -> Result<(), EngineError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "ont_run_metadata_tests.rs"]
mod tests;
