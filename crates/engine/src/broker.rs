// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Warehouse-driven work discovery.
//!
//! The broker asks the warehouse for recently-updated experiment/slot
//! tuples, resolves each to archive collections through a metadata query on
//! the run's primary tags, and queues a job per collection. De-duplication
//! is the store's job: re-running a pass over the same window inserts
//! nothing new.

use crate::EngineError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use wb_adapters::{ArchiveClient, MetaScope, WarehouseClient};
use wb_core::{metadata, ExperimentSlot, WorkKind};
use wb_storage::{StateStore, StoreError};

pub struct Broker {
    store: StateStore,
    archive: Arc<dyn ArchiveClient>,
    warehouse: Arc<dyn WarehouseClient>,
    kind: WorkKind,
}

impl Broker {
    pub fn new(
        store: StateStore,
        archive: Arc<dyn ArchiveClient>,
        warehouse: Arc<dyn WarehouseClient>,
        kind: WorkKind,
    ) -> Self {
        Self {
            store,
            archive,
            warehouse,
            kind,
        }
    }

    /// Queue work for every run updated in the warehouse since `since` that
    /// has reached the archive. Returns the number of jobs added.
    pub async fn request_work(
        &self,
        since: DateTime<Utc>,
        zone: Option<&str>,
    ) -> Result<u64, EngineError> {
        let slots = self.warehouse.recent_experiment_slots(since).await?;

        let mut added = 0;
        for slot in &slots {
            let n = self.add_work_for_run(slot, zone).await?;
            tracing::info!(
                experiment = %slot.experiment_name,
                slot = slot.instrument_slot,
                added = n,
                "checked for work"
            );
            added += n;
        }

        tracing::info!(added, kind = %self.kind, "broker pass complete");
        Ok(added)
    }

    async fn add_work_for_run(
        &self,
        slot: &ExperimentSlot,
        zone: Option<&str>,
    ) -> Result<u64, EngineError> {
        let avus = metadata::experiment_slot_avus(&slot.experiment_name, slot.instrument_slot);
        let found = self
            .archive
            .meta_query(&avus, MetaScope::Collections, zone)
            .await?;
        if found.is_empty() {
            tracing::info!(
                experiment = %slot.experiment_name,
                slot = slot.instrument_slot,
                "run has not reached the archive"
            );
            return Ok(0);
        }

        // All matching collections get work, not just the first; merged or
        // duplicated runs each carry the same primary tags.
        let mut added = 0;
        for path in found {
            match self.store.insert_job(&path, self.kind) {
                Ok(Some(job)) => {
                    self.store
                        .attach_meta(&job, &slot.experiment_name, slot.instrument_slot)?;
                    added += 1;
                }
                Ok(None) => {}
                Err(StoreError::JobAlreadyConcluded { .. }) => {
                    tracing::info!(%path, kind = %self.kind, "dataset concluded; skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(added)
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
