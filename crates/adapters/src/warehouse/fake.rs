// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory warehouse for tests.

use crate::warehouse::{WarehouseClient, WarehouseError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use wb_core::{ExperimentSlot, Flowcell};

#[derive(Debug, Clone)]
struct FlowcellRecord {
    last_updated: DateTime<Utc>,
    flowcell: Flowcell,
}

/// A fake warehouse holding flowcell rows in memory.
#[derive(Debug, Clone, Default)]
pub struct FakeWarehouse {
    rows: Arc<Mutex<Vec<FlowcellRecord>>>,
}

impl FakeWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one flowcell row with its update time.
    pub fn add_flowcell(&self, last_updated: DateTime<Utc>, flowcell: Flowcell) {
        self.rows.lock().push(FlowcellRecord {
            last_updated,
            flowcell,
        });
    }
}

#[async_trait]
impl WarehouseClient for FakeWarehouse {
    async fn recent_experiment_slots(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ExperimentSlot>, WarehouseError> {
        let rows = self.rows.lock();
        let mut slots: Vec<ExperimentSlot> = rows
            .iter()
            .filter(|record| record.last_updated >= since)
            .map(|record| {
                ExperimentSlot::new(
                    record.flowcell.experiment_name.clone(),
                    record.flowcell.instrument_slot,
                )
            })
            .collect();
        slots.sort();
        slots.dedup();
        Ok(slots)
    }

    async fn flowcells_for(
        &self,
        experiment_name: &str,
        instrument_slot: i64,
    ) -> Result<Vec<Flowcell>, WarehouseError> {
        let rows = self.rows.lock();
        let mut flowcells: Vec<Flowcell> = rows
            .iter()
            .filter(|record| {
                record.flowcell.experiment_name == experiment_name
                    && record.flowcell.instrument_slot == instrument_slot
            })
            .map(|record| record.flowcell.clone())
            .collect();
        flowcells.sort_by_key(|flowcell| flowcell.tag_identifier);
        Ok(flowcells)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
