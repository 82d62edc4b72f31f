// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LIMS warehouse client adapters.
//!
//! The warehouse is read-only: the broker draws discovery tuples from it and
//! the metadata worker draws sample/study decorations.

mod mlwh;

pub use mlwh::MlwhWarehouse;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWarehouse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use wb_core::{ExperimentSlot, Flowcell};

/// Errors from warehouse queries.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("warehouse query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Client for the multi-LIMS warehouse mirror.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Experiment/slot tuples updated since `since`, deduplicated and
    /// ordered by (name, slot).
    async fn recent_experiment_slots(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ExperimentSlot>, WarehouseError>;

    /// Every flowcell row for one experiment/slot, joined with its sample
    /// and study; one row per barcode when multiplexed.
    async fn flowcells_for(
        &self,
        experiment_name: &str,
        instrument_slot: i64,
    ) -> Result<Vec<Flowcell>, WarehouseError>;
}
