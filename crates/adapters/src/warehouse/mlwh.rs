// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQL client for the warehouse mirror.

use crate::warehouse::{WarehouseClient, WarehouseError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use std::sync::Arc;
use wb_core::{ExperimentSlot, Flowcell, Sample, Study};

/// Read-only warehouse client over the mirrored schema
/// (`oseq_flowcell` joined with `sample` and `study`).
#[derive(Clone)]
pub struct MlwhWarehouse {
    conn: Arc<Mutex<Connection>>,
}

impl MlwhWarehouse {
    /// Open the warehouse mirror read-only.
    pub fn open(path: &Path) -> Result<Self, WarehouseError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// A writable in-memory warehouse, for tests that seed their own rows.
    pub fn open_in_memory() -> Result<Self, WarehouseError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Direct access to the connection, for test fixtures.
    pub fn with_connection<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, WarehouseError> {
        let conn = self.conn.lock();
        Ok(op(&conn)?)
    }
}

#[async_trait]
impl WarehouseClient for MlwhWarehouse {
    async fn recent_experiment_slots(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ExperimentSlot>, WarehouseError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT experiment_name, instrument_slot
             FROM oseq_flowcell
             WHERE last_updated >= ?1
             GROUP BY experiment_name, instrument_slot
             ORDER BY experiment_name ASC, instrument_slot ASC",
        )?;
        let rows = stmt.query_map(params![since.to_rfc3339()], |row| {
            Ok(ExperimentSlot {
                experiment_name: row.get(0)?,
                instrument_slot: row.get(1)?,
            })
        })?;

        let mut slots = Vec::new();
        for slot in rows {
            slots.push(slot?);
        }
        Ok(slots)
    }

    async fn flowcells_for(
        &self,
        experiment_name: &str,
        instrument_slot: i64,
    ) -> Result<Vec<Flowcell>, WarehouseError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT f.experiment_name, f.instrument_slot, f.tag_identifier, f.tag_sequence,
                    s.sanger_sample_id, s.name, s.accession_number, s.donor_id,
                    s.supplier_name, s.consent_withdrawn,
                    st.id_study_lims, st.name, st.accession_number
             FROM oseq_flowcell f
             JOIN sample s ON s.id_sample_tmp = f.id_sample_tmp
             JOIN study st ON st.id_study_tmp = f.id_study_tmp
             WHERE f.experiment_name = ?1 AND f.instrument_slot = ?2
             ORDER BY f.tag_identifier",
        )?;
        let rows = stmt.query_map(params![experiment_name, instrument_slot], |row| {
            Ok(Flowcell {
                experiment_name: row.get(0)?,
                instrument_slot: row.get(1)?,
                tag_identifier: row.get(2)?,
                tag_sequence: row.get(3)?,
                sample: Sample {
                    lims_id: row.get(4)?,
                    name: row.get(5)?,
                    accession_number: row.get(6)?,
                    donor_id: row.get(7)?,
                    supplier_name: row.get(8)?,
                    consent_withdrawn: row.get::<_, Option<i64>>(9)?.unwrap_or(0) != 0,
                },
                study: Study {
                    lims_id: row.get(10)?,
                    name: row.get(11)?,
                    accession_number: row.get(12)?,
                },
            })
        })?;

        let mut flowcells = Vec::new();
        for flowcell in rows {
            flowcells.push(flowcell?);
        }
        Ok(flowcells)
    }
}

#[cfg(test)]
#[path = "mlwh_tests.rs"]
mod tests;
