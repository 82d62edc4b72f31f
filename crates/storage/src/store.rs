// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable job store over SQLite.
//!
//! The store owns all persistence: job rows, their ONT metadata, and the
//! state dictionary. Every mutation happens inside one transaction so that a
//! transition and its validation commit together. Cross-process writers are
//! serialised by SQLite itself (WAL journal + busy timeout).

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use wb_core::{
    OntMeta, TransitionError, UnknownState, UnknownWorkKind, WorkInstance, WorkKind, WorkState,
    ALL_STATES,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
CREATE TABLE IF NOT EXISTS state (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    desc TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS workinstance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    input_path TEXT NOT NULL,
    work_type TEXT NOT NULL,
    state_id INTEGER NOT NULL REFERENCES state(id),
    created TEXT NOT NULL,
    last_updated TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_workinstance_input ON workinstance(input_path, work_type);
CREATE TABLE IF NOT EXISTS ontmeta (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    workinstance_id INTEGER NOT NULL REFERENCES workinstance(id) ON DELETE CASCADE,
    experiment_name TEXT NOT NULL,
    instrument_slot INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_ontmeta_instance ON ontmeta(workinstance_id);";

const SELECT_JOB: &str = "SELECT w.id, w.input_path, w.work_type, s.name, w.created, w.last_updated
 FROM workinstance w JOIN state s ON s.id = w.state_id";

/// Errors from the job store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error("work already concluded for {work_kind} on {input_path}")]
    JobAlreadyConcluded {
        input_path: String,
        work_kind: WorkKind,
    },
    #[error("no work instance with id {0}")]
    JobNotFound(i64),
    #[error("stored state is not in the dictionary: {0}")]
    UnknownState(#[from] UnknownState),
    #[error("stored work kind is not in the registry: {0}")]
    UnknownWorkKind(#[from] UnknownWorkKind),
    #[error("stored timestamp is malformed: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// Persistent store of work instances and their states.
#[derive(Clone)]
pub struct StateStore {
    conn: Arc<Mutex<Connection>>,
}

impl StateStore {
    /// Open (creating if absent) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// An in-memory store, for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the schema and seed the state dictionary. Idempotent.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute_batch(SCHEMA)?;
        for state in ALL_STATES {
            conn.execute(
                "INSERT OR IGNORE INTO state (name, desc) VALUES (?1, ?2)",
                params![state.as_str(), state.description()],
            )?;
        }
        Ok(())
    }

    /// Queue new work for a dataset, enforcing the active-job invariant.
    ///
    /// Returns the new PENDING job, or `None` when an unfinished job for the
    /// same (input path, kind) pair already exists. A pair whose history
    /// holds a job in one of the kind's end states is concluded and may not
    /// be re-queued.
    pub fn insert_job(
        &self,
        input_path: &str,
        kind: WorkKind,
    ) -> Result<Option<WorkInstance>, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let existing = jobs_for_pair(&tx, input_path, kind)?;
        if existing.iter().any(WorkInstance::is_concluded) {
            return Err(StoreError::JobAlreadyConcluded {
                input_path: input_path.to_string(),
                work_kind: kind,
            });
        }
        if let Some(unfinished) = existing.iter().find(|job| job.is_in_flight()) {
            tracing::info!(job = unfinished.id, %kind, input_path, "work already queued");
            return Ok(None);
        }

        let now = Utc::now();
        tx.execute(
            "INSERT INTO workinstance (input_path, work_type, state_id, created, last_updated)
             VALUES (?1, ?2, (SELECT id FROM state WHERE name = ?3), ?4, ?5)",
            params![
                input_path,
                kind.as_str(),
                WorkState::Pending.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        let job = WorkInstance {
            id,
            input_path: input_path.to_string(),
            work_kind: kind,
            state: WorkState::Pending,
            created: now,
            last_updated: now,
        };
        tracing::info!(job = job.id, %kind, input_path, "queued work");
        Ok(Some(job))
    }

    /// Jobs for a dataset-kind pair, optionally filtered by state.
    pub fn find_jobs(
        &self,
        input_path: &str,
        kind: WorkKind,
        include_states: Option<&[WorkState]>,
        exclude_states: Option<&[WorkState]>,
    ) -> Result<Vec<WorkInstance>, StoreError> {
        let mut sql = format!("{SELECT_JOB} WHERE w.input_path = ?1 AND w.work_type = ?2");
        let mut values: Vec<String> = vec![input_path.to_string(), kind.as_str().to_string()];

        if let Some(states) = include_states {
            let _ = write!(sql, " AND s.name IN ({})", placeholders(values.len(), states.len()));
            values.extend(states.iter().map(|s| s.as_str().to_string()));
        }
        if let Some(states) = exclude_states {
            let _ = write!(sql, " AND s.name NOT IN ({})", placeholders(values.len(), states.len()));
            values.extend(states.iter().map(|s| s.as_str().to_string()));
        }
        sql.push_str(" ORDER BY w.id");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), job_row)?;
        collect_jobs(rows)
    }

    /// Every job whose state is neither COMPLETED nor CANCELLED.
    pub fn find_in_progress(&self) -> Result<Vec<WorkInstance>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "{SELECT_JOB} WHERE s.name NOT IN (?1, ?2) ORDER BY w.id"
        ))?;
        let rows = stmt.query_map(
            params![
                WorkState::Completed.as_str(),
                WorkState::Cancelled.as_str()
            ],
            job_row,
        )?;
        collect_jobs(rows)
    }

    /// A single job by id.
    pub fn find_job(&self, id: i64) -> Result<WorkInstance, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                &format!("{SELECT_JOB} WHERE w.id = ?1"),
                params![id],
                job_row,
            )
            .optional()?;
        match row {
            Some(raw) => raw.into_job(),
            None => Err(StoreError::JobNotFound(id)),
        }
    }

    /// Atomically validate and commit a state change, bumping `last_updated`.
    ///
    /// The stored state is re-read inside the transaction, so a concurrent
    /// writer cannot slip an illegal move past the table.
    pub fn transition(&self, job: &mut WorkInstance, to: WorkState) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let current: Option<String> = tx
            .query_row(
                "SELECT s.name FROM workinstance w JOIN state s ON s.id = w.state_id
                 WHERE w.id = ?1",
                params![job.id],
                |row| row.get(0),
            )
            .optional()?;
        let current: WorkState = current
            .ok_or(StoreError::JobNotFound(job.id))?
            .parse()?;
        current.validate_transition(to)?;

        let now = Utc::now();
        tx.execute(
            "UPDATE workinstance
             SET state_id = (SELECT id FROM state WHERE name = ?1), last_updated = ?2
             WHERE id = ?3",
            params![to.as_str(), now.to_rfc3339(), job.id],
        )?;
        tx.commit()?;

        tracing::info!(job = job.id, from = %current, to = %to, "state transition");
        job.state = to;
        job.last_updated = now;
        Ok(())
    }

    /// Attach an (experiment, slot) identity to a job.
    pub fn attach_meta(
        &self,
        job: &WorkInstance,
        experiment_name: &str,
        instrument_slot: i64,
    ) -> Result<OntMeta, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO ontmeta (workinstance_id, experiment_name, instrument_slot)
             VALUES (?1, ?2, ?3)",
            params![job.id, experiment_name, instrument_slot],
        )?;
        Ok(OntMeta {
            id: conn.last_insert_rowid(),
            workinstance_id: job.id,
            experiment_name: experiment_name.to_string(),
            instrument_slot,
        })
    }

    /// All ONT metadata rows owned by a job.
    pub fn meta_for(&self, job_id: i64) -> Result<Vec<OntMeta>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, workinstance_id, experiment_name, instrument_slot
             FROM ontmeta WHERE workinstance_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![job_id], |row| {
            Ok(OntMeta {
                id: row.get(0)?,
                workinstance_id: row.get(1)?,
                experiment_name: row.get(2)?,
                instrument_slot: row.get(3)?,
            })
        })?;
        let mut metas = Vec::new();
        for meta in rows {
            metas.push(meta?);
        }
        Ok(metas)
    }
}

/// Raw column values of one job row, before domain parsing.
struct RawJob {
    id: i64,
    input_path: String,
    work_type: String,
    state: String,
    created: String,
    last_updated: String,
}

impl RawJob {
    fn into_job(self) -> Result<WorkInstance, StoreError> {
        Ok(WorkInstance {
            id: self.id,
            input_path: self.input_path,
            work_kind: self.work_type.parse()?,
            state: self.state.parse()?,
            created: parse_timestamp(&self.created)?,
            last_updated: parse_timestamp(&self.last_updated)?,
        })
    }
}

fn job_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawJob> {
    Ok(RawJob {
        id: row.get(0)?,
        input_path: row.get(1)?,
        work_type: row.get(2)?,
        state: row.get(3)?,
        created: row.get(4)?,
        last_updated: row.get(5)?,
    })
}

fn collect_jobs(
    rows: impl Iterator<Item = rusqlite::Result<RawJob>>,
) -> Result<Vec<WorkInstance>, StoreError> {
    let mut jobs = Vec::new();
    for row in rows {
        jobs.push(row?.into_job()?);
    }
    Ok(jobs)
}

fn jobs_for_pair(
    tx: &Transaction<'_>,
    input_path: &str,
    kind: WorkKind,
) -> Result<Vec<WorkInstance>, StoreError> {
    let mut stmt = tx.prepare(&format!(
        "{SELECT_JOB} WHERE w.input_path = ?1 AND w.work_type = ?2 ORDER BY w.id"
    ))?;
    let rows = stmt.query_map(params![input_path, kind.as_str()], job_row)?;
    collect_jobs(rows)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

/// `?N` placeholders continuing after `start` already-bound parameters.
fn placeholders(start: usize, count: usize) -> String {
    (0..count)
        .map(|i| format!("?{}", start + i + 1))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
