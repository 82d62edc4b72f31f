// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work instance and ONT metadata records.

use crate::kind::WorkKind;
use crate::state::WorkState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One unit of work against a dataset.
///
/// Rows are created by the broker (or an operator `add`), mutated only
/// through guarded state transitions, and retained forever as the audit
/// trail that gates future insertions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInstance {
    /// Database-assigned identity, stable for the record's life.
    pub id: i64,
    /// Absolute archive path of the input collection.
    pub input_path: String,
    pub work_kind: WorkKind,
    pub state: WorkState,
    pub created: DateTime<Utc>,
    /// Bumped on every state change.
    pub last_updated: DateTime<Utc>,
}

impl WorkInstance {
    /// True when no further transition is legal for this job.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// True when this job's state concludes its dataset for its kind.
    pub fn is_concluded(&self) -> bool {
        self.work_kind.end_states().contains(&self.state)
    }

    /// True when the pipeline can still advance this job.
    pub fn is_in_flight(&self) -> bool {
        self.state.is_in_flight()
    }
}

impl fmt::Display for WorkInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WorkInstance {} [{} {} {}]",
            self.id, self.work_kind, self.state, self.input_path
        )
    }
}

/// ONT platform identity attached to a work instance.
///
/// A job normally owns one row; merged flowcells may contribute several, all
/// of which are consumed together by the annotate step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntMeta {
    pub id: i64,
    pub workinstance_id: i64,
    pub experiment_name: String,
    pub instrument_slot: i64,
}

#[cfg(test)]
#[path = "work_tests.rs"]
mod tests;
