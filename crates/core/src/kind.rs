// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work kinds and their per-kind end states.

use crate::state::WorkState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed enumeration of work kinds.
///
/// A kind names one pipeline of work against a dataset; its wire identity is
/// the string stored in the `workinstance.work_type` column and used as the
/// section name in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkKind {
    /// Analyse the raw data of an ONT sequencing run.
    #[serde(rename = "ONTRunData")]
    OntRunData,
    /// Refresh warehouse-sourced metadata on an archived ONT run.
    #[serde(rename = "ONTRunMetadataUpdate")]
    OntRunMetadataUpdate,
}

/// All kinds, in registry order.
pub const ALL_KINDS: [WorkKind; 2] = [WorkKind::OntRunData, WorkKind::OntRunMetadataUpdate];

impl WorkKind {
    /// The stable wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkKind::OntRunData => "ONTRunData",
            WorkKind::OntRunMetadataUpdate => "ONTRunMetadataUpdate",
        }
    }

    /// States that conclude a dataset for this kind.
    ///
    /// A job in one of these states makes its (input path, kind) pair
    /// ineligible for re-enqueue. Metadata updates may be re-queued after
    /// completion, so only cancellation concludes them.
    pub fn end_states(&self) -> &'static [WorkState] {
        match self {
            WorkKind::OntRunData => &[WorkState::Completed, WorkState::Cancelled],
            WorkKind::OntRunMetadataUpdate => &[WorkState::Cancelled],
        }
    }
}

impl fmt::Display for WorkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkKind {
    type Err = UnknownWorkKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_KINDS
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownWorkKind(s.to_string()))
    }
}

/// A kind name outside the closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown work kind: {0}")]
pub struct UnknownWorkKind(pub String);

#[cfg(test)]
#[path = "kind_tests.rs"]
mod tests;
