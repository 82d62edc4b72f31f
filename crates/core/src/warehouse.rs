// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only views of the LIMS warehouse, trimmed to the columns the
//! annotation pipeline consumes.

use serde::{Deserialize, Serialize};

/// The platform's two-level identifier for a data-producing event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExperimentSlot {
    pub experiment_name: String,
    pub instrument_slot: i64,
}

impl ExperimentSlot {
    pub fn new(experiment_name: impl Into<String>, instrument_slot: i64) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            instrument_slot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// The LIMS sample identifier (`sanger_sample_id` upstream).
    pub lims_id: Option<String>,
    pub name: Option<String>,
    pub accession_number: Option<String>,
    pub donor_id: Option<String>,
    pub supplier_name: Option<String>,
    pub consent_withdrawn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
    /// The LIMS study identifier.
    pub lims_id: Option<String>,
    pub name: Option<String>,
    pub accession_number: Option<String>,
}

/// One flowcell row: a whole run, or one barcode of a multiplexed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flowcell {
    pub experiment_name: String,
    pub instrument_slot: i64,
    /// Barcode index within a multiplexed run; absent for a single-sample run.
    pub tag_identifier: Option<i64>,
    pub tag_sequence: Option<String>,
    pub sample: Sample,
    pub study: Study,
}
