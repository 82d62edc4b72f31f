// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The metadata vocabulary attached to archived runs.

use crate::avu::Avu;
use crate::warehouse::{Sample, Study};

/// Namespace for tags intrinsic to the ONT platform.
pub const ONT_NAMESPACE: &str = "ont";

pub const EXPERIMENT_NAME: &str = "experiment_name";
pub const INSTRUMENT_SLOT: &str = "instrument_slot";

/// Barcode index within a multiplexed run (no namespace).
pub const TAG_INDEX: &str = "tag_index";

pub const SAMPLE_ID: &str = "sample_id";
pub const SAMPLE_NAME: &str = "sample_name";
pub const SAMPLE_ACCESSION_NUMBER: &str = "sample_accession_number";
pub const SAMPLE_DONOR_ID: &str = "sample_donor_id";
pub const SAMPLE_SUPPLIER_NAME: &str = "sample_supplier_name";
pub const SAMPLE_CONSENT_WITHDRAWN: &str = "sample_consent_withdrawn";

pub const STUDY_ID: &str = "study_id";
pub const STUDY_NAME: &str = "study_name";
pub const STUDY_ACCESSION_NUMBER: &str = "study_accession_number";

/// The `ont:` tags identifying a run.
pub fn experiment_slot_avus(experiment_name: &str, instrument_slot: i64) -> Vec<Avu> {
    vec![
        Avu::new(EXPERIMENT_NAME, experiment_name).with_namespace(ONT_NAMESPACE),
        Avu::new(INSTRUMENT_SLOT, instrument_slot).with_namespace(ONT_NAMESPACE),
    ]
}

/// The barcode sub-directory name used by the ONT de-plexers for a tag index.
pub fn barcode_dir(tag_identifier: i64) -> String {
    format!("barcode{:02}", tag_identifier)
}

fn avu_if_value(attribute: &str, value: Option<&str>) -> Option<Avu> {
    value.map(|v| Avu::new(attribute, v))
}

/// Sample tags; attributes whose warehouse value is null are skipped, and the
/// consent flag is present only when consent has been withdrawn.
pub fn sample_avus(sample: &Sample) -> Vec<Avu> {
    let mut avus: Vec<Avu> = [
        (SAMPLE_ID, sample.lims_id.as_deref()),
        (SAMPLE_NAME, sample.name.as_deref()),
        (SAMPLE_ACCESSION_NUMBER, sample.accession_number.as_deref()),
        (SAMPLE_DONOR_ID, sample.donor_id.as_deref()),
        (SAMPLE_SUPPLIER_NAME, sample.supplier_name.as_deref()),
    ]
    .into_iter()
    .filter_map(|(attribute, value)| avu_if_value(attribute, value))
    .collect();

    if sample.consent_withdrawn {
        avus.push(Avu::new(SAMPLE_CONSENT_WITHDRAWN, 1));
    }

    avus
}

/// Study tags; null warehouse values are skipped.
pub fn study_avus(study: &Study) -> Vec<Avu> {
    [
        (STUDY_ID, study.lims_id.as_deref()),
        (STUDY_NAME, study.name.as_deref()),
        (STUDY_ACCESSION_NUMBER, study.accession_number.as_deref()),
    ]
    .into_iter()
    .filter_map(|(attribute, value)| avu_if_value(attribute, value))
    .collect()
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
