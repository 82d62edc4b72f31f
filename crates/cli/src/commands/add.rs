// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::commands::parse_work_kind;
use crate::env;
use anyhow::Result;
use clap::Args;
use wb_core::WorkKind;
use wb_storage::StateStore;

#[derive(Args)]
pub struct AddArgs {
    /// Archive collection holding the input data
    pub input_path: String,

    /// Work kind to queue
    #[arg(long = "work-type", value_parser = parse_work_kind)]
    pub work_type: WorkKind,

    /// Experiment name to record against the job
    #[arg(long, requires = "instrument_slot")]
    pub experiment_name: Option<String>,

    /// Instrument slot to record against the job
    #[arg(long, requires = "experiment_name")]
    pub instrument_slot: Option<i64>,
}

pub fn execute(args: AddArgs) -> Result<()> {
    let store = StateStore::open(&env::database_path()?)?;

    match store.insert_job(&args.input_path, args.work_type)? {
        Some(job) => {
            if let (Some(name), Some(slot)) = (&args.experiment_name, args.instrument_slot) {
                store.attach_meta(&job, name, slot)?;
            }
            println!("queued job {} for {}", job.id, job.input_path);
        }
        None => println!("work already queued for {}", args.input_path),
    }
    Ok(())
}
