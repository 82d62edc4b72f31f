// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::commands::{context, load_config};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use wb_engine::PipelineEngine;

#[derive(Args)]
pub struct CancelArgs {
    /// Job id to cancel
    pub job_id: i64,

    /// Configuration file (overrides the search path)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: CancelArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let ctx = context(config)?;

    let mut job = ctx.store.find_job(args.job_id)?;
    let worker = ctx.registry.worker(job.work_kind)?;

    let engine = PipelineEngine::new(ctx.store.clone());
    engine.cancel(&mut job, worker.as_ref()).await?;
    println!("cancelled job {}", job.id);
    Ok(())
}
