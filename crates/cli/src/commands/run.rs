// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::commands::{context, load_config, parse_datetime, parse_work_kind};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use wb_core::{WorkKind, ALL_KINDS};
use wb_engine::{Broker, PipelineEngine};

#[derive(Args)]
pub struct RunArgs {
    /// Start of the warehouse search window (ISO 8601).
    /// Defaults to the epoch, encompassing all warehouse history.
    #[arg(long = "start-date", value_parser = parse_datetime)]
    pub start_date: Option<DateTime<Utc>>,

    /// Restrict the pass to one work kind
    #[arg(long = "work-type", value_parser = parse_work_kind)]
    pub work_type: Option<WorkKind>,

    /// Archive zone to search
    #[arg(long)]
    pub zone: Option<String>,

    /// Configuration file (overrides the search path)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let ctx = context(config)?;

    let since = args.start_date.unwrap_or(DateTime::UNIX_EPOCH);
    let kinds: Vec<WorkKind> = match args.work_type {
        Some(kind) => vec![kind],
        None => ALL_KINDS.to_vec(),
    };

    // Discovery pass: one broker per kind over the same window.
    let mut added = 0;
    for kind in &kinds {
        let broker = Broker::new(
            ctx.store.clone(),
            ctx.archive.clone(),
            ctx.warehouse.clone(),
            *kind,
        );
        added += broker.request_work(since, args.zone.as_deref()).await?;
    }
    println!("queued {added} new jobs");

    // Engine pass: advance every job the pipeline can still move. A job
    // that cannot advance this pass (input not ready, archive fault) is
    // left for the next one.
    let engine = PipelineEngine::new(ctx.store.clone());
    let mut advanced = 0;
    let mut stalled = 0;
    for mut job in ctx.store.find_in_progress()? {
        if !kinds.contains(&job.work_kind) || !job.state.is_in_flight() {
            continue;
        }
        let worker = ctx.registry.worker(job.work_kind)?;
        match engine.run(&mut job, worker.as_ref()).await {
            Ok(()) => advanced += 1,
            Err(err) => {
                tracing::error!(job = job.id, error = %err, "job did not advance");
                stalled += 1;
            }
        }
    }
    println!("advanced {advanced} jobs, {stalled} stalled");
    Ok(())
}
