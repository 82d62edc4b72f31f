// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subcommands

pub mod add;
pub mod cancel;
pub mod init;
pub mod run;

use crate::env;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use wb_adapters::{ArchiveClient, BatonArchive, MlwhWarehouse, WarehouseClient};
use wb_core::{Config, WorkKind};
use wb_engine::WorkerRegistry;
use wb_storage::StateStore;

/// Shared client handles for commands that drive the engine.
pub(crate) struct Context {
    pub store: StateStore,
    pub archive: Arc<dyn ArchiveClient>,
    pub warehouse: Arc<dyn WarehouseClient>,
    pub registry: WorkerRegistry,
}

pub(crate) fn load_config(override_path: Option<&Path>) -> Result<Config> {
    Ok(match override_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    })
}

pub(crate) fn context(config: Config) -> Result<Context> {
    let store = StateStore::open(&env::database_path()?)?;
    let archive: Arc<dyn ArchiveClient> = Arc::new(BatonArchive::new());
    let warehouse: Arc<dyn WarehouseClient> =
        Arc::new(MlwhWarehouse::open(&env::warehouse_path()?)?);

    let registry = WorkerRegistry::new(config, store.clone(), archive.clone(), warehouse.clone());
    registry.validate()?;

    Ok(Context {
        store,
        archive,
        warehouse,
        registry,
    })
}

/// Parse a work kind by its wire name, for clap.
pub(crate) fn parse_work_kind(value: &str) -> Result<WorkKind, String> {
    value.parse().map_err(|err| format!("{err}"))
}

/// Parse an ISO 8601 date or datetime, for clap.
pub(crate) fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(parsed.and_utc());
    }
    if let Some(parsed) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(parsed.and_utc());
    }
    Err(format!("invalid date: '{value}'"))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
