// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment resolution for the CLI

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Connection path for the job store.
pub const DATABASE_ENV: &str = "WORKBOT_DATABASE";

/// Connection path for the (read-only) warehouse mirror.
pub const WAREHOUSE_ENV: &str = "MLWH_DATABASE";

pub fn database_path() -> Result<PathBuf> {
    std::env::var(DATABASE_ENV)
        .map(PathBuf::from)
        .with_context(|| format!("{DATABASE_ENV} must point at the job database"))
}

pub fn warehouse_path() -> Result<PathBuf> {
    std::env::var(WAREHOUSE_ENV)
        .map(PathBuf::from)
        .with_context(|| format!("{WAREHOUSE_ENV} must point at the warehouse mirror"))
}
