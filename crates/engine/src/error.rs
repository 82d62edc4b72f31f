// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the pipeline engine

use thiserror::Error;
use wb_adapters::{ArchiveError, WarehouseError};
use wb_core::ConfigError;
use wb_storage::StoreError;

/// Errors that can occur while driving a job through its pipeline.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("analysis command exited with {status}: {stderr}")]
    AnalysisFailed { status: i32, stderr: String },
    #[error("analysis command is empty")]
    EmptyCommand,
    #[error("job {job} has {count} metadata rows; exactly one is required")]
    MetadataCardinality { job: i64, count: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
