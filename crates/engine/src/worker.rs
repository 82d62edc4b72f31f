// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-kind worker interface.
//!
//! A worker supplies the bodies of the pipeline steps; the engine supplies
//! the guards and the state transitions around them. Workers that move no
//! data implement the movement steps as no-ops, which still advances the
//! state machine.

use crate::EngineError;
use async_trait::async_trait;
use wb_core::WorkInstance;

#[async_trait]
pub trait Worker: Send + Sync + std::fmt::Debug {
    /// Stage the input data into local scratch.
    ///
    /// Returns `Ok(false)` when the input is not yet ready (absent or
    /// incomplete); the engine then leaves the job pending and a later pass
    /// retries.
    async fn stage_input(&self, job: &WorkInstance) -> Result<bool, EngineError>;

    /// Execute the analysis over the staged input.
    async fn run_analysis(&self, job: &WorkInstance) -> Result<(), EngineError>;

    /// Upload the analysis output into the archive.
    async fn archive_output(&self, job: &WorkInstance) -> Result<(), EngineError>;

    /// Attach metadata to the archived results.
    async fn annotate(&self, job: &WorkInstance) -> Result<(), EngineError>;

    /// Delete the job's local scratch.
    async fn unstage(&self, job: &WorkInstance) -> Result<(), EngineError>;
}
