// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The guarded step sequence.
//!
//! `run` walks a job through stage, analyse, archive, annotate, unstage and
//! complete. Each step is conditional on the job being in that step's
//! precondition state; a mismatch skips the step silently, which is what
//! makes a partially-progressed job resumable. Each transition is one store
//! transaction, committed after the step body, so a failing body leaves the
//! state untouched and the next pass retries. The analyse step is the one
//! exception: STARTED is committed before the body runs, so a failure has a
//! state to fall from (FAILED).

use crate::{EngineError, Worker};
use wb_core::{WorkInstance, WorkState};
use wb_storage::StateStore;

pub struct PipelineEngine {
    store: StateStore,
}

impl PipelineEngine {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    /// Run every step whose precondition matches, in order.
    ///
    /// Errors outside the analyse step abort the pass without a transition.
    /// An analysis error transitions to FAILED and is re-raised.
    pub async fn run(
        &self,
        job: &mut WorkInstance,
        worker: &(impl Worker + ?Sized),
    ) -> Result<(), EngineError> {
        if job.state == WorkState::Pending {
            if worker.stage_input(job).await? {
                self.store.transition(job, WorkState::Staged)?;
            } else {
                tracing::info!(job = job.id, input = %job.input_path, "input not ready");
                return Ok(());
            }
        }

        if job.state == WorkState::Staged {
            self.store.transition(job, WorkState::Started)?;
            match worker.run_analysis(job).await {
                Ok(()) => self.store.transition(job, WorkState::Succeeded)?,
                Err(err) => {
                    tracing::error!(job = job.id, error = %err, "analysis failed");
                    self.store.transition(job, WorkState::Failed)?;
                    return Err(err);
                }
            }
        }

        if job.state == WorkState::Succeeded {
            worker.archive_output(job).await?;
            self.store.transition(job, WorkState::Archived)?;
        }

        if job.state == WorkState::Archived {
            worker.annotate(job).await?;
            self.store.transition(job, WorkState::Annotated)?;
        }

        if job.state == WorkState::Annotated {
            worker.unstage(job).await?;
            self.store.transition(job, WorkState::Unstaged)?;
        }

        if job.state == WorkState::Unstaged {
            self.store.transition(job, WorkState::Completed)?;
            tracing::info!(job = job.id, "work complete");
        }

        Ok(())
    }

    /// Cancel a job, freeing local scratch when the current state holds any.
    pub async fn cancel(
        &self,
        job: &mut WorkInstance,
        worker: &(impl Worker + ?Sized),
    ) -> Result<(), EngineError> {
        if matches!(job.state, WorkState::Staged | WorkState::Annotated) {
            worker.unstage(job).await?;
        }
        self.store.transition(job, WorkState::Cancelled)?;
        tracing::info!(job = job.id, "work cancelled");
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
