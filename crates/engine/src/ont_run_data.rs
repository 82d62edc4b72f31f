// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker for analysing archived ONT run data.

use crate::{EngineError, Worker};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;
use wb_adapters::{ArchiveClient, TransferOptions};
use wb_core::metadata;
use wb_core::WorkInstance;
use wb_storage::StateStore;

/// The producer writes this file into a run directory when the run is done;
/// until it appears the input is incomplete and must not be staged.
pub const COMPLETION_MARKER: &str = "final_report.txt.gz";

const INPUT_DIR: &str = "input";
const OUTPUT_DIR: &str = "output";

/// Stages a run from the archive, executes the configured analysis command
/// over it, uploads the output and tags it with the run's identity.
///
/// Each job owns the subtrees `{staging_root}/{id}/` locally and
/// `{archive_root}/{id}/` in the archive.
pub struct OntRunDataWorker {
    archive: Arc<dyn ArchiveClient>,
    store: StateStore,
    archive_root: String,
    staging_root: PathBuf,
    command: String,
}

impl std::fmt::Debug for OntRunDataWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntRunDataWorker")
            .field("archive_root", &self.archive_root)
            .field("staging_root", &self.staging_root)
            .field("command", &self.command)
            .finish()
    }
}

impl OntRunDataWorker {
    pub fn new(
        archive: Arc<dyn ArchiveClient>,
        store: StateStore,
        archive_root: impl Into<String>,
        staging_root: impl Into<PathBuf>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            archive,
            store,
            archive_root: archive_root.into(),
            staging_root: staging_root.into(),
            command: command.into(),
        }
    }

    /// The archive collection receiving this job's results.
    pub fn archive_path(&self, job: &WorkInstance) -> String {
        format!("{}/{}", self.archive_root.trim_end_matches('/'), job.id)
    }

    /// The local scratch subtree owned by this job.
    pub fn staging_path(&self, job: &WorkInstance) -> PathBuf {
        self.staging_root.join(job.id.to_string())
    }

    /// Where staged input lands; fixed so the analysis command sees a stable
    /// path whatever the archive leaf was called.
    pub fn staging_input_path(&self, job: &WorkInstance) -> PathBuf {
        self.staging_path(job).join(INPUT_DIR)
    }

    pub fn staging_output_path(&self, job: &WorkInstance) -> PathBuf {
        self.staging_path(job).join(OUTPUT_DIR)
    }

    /// The input collection exists and carries the completion marker among
    /// its immediate children.
    async fn input_is_complete(&self, job: &WorkInstance) -> Result<bool, EngineError> {
        if !self.archive.exists(&job.input_path).await? {
            tracing::info!(job = job.id, input = %job.input_path, "input collection absent");
            return Ok(false);
        }

        let contents = self.archive.list_contents(&job.input_path).await?;
        let complete = contents
            .iter()
            .any(|path| path.ends_with(COMPLETION_MARKER));
        if !complete {
            tracing::info!(job = job.id, input = %job.input_path, "run is not yet complete");
        }
        Ok(complete)
    }
}

#[async_trait]
impl Worker for OntRunDataWorker {
    async fn stage_input(&self, job: &WorkInstance) -> Result<bool, EngineError> {
        if !self.input_is_complete(job).await? {
            return Ok(false);
        }

        tracing::info!(job = job.id, input = %job.input_path, "staging input data");
        let staging = self.staging_path(job);
        tokio::fs::create_dir_all(&staging).await?;
        self.archive
            .get(&job.input_path, &staging, TransferOptions::default())
            .await?;

        // The archive leaf lands under the staging path; move it to the
        // fixed input name, displacing any partial leftovers.
        let leaf = job
            .input_path
            .rsplit('/')
            .next()
            .unwrap_or(job.input_path.as_str());
        let downloaded = staging.join(leaf);
        let input = self.staging_input_path(job);
        if input.exists() {
            tokio::fs::remove_dir_all(&input).await?;
        }
        tokio::fs::rename(&downloaded, &input).await?;
        Ok(true)
    }

    async fn run_analysis(&self, job: &WorkInstance) -> Result<(), EngineError> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or(EngineError::EmptyCommand)?;

        let output_dir = self.staging_output_path(job);
        tokio::fs::create_dir_all(&output_dir).await?;

        let mut cmd = Command::new(program);
        cmd.args(parts);
        cmd.arg("-i").arg(self.staging_input_path(job));
        cmd.arg("-o").arg(&output_dir);
        cmd.arg("-v");
        cmd.current_dir(&output_dir);

        tracing::info!(job = job.id, command = %self.command, "running analysis");
        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(EngineError::AnalysisFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        Ok(())
    }

    async fn archive_output(&self, job: &WorkInstance) -> Result<(), EngineError> {
        let dst = self.archive_path(job);
        tracing::info!(job = job.id, archive = %dst, "archiving output data");

        if !self.archive.exists(&dst).await? {
            self.archive.create_collection(&dst).await?;
        }
        self.archive
            .put(&self.staging_output_path(job), &dst, TransferOptions::default())
            .await?;
        Ok(())
    }

    async fn annotate(&self, job: &WorkInstance) -> Result<(), EngineError> {
        let dst = self.archive_path(job);
        for meta in self.store.meta_for(job.id)? {
            let avus = metadata::experiment_slot_avus(&meta.experiment_name, meta.instrument_slot);
            self.archive.meta_add(&dst, &avus).await?;
        }
        Ok(())
    }

    async fn unstage(&self, job: &WorkInstance) -> Result<(), EngineError> {
        tracing::info!(job = job.id, "unstaging input data");
        match tokio::fs::remove_dir_all(self.staging_path(job)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
#[path = "ont_run_data_tests.rs"]
mod tests;
