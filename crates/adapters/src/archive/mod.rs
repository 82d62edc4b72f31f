// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archive (object store) client adapters.
//!
//! The `ArchiveClient` trait is the whole of what the core consumes from the
//! object store: path existence, listing, recursive transfers, and AVU
//! metadata operations. The production client speaks the baton JSON wire
//! protocol to a child process and shells out to icommand-style binaries for
//! data transfer; tests use the in-memory fake.

mod baton;

pub use baton::{BatonArchive, Envelope, Response, ResultBody, Target, WireError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeArchive;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use wb_core::Avu;

/// The error code the archive uses for "path does not exist".
pub const NO_SUCH_PATH: i64 = -310000;

/// Errors from archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// An error envelope from the archive server.
    #[error("archive error {code}: {message}")]
    Rods { message: String, code: i64 },
    /// A malformed wire exchange.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// A transfer shim exited non-zero or timed out.
    #[error("{command} failed: {message}")]
    Command { command: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ArchiveError {
    /// Whether this error denotes a missing path (the `exists` predicate).
    pub fn is_missing_path(&self) -> bool {
        matches!(self, ArchiveError::Rods { code, .. } if *code == NO_SUCH_PATH)
    }
}

/// Which kinds of path a metadata query matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaScope {
    Collections,
    DataObjects,
}

/// Options for recursive transfers.
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
    /// Overwrite existing files (allows resume over a partial transfer).
    pub force: bool,
    pub verify_checksum: bool,
    pub recurse: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            force: true,
            verify_checksum: true,
            recurse: true,
        }
    }
}

/// Client for the content-addressed object store.
#[async_trait]
pub trait ArchiveClient: Send + Sync {
    /// Whether a collection or data object exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, ArchiveError>;

    /// Immediate children of a collection, as full paths.
    async fn list_contents(&self, path: &str) -> Result<Vec<String>, ArchiveError>;

    /// Create a collection, making parents as needed.
    async fn create_collection(&self, path: &str) -> Result<(), ArchiveError>;

    /// Remove a path and everything below it.
    async fn remove(&self, path: &str) -> Result<(), ArchiveError>;

    /// Download `remote` into the local directory `local`; the remote leaf
    /// becomes a child of `local`.
    async fn get(
        &self,
        remote: &str,
        local: &Path,
        options: TransferOptions,
    ) -> Result<(), ArchiveError>;

    /// Upload the local directory `local` into the collection `remote`; the
    /// local leaf becomes a child of `remote`.
    async fn put(
        &self,
        local: &Path,
        remote: &str,
        options: TransferOptions,
    ) -> Result<(), ArchiveError>;

    /// All tags on a path, sorted.
    async fn metadata(&self, path: &str) -> Result<Vec<Avu>, ArchiveError>;

    /// Add tags, skipping those already present. Returns the number newly
    /// persisted.
    async fn meta_add(&self, path: &str, avus: &[Avu]) -> Result<usize, ArchiveError>;

    /// Remove tags; absent tags are no-ops. Returns the number removed.
    async fn meta_remove(&self, path: &str, avus: &[Avu]) -> Result<usize, ArchiveError>;

    /// For each attribute named in `avus`, replace any other values of that
    /// attribute with the argument tags. Returns (removed, added).
    ///
    /// The upstream protocol also defines a history mode that records the
    /// superseded values under a marker attribute; that is an extension
    /// point this client does not implement.
    async fn meta_supersede(&self, path: &str, avus: &[Avu])
        -> Result<(usize, usize), ArchiveError>;

    /// Paths whose metadata contains all of `avus`.
    async fn meta_query(
        &self,
        avus: &[Avu],
        scope: MetaScope,
        zone: Option<&str>,
    ) -> Result<Vec<String>, ArchiveError>;
}
