// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O

pub mod archive;
pub mod subprocess;
pub mod warehouse;

pub use archive::{
    ArchiveClient, ArchiveError, BatonArchive, MetaScope, TransferOptions, NO_SUCH_PATH,
};
pub use warehouse::{MlwhWarehouse, WarehouseClient, WarehouseError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use archive::FakeArchive;
#[cfg(any(test, feature = "test-support"))]
pub use warehouse::FakeWarehouse;
