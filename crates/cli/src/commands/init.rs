// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::env;
use anyhow::Result;
use clap::Args;
use wb_storage::StateStore;

#[derive(Args)]
pub struct InitArgs {}

pub fn execute(_args: InitArgs) -> Result<()> {
    let path = env::database_path()?;
    let store = StateStore::open(&path)?;
    store.initialize()?;
    println!("initialized job database at {}", path.display());
    Ok(())
}
