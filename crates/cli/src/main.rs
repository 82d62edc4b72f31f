// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! workbot - ETL automation for sequencing archives

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod env;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{add, cancel, init, run};

#[derive(Parser)]
#[command(
    name = "workbot",
    version,
    about = "WorkBot - drives analysis pipelines over archived sequencing runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the job database schema and state dictionary
    Init(init::InitArgs),
    /// Queue one job by hand
    Add(add::AddArgs),
    /// Discover new work, then advance every unfinished job
    Run(run::RunArgs),
    /// Cancel a job, freeing any local scratch it holds
    Cancel(cancel::CancelArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => init::execute(args),
        Commands::Add(args) => add::execute(args),
        Commands::Run(args) => run::execute(args).await,
        Commands::Cancel(args) => cancel::execute(args).await,
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}
