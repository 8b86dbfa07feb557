// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! University info generator.
//!
//! This is the binary entry point: resolve one university, resolve a batch,
//! inspect configuration, or run environment diagnostics.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod batch;
mod config_cmd;
mod doctor;
mod resolve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Resolve university facts through ranking tables, crawling, and LLMs.
#[derive(Parser, Debug)]
#[command(name = "unigen", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve one university and print its record as JSON.
    Resolve {
        /// University name or alias (e.g. "UofT").
        name: String,
        /// Write the record to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Resolve every university listed in a file, one JSON record per line.
    Batch {
        /// Text file with one university name per line.
        file: PathBuf,
        /// Write JSONL here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration (secrets redacted).
    Config,
    /// Check config, API keys, database, and ranking data.
    Doctor,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match unigen_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            unigen_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.resolver.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Resolve { name, output } => resolve::run(&config, &name, output.as_deref()).await,
        Commands::Batch { file, output } => batch::run(&config, &file, output.as_deref()).await,
        Commands::Config => config_cmd::run(&config),
        Commands::Doctor => doctor::run(&config).await,
    };

    if let Err(e) = result {
        eprintln!("unigen: {e}");
        std::process::exit(1);
    }
}
