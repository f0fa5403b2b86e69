// Path: crates/cli/src/main.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # qgov CLI
//!
//! Runs registry scripts against an in-memory host and manages configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::*;

#[derive(Parser, Debug)]
#[clap(
    name = "qgov",
    version,
    about = "Drive the qgov parameter-governance registries.",
    long_about = "qgov runs JSON scripts of registry operations against an in-memory store and a manual block clock, printing one JSON outcome per step."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a JSON script of registry operations.
    Run(run::RunArgs),

    /// Generate configuration files.
    Config(config::ConfigCmdArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run::run(args),
        Commands::Config(args) => config::run(args),
    }
}
