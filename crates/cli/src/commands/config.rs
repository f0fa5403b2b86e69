// Path: crates/cli/src/commands/config.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use qgov_cli::config::write_default_config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct ConfigCmdArgs {
    #[clap(subcommand)]
    pub command: ConfigSubCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubCommands {
    /// Write a qgov.toml holding every default.
    New {
        #[clap(long, default_value = "qgov.toml")]
        out: PathBuf,
    },
}

pub fn run(args: ConfigCmdArgs) -> Result<()> {
    match args.command {
        ConfigSubCommands::New { out } => {
            write_default_config(&out)?;
            println!("✅ Generated config file {}", out.display());
        }
    }
    Ok(())
}
