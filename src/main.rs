//! # Manifest Render CLI
//!
//! This is the binary entry point for the `manifest-render` command-line tool,
//! run by a GitOps controller as a config-management plugin.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments and environment variables using `clap`.
//! - Executing the requested command.
//! - Translating errors into a single diagnostic on stderr and a non-zero
//!   exit status.
//!
//! The rendering logic lives in the `lib.rs` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
