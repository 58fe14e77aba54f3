//! Render command implementation
//!
//! Renders every package beneath the current directory and writes the
//! combined manifests to stdout.

use anyhow::{Context, Result};
use log::info;

use manifest_render::collection::Collection;
use manifest_render::config::Config;

/// Execute the render command
pub fn execute(config: &Config) -> Result<()> {
    let source = std::env::current_dir().context("Failed to get current directory")?;
    info!("Rendering packages in {}", source.display());

    let output = Collection::new(config).render(&source)?;
    println!("{}", output);
    Ok(())
}
