//! Init command implementation
//!
//! The controller calls `init` before every generate; there is nothing to
//! prepare, so it succeeds without touching the checkout.

use anyhow::Result;

/// Execute the init command
pub fn execute() -> Result<()> {
    Ok(())
}
