//! Pre-processing commands.
//!
//! Configured shell commands run in the package directory before any
//! processor, for example to decrypt secrets or fetch chart dependencies from
//! a private registry. Their stdout is logged, not rendered.

use std::path::Path;
use std::time::Duration;

use log::debug;

use crate::error::Result;
use crate::processors::command;
use crate::processors::plugin::shell_command;
use crate::processors::PreProcessor;

pub struct CommandPreProcessor {
    commands: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandPreProcessor {
    pub fn new(commands: Vec<String>, timeout: Option<Duration>) -> Self {
        Self { commands, timeout }
    }
}

impl PreProcessor for CommandPreProcessor {
    fn enabled(&self, _base_dir: &Path, _path: &Path) -> bool {
        !self.commands.is_empty()
    }

    fn generate(&self, base_dir: &Path, path: &Path) -> Result<()> {
        for script in &self.commands {
            let spec = shell_command(script, base_dir, path);
            let output = command::run(&spec, path, None, self.timeout)?;
            if !output.trim().is_empty() {
                debug!("Pre-processor `{}` output: {}", script, output.trim());
            }
        }
        Ok(())
    }
}
