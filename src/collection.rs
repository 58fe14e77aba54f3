//! Orchestrator for a complete render run
//!
//! [`Collection`] ties the stages together:
//!
//! 1. **Isolation**: acquire a [`WorkingCopy`] of the source tree.
//! 2. **Discovery**: scan the working copy for packages.
//! 3. **Processing**: for each package, in discovery order, run the
//!    pre-processor (if enabled) and then the processor chain.
//! 4. **Aggregation**: concatenate every package's output.
//! 5. **Release**: clean up the working copy, whatever happened above.
//!
//! The first error from any stage ends the run; no partial output is
//! returned.

use std::path::Path;

use log::{debug, warn};

use crate::config::Config;
use crate::discovery;
use crate::error::Result;
use crate::git::{GitCli, VersionControl};
use crate::processors::preprocess::CommandPreProcessor;
use crate::processors::{PreProcessor, ProcessorChain};
use crate::working_copy::{Strategy, WorkingCopy};

/// Renders every package found in a repository checkout.
pub struct Collection {
    strategy: Strategy,
    chain: ProcessorChain,
    pre: Box<dyn PreProcessor>,
    vcs: Box<dyn VersionControl>,
}

impl Collection {
    /// A collection with the standard processors and the system `git`.
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            config,
            ProcessorChain::standard(config),
            Box::new(CommandPreProcessor::new(
                config.preprocessors.clone(),
                config.command_timeout,
            )),
            Box::new(GitCli::new(&config.git_binary)),
        )
    }

    /// A collection with caller-supplied processors and version control.
    pub fn with_parts(
        config: &Config,
        chain: ProcessorChain,
        pre: Box<dyn PreProcessor>,
        vcs: Box<dyn VersionControl>,
    ) -> Self {
        Self {
            strategy: Strategy::from_config(config),
            chain,
            pre,
            vcs,
        }
    }

    /// Render every package beneath `source` and return the combined output.
    pub fn render(&self, source: &Path) -> Result<String> {
        let working_copy = WorkingCopy::acquire(source, self.strategy, self.vcs.as_ref())?;
        let result = self.render_in(working_copy.path());

        match (result, working_copy.release()) {
            (Ok(output), Ok(())) => Ok(output),
            (Ok(_), Err(cleanup)) => Err(cleanup),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup)) => {
                warn!("Working copy cleanup also failed: {}", cleanup);
                Err(e)
            }
        }
    }

    /// Discover and process packages inside an already isolated tree.
    fn render_in(&self, base_dir: &Path) -> Result<String> {
        let dirs = discovery::discover(base_dir)?;
        debug!("Discovered {} package(s) in {}", dirs.len(), base_dir.display());

        let mut result = String::new();
        for path in dirs.packages() {
            let output = self
                .process_one_dir(base_dir, path)
                .map_err(|e| e.in_package(path))?;
            result.push_str(&output);
        }
        Ok(result)
    }

    /// Render a single package.
    ///
    /// A package no processor applies to contributes no output.
    pub fn process_one_dir(&self, base_dir: &Path, path: &Path) -> Result<String> {
        if self.pre.enabled(base_dir, path) {
            self.pre.generate(base_dir, path)?;
        }

        match self.chain.run(base_dir, path)? {
            Some(output) => Ok(output),
            None => {
                warn!("No processor applies to {}, skipping", path.display());
                Ok(String::new())
            }
        }
    }
}
