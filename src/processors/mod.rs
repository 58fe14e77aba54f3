//! # Processors
//!
//! A processor renders (or transforms the rendering of) one package. Every
//! processor answers two questions:
//!
//! - **`enabled`**: does it apply to this package? This must be a pure check
//!   of the package's files and the configuration, with no side effects.
//! - **`generate`**: given the output accumulated so far, produce the new
//!   output. It may read and write files under the package directory, which
//!   is always inside an isolated working copy.
//!
//! ## Chain of responsibility
//!
//! [`ProcessorChain`] holds processors in an explicit priority order. For
//! each package every enabled processor runs, in order, and each receives
//! the previous one's output. The standard order is:
//!
//! 1. [`yaml::YamlProcessor`] - plain manifests
//! 2. [`kustomize::KustomizeProcessor`]
//! 3. [`helm::HelmProcessor`]
//! 4. [`plugin::PluginProcessor`] - the generic fallback / post-processor
//!
//! Selection is not exclusive. A package holding both a kustomization and a
//! `Chart.yaml` is rendered by Kustomize *and* Helm, with the two outputs
//! concatenated; a configured plugin then receives that combined stream on
//! stdin. This layering is deliberate but easy to trip over when a chart
//! directory also carries a stray kustomization file.
//!
//! A [`PreProcessor`] may run before the chain. Its output is not threaded;
//! it exists to prepare files in the package directory.

pub mod command;
pub mod helm;
pub mod kustomize;
pub mod plugin;
pub mod preprocess;
pub mod yaml;

use std::path::Path;

use log::debug;

use crate::config::Config;
use crate::error::Result;

/// File names that mark a directory as a Kustomize package.
pub const KUSTOMIZE_MARKERS: &[&str] = &["kustomization.yaml", "kustomization.yml", "Kustomization"];

/// File name that marks a directory as a Helm chart.
pub const HELM_MARKER: &str = "Chart.yaml";

/// A backend that renders or transforms a package.
pub trait Processor {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Whether this processor applies to the package at `path`.
    fn enabled(&self, base_dir: &Path, path: &Path) -> bool;

    /// Produce output for the package, given the output of earlier
    /// processors in the chain (`None` if this is the first to run).
    fn generate(&self, input: Option<String>, base_dir: &Path, path: &Path) -> Result<String>;
}

/// A step that prepares a package directory before rendering.
pub trait PreProcessor {
    fn enabled(&self, base_dir: &Path, path: &Path) -> bool;

    fn generate(&self, base_dir: &Path, path: &Path) -> Result<()>;
}

/// Processors in priority order.
pub struct ProcessorChain {
    processors: Vec<Box<dyn Processor>>,
}

impl ProcessorChain {
    pub fn new(processors: Vec<Box<dyn Processor>>) -> Self {
        Self { processors }
    }

    /// The standard chain: yaml, Kustomize, Helm, then plugin.
    pub fn standard(config: &Config) -> Self {
        Self::new(vec![
            Box::new(yaml::YamlProcessor::new()),
            Box::new(kustomize::KustomizeProcessor::new(
                config.kustomize.clone(),
                config.command_timeout,
            )),
            Box::new(helm::HelmProcessor::new(
                config.helm.clone(),
                config.command_timeout,
            )),
            Box::new(plugin::PluginProcessor::new(
                config.plugins.clone(),
                config.command_timeout,
            )),
        ])
    }

    /// Run every enabled processor for one package, threading output.
    ///
    /// Returns `None` when no processor applied.
    pub fn run(&self, base_dir: &Path, path: &Path) -> Result<Option<String>> {
        let mut result: Option<String> = None;
        for processor in &self.processors {
            if processor.enabled(base_dir, path) {
                debug!("Running {} for {}", processor.name(), path.display());
                result = Some(processor.generate(result, base_dir, path)?);
            }
        }
        Ok(result)
    }
}

/// True if the directory holds a Kustomize marker file.
pub fn is_kustomization(path: &Path) -> bool {
    find_kustomization(path).is_some()
}

/// The Kustomize marker file inside `path`, if any.
pub fn find_kustomization(path: &Path) -> Option<std::path::PathBuf> {
    KUSTOMIZE_MARKERS
        .iter()
        .map(|name| path.join(name))
        .find(|candidate| candidate.is_file())
}

/// True if the directory is a Helm chart.
pub fn is_helm_chart(path: &Path) -> bool {
    path.join(HELM_MARKER).is_file()
}

/// Append `output` to any prior output, keeping documents separated.
pub(crate) fn append_output(input: Option<String>, output: String) -> String {
    match input {
        Some(mut prior) if !prior.is_empty() => {
            if !prior.ends_with('\n') {
                prior.push('\n');
            }
            prior.push_str(&output);
            prior
        }
        _ => output,
    }
}
