//! Kustomize packages: `kustomize build` on any directory holding a
//! kustomization file.

use std::path::Path;
use std::time::Duration;

use crate::config::KustomizeConfig;
use crate::error::{Error, Result};
use crate::merge::yaml::merge_into_file;
use crate::processors::command::{self, CommandSpec};
use crate::processors::{append_output, find_kustomization, is_kustomization, Processor};

pub struct KustomizeProcessor {
    config: KustomizeConfig,
    timeout: Option<Duration>,
}

impl KustomizeProcessor {
    pub fn new(config: KustomizeConfig, timeout: Option<Duration>) -> Self {
        Self { config, timeout }
    }

    fn build_command(&self) -> CommandSpec {
        CommandSpec::new(&self.config.binary)
            .arg("build")
            .arg(".")
            .args(self.config.extra_args.iter().cloned())
    }
}

impl Processor for KustomizeProcessor {
    fn name(&self) -> &'static str {
        "kustomize"
    }

    fn enabled(&self, _base_dir: &Path, path: &Path) -> bool {
        is_kustomization(path)
    }

    fn generate(&self, input: Option<String>, _base_dir: &Path, path: &Path) -> Result<String> {
        if let Some(overlay) = &self.config.merge {
            let file = find_kustomization(path).ok_or_else(|| Error::Processor {
                processor: self.name().to_string(),
                message: format!("no kustomization file in {}", path.display()),
            })?;
            merge_into_file(&file, overlay)?;
        }

        let output = command::run(&self.build_command(), path, None, self.timeout)?;
        Ok(append_output(input, output))
    }
}
