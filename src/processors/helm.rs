//! Helm charts: `helm template` on any directory holding a `Chart.yaml`.
//!
//! Before templating, controller-supplied values can be deep-merged into the
//! chart's own `values.yaml`, and chart dependencies are fetched with
//! `helm dependency build` when `Chart.yaml` declares any. Both steps write
//! only inside the working copy.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::config::HelmConfig;
use crate::error::Result;
use crate::merge::yaml::merge_into_file;
use crate::processors::command::{self, CommandSpec};
use crate::processors::{append_output, is_helm_chart, Processor, HELM_MARKER};

/// The parts of `Chart.yaml` the processor looks at.
#[derive(Debug, Default, Deserialize)]
struct ChartManifest {
    #[serde(default)]
    dependencies: Vec<serde_yaml::Value>,
}

pub struct HelmProcessor {
    config: HelmConfig,
    timeout: Option<Duration>,
}

impl HelmProcessor {
    pub fn new(config: HelmConfig, timeout: Option<Duration>) -> Self {
        Self { config, timeout }
    }

    fn template_command(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.config.binary)
            .arg("template")
            .arg(&self.config.release_name)
            .arg(".");
        if let Some(namespace) = &self.config.namespace {
            spec = spec.arg("--namespace").arg(namespace);
        }
        for values in &self.config.values_files {
            spec = spec.arg("--values").arg(values);
        }
        spec.args(self.config.extra_args.iter().cloned())
    }

    fn dependency_command(&self) -> CommandSpec {
        CommandSpec::new(&self.config.binary).args(["dependency", "build", "."])
    }
}

/// True if the chart at `path` declares dependencies.
fn has_dependencies(path: &Path) -> Result<bool> {
    let content = fs::read_to_string(path.join(HELM_MARKER))?;
    if content.trim().is_empty() {
        return Ok(false);
    }
    let chart: ChartManifest = serde_yaml::from_str(&content)?;
    Ok(!chart.dependencies.is_empty())
}

impl Processor for HelmProcessor {
    fn name(&self) -> &'static str {
        "helm"
    }

    fn enabled(&self, _base_dir: &Path, path: &Path) -> bool {
        is_helm_chart(path)
    }

    fn generate(&self, input: Option<String>, _base_dir: &Path, path: &Path) -> Result<String> {
        if let Some(overlay) = &self.config.values_merge {
            merge_into_file(&path.join("values.yaml"), overlay)?;
        }

        if has_dependencies(path)? {
            command::run(&self.dependency_command(), path, None, self.timeout)?;
        }

        let output = command::run(&self.template_command(), path, None, self.timeout)?;
        Ok(append_output(input, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn chart(content: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Chart.yaml"), content).unwrap();
        temp
    }

    #[test]
    fn test_enabled_only_for_charts() {
        let processor = HelmProcessor::new(HelmConfig::default(), None);
        let plain = TempDir::new().unwrap();
        assert!(!processor.enabled(plain.path(), plain.path()));

        let chart = chart("name: web\n");
        assert!(processor.enabled(chart.path(), chart.path()));
    }

    #[test]
    fn test_template_command_includes_options() {
        let processor = HelmProcessor::new(
            HelmConfig {
                release_name: "web".to_string(),
                namespace: Some("prod".to_string()),
                values_files: vec!["values-prod.yaml".to_string(), "secrets.yaml".to_string()],
                extra_args: vec!["--include-crds".to_string()],
                ..HelmConfig::default()
            },
            None,
        );

        assert_eq!(
            processor.template_command().to_string(),
            "helm template web . --namespace prod --values values-prod.yaml --values secrets.yaml --include-crds"
        );
    }

    #[test]
    fn test_has_dependencies() {
        assert!(!has_dependencies(chart("name: web\nversion: 0.1.0\n").path()).unwrap());
        assert!(!has_dependencies(chart("").path()).unwrap());
        assert!(has_dependencies(
            chart("name: web\ndependencies:\n- name: redis\n  version: 1.0.0\n").path()
        )
        .unwrap());
    }

    #[test]
    fn test_has_dependencies_rejects_invalid_chart() {
        let err = has_dependencies(chart("name: [unclosed").path()).unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_generate_merges_values_and_templates() {
        let chart = chart("name: web\n");
        fs::write(chart.path().join("values.yaml"), "replicas: 1\n").unwrap();

        // `echo` stands in for helm and prints the arguments it was given.
        let processor = HelmProcessor::new(
            HelmConfig {
                binary: "echo".to_string(),
                values_merge: Some("replicas: 3\n".to_string()),
                ..HelmConfig::default()
            },
            None,
        );

        let out = processor.generate(None, chart.path(), chart.path()).unwrap();

        assert_eq!(out, "template release .\n");
        let values = fs::read_to_string(chart.path().join("values.yaml")).unwrap();
        assert!(values.contains("replicas: 3"));
    }

    #[test]
    fn test_generate_failure_propagates() {
        let chart = chart("name: web\n");
        let processor = HelmProcessor::new(
            HelmConfig {
                binary: "no-such-helm".to_string(),
                ..HelmConfig::default()
            },
            None,
        );

        let err = processor.generate(None, chart.path(), chart.path()).unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
    }
}
