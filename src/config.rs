//! Runtime configuration for a render run.
//!
//! The binary assembles a [`Config`] from command-line flags and the
//! environment variables the GitOps controller exports (Argo CD passes user
//! supplied plugin variables with an `ARGOCD_ENV_` prefix). The library never
//! reads the process environment itself: every component receives the values
//! it needs from this struct, which keeps the working-copy guard and the
//! processors testable without touching global state.

use std::time::Duration;

/// Settings shared by the whole run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Restore and clean the live checkout in place instead of copying it.
    pub allow_git_checkout: bool,
    /// The git executable used for in-place restore/clean.
    pub git_binary: String,
    /// Shell commands run in each package directory before rendering.
    pub preprocessors: Vec<String>,
    /// Shell commands that transform each package's rendered output.
    pub plugins: Vec<String>,
    pub helm: HelmConfig,
    pub kustomize: KustomizeConfig,
    /// Upper bound on each external renderer invocation. `None` waits forever.
    pub command_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_git_checkout: false,
            git_binary: "git".to_string(),
            preprocessors: Vec::new(),
            plugins: Vec::new(),
            helm: HelmConfig::default(),
            kustomize: KustomizeConfig::default(),
            command_timeout: None,
        }
    }
}

/// Helm backend settings.
#[derive(Debug, Clone)]
pub struct HelmConfig {
    pub binary: String,
    pub release_name: String,
    pub namespace: Option<String>,
    /// Extra values files, relative to the chart directory.
    pub values_files: Vec<String>,
    /// YAML document deep-merged into the chart's `values.yaml`.
    pub values_merge: Option<String>,
    pub extra_args: Vec<String>,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            binary: "helm".to_string(),
            release_name: "release".to_string(),
            namespace: None,
            values_files: Vec::new(),
            values_merge: None,
            extra_args: Vec::new(),
        }
    }
}

/// Kustomize backend settings.
#[derive(Debug, Clone)]
pub struct KustomizeConfig {
    pub binary: String,
    /// YAML document deep-merged into the package's kustomization file.
    pub merge: Option<String>,
    pub extra_args: Vec<String>,
}

impl Default for KustomizeConfig {
    fn default() -> Self {
        Self {
            binary: "kustomize".to_string(),
            merge: None,
            extra_args: Vec::new(),
        }
    }
}

/// Parse a boolean-like option value.
///
/// Accepts `true`/`false`, `yes`/`no`, `on`/`off` and `1`/`0` in any case,
/// ignoring surrounding whitespace. An empty value means `false`, which is
/// what an exported-but-unset variable looks like.
pub fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "off" | "0" => Ok(false),
        "true" | "yes" | "on" | "1" => Ok(true),
        other => Err(format!(
            "'{}' is not a boolean (expected true/false, yes/no, on/off or 1/0)",
            other
        )),
    }
}

/// Parse a command timeout in whole seconds.
///
/// An empty value means no timeout. Zero is rejected: it would kill every
/// command before it could start.
pub fn parse_timeout(value: &str) -> std::result::Result<Option<Duration>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<u64>() {
        Ok(0) => Err("timeout must be at least 1 second".to_string()),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
        Err(_) => Err(format!("'{}' is not a number of seconds", value)),
    }
}

/// Split a whitespace separated argument string, dropping empty pieces.
pub fn split_args(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}
