//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::debug;

use manifest_render::config::{
    parse_flag, parse_timeout, split_args, Config, HelmConfig, KustomizeConfig,
};
use manifest_render::error::Error;

use crate::commands;

/// The only positional argument the tool accepts.
const INIT: &str = "init";

/// Manifest Render - Render every deployment package in a repository
#[derive(Parser, Debug)]
#[command(name = "manifest-render")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Optional command: `init` (no-op), or nothing to render the current directory
    #[arg(value_name = "COMMAND")]
    args: Vec<String>,

    /// Restore and clean the checkout with git instead of rendering in a copy
    #[arg(
        long,
        value_name = "BOOL",
        env = "ARGOCD_ENV_ALLOW_GIT_CHECKOUT",
        default_value = "false"
    )]
    allow_git_checkout: String,

    /// Git executable used for in-place restore and clean
    #[arg(long, value_name = "PATH", env = "GIT_BINARY", default_value = "git")]
    git_binary: String,

    /// Helm executable
    #[arg(long, value_name = "PATH", env = "HELM_BINARY", default_value = "helm")]
    helm_binary: String,

    /// Kustomize executable
    #[arg(long, value_name = "PATH", env = "KUSTOMIZE_BINARY", default_value = "kustomize")]
    kustomize_binary: String,

    /// Helm release name
    #[arg(long, value_name = "NAME", env = "ARGOCD_APP_NAME", default_value = "release")]
    release_name: String,

    /// Namespace passed to `helm template`
    #[arg(long, value_name = "NAMESPACE", env = "ARGOCD_APP_NAMESPACE")]
    namespace: Option<String>,

    /// Extra Helm values files (comma separated)
    #[arg(long, value_name = "FILES", env = "ARGOCD_ENV_HELM_VALUES", value_delimiter = ',')]
    helm_values: Vec<String>,

    /// YAML merged into each chart's values.yaml
    #[arg(long, value_name = "YAML", env = "ARGOCD_ENV_HELM_MERGE")]
    helm_merge: Option<String>,

    /// Extra arguments for `helm template` (space separated)
    #[arg(long, value_name = "ARGS", env = "ARGOCD_ENV_HELM_ARGS", allow_hyphen_values = true)]
    helm_args: Option<String>,

    /// YAML merged into each kustomization file
    #[arg(long, value_name = "YAML", env = "ARGOCD_ENV_KUSTOMIZE_MERGE")]
    kustomize_merge: Option<String>,

    /// Extra arguments for `kustomize build` (space separated)
    #[arg(
        long,
        value_name = "ARGS",
        env = "ARGOCD_ENV_KUSTOMIZE_ARGS",
        allow_hyphen_values = true
    )]
    kustomize_args: Option<String>,

    /// Plugin shell commands (comma separated)
    #[arg(long, value_name = "COMMANDS", env = "ARGOCD_ENV_PLUGINS", value_delimiter = ',')]
    plugins: Vec<String>,

    /// Pre-processor shell commands (comma separated)
    #[arg(
        long,
        value_name = "COMMANDS",
        env = "ARGOCD_ENV_PREPROCESSORS",
        value_delimiter = ','
    )]
    preprocessors: Vec<String>,

    /// Timeout for each external renderer command, in seconds
    #[arg(long, value_name = "SECS", env = "ARGOCD_ENV_COMMAND_TIMEOUT")]
    command_timeout: Option<String>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", env = "MANIFEST_RENDER_LOG", default_value = "info")]
    log_level: String,
}

/// What the positional arguments ask for.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Render,
    Init,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.action()? {
            Action::Init => commands::init::execute(),
            Action::Render => {
                let config = self.config().unwrap_or_else(|e| e.exit());
                debug!("Configuration: {:?}", config);
                commands::render::execute(&config)
            }
        }
    }

    fn action(&self) -> std::result::Result<Action, Error> {
        match self.args.as_slice() {
            [] => Ok(Action::Render),
            [arg] if arg == INIT => Ok(Action::Init),
            [arg] => Err(Error::Usage {
                message: format!(
                    "Invalid argument '{}'. Only one optional argument allowed of '{}'",
                    arg, INIT
                ),
            }),
            _ => Err(Error::Usage {
                message: format!(
                    "Too many arguments. Only one optional argument allowed of '{}'",
                    INIT
                ),
            }),
        }
    }

    /// Assemble the library configuration from flags and environment.
    ///
    /// Values only rendering needs are validated here rather than by the
    /// parser, so `init` succeeds whatever the environment holds.
    fn config(&self) -> std::result::Result<Config, clap::Error> {
        let allow_git_checkout = parse_flag(&self.allow_git_checkout)
            .map_err(|e| invalid_value("--allow-git-checkout", &e))?;
        let command_timeout = match self.command_timeout.as_deref() {
            Some(value) => {
                parse_timeout(value).map_err(|e| invalid_value("--command-timeout", &e))?
            }
            None => None,
        };

        Ok(Config {
            allow_git_checkout,
            git_binary: self.git_binary.clone(),
            preprocessors: non_empty(&self.preprocessors),
            plugins: non_empty(&self.plugins),
            helm: HelmConfig {
                binary: self.helm_binary.clone(),
                release_name: self.release_name.clone(),
                namespace: self.namespace.clone().filter(|ns| !ns.is_empty()),
                values_files: non_empty(&self.helm_values),
                values_merge: self.helm_merge.clone().filter(|y| !y.trim().is_empty()),
                extra_args: self.helm_args.as_deref().map(split_args).unwrap_or_default(),
            },
            kustomize: KustomizeConfig {
                binary: self.kustomize_binary.clone(),
                merge: self.kustomize_merge.clone().filter(|y| !y.trim().is_empty()),
                extra_args: self
                    .kustomize_args
                    .as_deref()
                    .map(split_args)
                    .unwrap_or_default(),
            },
            command_timeout,
        })
    }
}

/// A usage error in the same format, and with the same exit code, as the
/// parser's own.
fn invalid_value(flag: &str, message: &str) -> clap::Error {
    Cli::command().error(
        ErrorKind::InvalidValue,
        format!("invalid value for '{}': {}", flag, message),
    )
}

/// Trim list items and drop the empty ones a trailing comma leaves behind.
fn non_empty(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Logs go to stderr; stdout carries only the rendered manifests.
fn init_logging(level: &str) {
    env_logger::Builder::new()
        .parse_filters(level)
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}
