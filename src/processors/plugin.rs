//! Generic plugin commands.
//!
//! Each configured command is a shell command line run in the package
//! directory. The output accumulated so far is piped to the first command's
//! stdin and each command's stdout feeds the next, so plugins can either
//! generate manifests from scratch or post-process what the built-in
//! renderers produced. `BASE_DIR` and `PACKAGE_DIR` are exported to every
//! command.

use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::processors::command::{self, CommandSpec};
use crate::processors::Processor;

pub struct PluginProcessor {
    commands: Vec<String>,
    timeout: Option<Duration>,
}

impl PluginProcessor {
    pub fn new(commands: Vec<String>, timeout: Option<Duration>) -> Self {
        Self { commands, timeout }
    }
}

/// `sh -c <script>` with the package location exported.
pub(crate) fn shell_command(script: &str, base_dir: &Path, path: &Path) -> CommandSpec {
    CommandSpec::shell(script)
        .env("BASE_DIR", base_dir.to_string_lossy())
        .env("PACKAGE_DIR", path.to_string_lossy())
}

impl Processor for PluginProcessor {
    fn name(&self) -> &'static str {
        "plugin"
    }

    fn enabled(&self, _base_dir: &Path, _path: &Path) -> bool {
        !self.commands.is_empty()
    }

    fn generate(&self, input: Option<String>, base_dir: &Path, path: &Path) -> Result<String> {
        let mut current = input.unwrap_or_default();
        for script in &self.commands {
            let spec = shell_command(script, base_dir, path);
            current = command::run(&spec, path, Some(&current), self.timeout)?;
        }
        Ok(current)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_enabled_when_commands_configured() {
        let temp = TempDir::new().unwrap();
        assert!(!PluginProcessor::new(Vec::new(), None).enabled(temp.path(), temp.path()));
        assert!(PluginProcessor::new(vec!["cat".to_string()], None).enabled(temp.path(), temp.path()));
    }

    #[test]
    fn test_commands_pipe_into_each_other() {
        let temp = TempDir::new().unwrap();
        let processor = PluginProcessor::new(
            vec!["sed s/v1/v2/".to_string(), "tr a-z A-Z".to_string()],
            None,
        );

        let out = processor
            .generate(Some("image: app:v1\n".to_string()), temp.path(), temp.path())
            .unwrap();

        assert_eq!(out, "IMAGE: APP:V2\n");
    }

    #[test]
    fn test_first_plugin_gets_empty_stdin_without_prior_output() {
        let temp = TempDir::new().unwrap();
        let processor = PluginProcessor::new(vec!["wc -c | tr -d ' '".to_string()], None);

        let out = processor.generate(None, temp.path(), temp.path()).unwrap();

        assert_eq!(out.trim(), "0");
    }

    #[test]
    fn test_plugin_sees_package_location() {
        let base = TempDir::new().unwrap();
        let package = base.path().join("app");
        std::fs::create_dir_all(&package).unwrap();
        let processor = PluginProcessor::new(
            vec!["printf '%s|%s|%s' \"$BASE_DIR\" \"$PACKAGE_DIR\" \"$(pwd)\"".to_string()],
            None,
        );

        let out = processor.generate(None, base.path(), &package).unwrap();
        let parts: Vec<&str> = out.split('|').collect();

        assert_eq!(parts[0], base.path().to_string_lossy());
        assert_eq!(parts[1], package.to_string_lossy());
        assert!(parts[2].ends_with("/app"));
    }

    #[test]
    fn test_failing_plugin_is_an_error() {
        let temp = TempDir::new().unwrap();
        let processor = PluginProcessor::new(vec!["exit 1".to_string()], None);

        let err = processor.generate(None, temp.path(), temp.path()).unwrap_err();

        assert!(matches!(err, Error::CommandFailed { .. }));
    }
}
