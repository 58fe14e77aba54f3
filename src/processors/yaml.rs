//! Plain YAML packages.
//!
//! A package that is neither a Helm chart nor a Kustomize directory is
//! rendered by emitting its YAML files as they are, one document stream per
//! file, in the same files-first, name-sorted order discovery uses. Files in
//! subdirectories belong to the package and are included.

use std::fs;
use std::path::Path;

use crate::discovery::{is_skipped_dir, walk_sorted, Scanner};
use crate::error::Result;
use crate::processors::{append_output, is_helm_chart, is_kustomization, Processor};

pub struct YamlProcessor;

impl YamlProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YamlProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for YamlProcessor {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn enabled(&self, _base_dir: &Path, path: &Path) -> bool {
        !is_helm_chart(path) && !is_kustomization(path)
    }

    fn generate(&self, input: Option<String>, _base_dir: &Path, path: &Path) -> Result<String> {
        let scanner = Scanner::new()?;
        let mut output = String::new();

        let walker = walk_sorted(path)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && is_skipped_dir(e)));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() || !scanner.is_yaml_name(entry.file_name()) {
                continue;
            }
            let content = fs::read_to_string(entry.path())?;
            push_document(&mut output, &content);
        }

        Ok(append_output(input, output))
    }
}

/// Append one file's content as a YAML document stream.
fn push_document(output: &mut String, content: &str) {
    if !content.trim_start().starts_with("---") {
        output.push_str("---\n");
    }
    output.push_str(content);
    if !content.ends_with('\n') {
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_enabled_only_for_plain_directories() {
        let temp = TempDir::new().unwrap();
        let processor = YamlProcessor::new();
        fs::write(temp.path().join("app.yaml"), "a: 1\n").unwrap();
        assert!(processor.enabled(temp.path(), temp.path()));

        fs::write(temp.path().join("kustomization.yaml"), "resources: []\n").unwrap();
        assert!(!processor.enabled(temp.path(), temp.path()));
    }

    #[test]
    fn test_disabled_for_helm_chart() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Chart.yaml"), "name: x\n").unwrap();
        assert!(!YamlProcessor::new().enabled(temp.path(), temp.path()));
    }

    #[test]
    fn test_generate_concatenates_documents_in_order() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("extra")).unwrap();
        fs::write(temp.path().join("b.yaml"), "kind: Service").unwrap();
        fs::write(temp.path().join("a.yml"), "---\nkind: Deployment\n").unwrap();
        fs::write(temp.path().join("extra/c.yaml"), "kind: ConfigMap\n").unwrap();
        fs::write(temp.path().join("README.md"), "# ignored\n").unwrap();

        let out = YamlProcessor::new()
            .generate(None, temp.path(), temp.path())
            .unwrap();

        assert_eq!(
            out,
            "---\nkind: Deployment\n---\nkind: Service\n---\nkind: ConfigMap\n"
        );
    }

    #[test]
    fn test_generate_appends_to_prior_output() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.yaml"), "kind: Secret\n").unwrap();

        let out = YamlProcessor::new()
            .generate(Some("---\nkind: Namespace\n".to_string()), temp.path(), temp.path())
            .unwrap();

        assert_eq!(out, "---\nkind: Namespace\n---\nkind: Secret\n");
    }

    #[test]
    fn test_generate_skips_git_metadata() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join(".git/x.yaml"), "nope: true\n").unwrap();
        fs::write(temp.path().join("a.yaml"), "kind: Pod\n").unwrap();

        let out = YamlProcessor::new()
            .generate(None, temp.path(), temp.path())
            .unwrap();

        assert_eq!(out, "---\nkind: Pod\n");
    }
}
