//! Property-based tests for package discovery.
//!
//! Random directory trees are materialised on disk and discovered; the
//! ownership invariants must hold for every tree.

#[cfg(test)]
mod proptest_tests {
    use crate::discovery::discover;
    use proptest::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A file somewhere in the tree: directory components plus whether it is
    /// a YAML file.
    fn file_entry() -> impl Strategy<Value = (Vec<String>, bool)> {
        (prop::collection::vec("[a-c]", 0..4), any::<bool>())
    }

    fn build_tree(entries: &[(Vec<String>, bool)]) -> (TempDir, Vec<PathBuf>) {
        let temp = TempDir::new().unwrap();
        let mut yaml_files = Vec::new();
        for (components, is_yaml) in entries {
            let dir = components
                .iter()
                .fold(temp.path().to_path_buf(), |dir, c| dir.join(c));
            fs::create_dir_all(&dir).unwrap();
            let file = dir.join(if *is_yaml { "m.yaml" } else { "notes.txt" });
            fs::write(&file, "x: 1\n").unwrap();
            if *is_yaml {
                yaml_files.push(file);
            }
        }
        (temp, yaml_files)
    }

    fn owners<'a>(file: &Path, packages: &'a [PathBuf]) -> Vec<&'a PathBuf> {
        packages.iter().filter(|p| file.starts_with(p)).collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: no package is nested inside another
        #[test]
        fn packages_are_never_nested(entries in prop::collection::vec(file_entry(), 1..10)) {
            let (temp, _) = build_tree(&entries);
            let dirs = discover(temp.path()).unwrap();
            let packages = dirs.packages();

            for a in packages {
                for b in packages {
                    if a != b {
                        prop_assert!(
                            !b.starts_with(a),
                            "{} is nested in {}",
                            b.display(),
                            a.display()
                        );
                    }
                }
            }
        }

        /// Property: every YAML file belongs to exactly one package
        #[test]
        fn every_yaml_file_has_one_owner(entries in prop::collection::vec(file_entry(), 1..10)) {
            let (temp, yaml_files) = build_tree(&entries);
            let dirs = discover(temp.path()).unwrap();

            for file in &yaml_files {
                prop_assert_eq!(owners(file, dirs.packages()).len(), 1, "{}", file.display());
            }
        }

        /// Property: every package directly contains a YAML file
        #[test]
        fn packages_hold_yaml(entries in prop::collection::vec(file_entry(), 1..10)) {
            let (temp, yaml_files) = build_tree(&entries);
            let dirs = discover(temp.path()).unwrap();

            for package in dirs.packages() {
                prop_assert!(yaml_files
                    .iter()
                    .any(|f| f.parent() == Some(package.as_path())));
            }
        }

        /// Property: discovery is deterministic
        #[test]
        fn discovery_is_deterministic(entries in prop::collection::vec(file_entry(), 1..10)) {
            let (temp, _) = build_tree(&entries);
            let first = discover(temp.path()).unwrap();
            let second = discover(temp.path()).unwrap();
            prop_assert_eq!(first.packages(), second.packages());
        }
    }
}
