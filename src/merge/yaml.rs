//! YAML merge operations
//!
//! Deep-merges an overlay document into a package's input file before it is
//! rendered: extra Helm values into `values.yaml`, or extra fields into a
//! `kustomization.yaml`. Only files inside the working copy are touched.
//!
//! ## Rules
//!
//! - Mappings merge recursively; the overlay wins on conflicting keys
//! - Sequences in the overlay replace the target's sequence
//! - Type mismatches replace the target value (with a warning)
//!
//! ## Example
//!
//! ```
//! use manifest_render::merge::yaml::merge_yaml_values;
//! use serde_yaml::Value;
//!
//! let mut values: Value = serde_yaml::from_str("image:\n  tag: v1\nreplicas: 1\n").unwrap();
//! let overlay: Value = serde_yaml::from_str("image:\n  tag: v2\n").unwrap();
//! merge_yaml_values(&mut values, &overlay, "");
//!
//! assert_eq!(values["image"]["tag"], Value::from("v2"));
//! assert_eq!(values["replicas"], Value::from(1));
//! ```

use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result};

/// Recursively merge `source` into `target`.
///
/// `path` is the dotted location of `target` within the document and is only
/// used for log messages; pass `""` at the root.
pub fn merge_yaml_values(target: &mut YamlValue, source: &YamlValue, path: &str) {
    match (target, source) {
        (YamlValue::Mapping(target_map), YamlValue::Mapping(source_map)) => {
            for (key, value) in source_map {
                let key_str = match key {
                    YamlValue::String(s) => s.clone(),
                    _ => format!("{:?}", key),
                };
                let new_path = if path.is_empty() {
                    key_str
                } else {
                    format!("{}.{}", path, key_str)
                };

                match target_map.get_mut(key) {
                    Some(existing) if existing.is_mapping() && value.is_mapping() => {
                        merge_yaml_values(existing, value, &new_path);
                    }
                    Some(existing) => {
                        if get_yaml_type_name(existing) != get_yaml_type_name(value) {
                            warn!(
                                "Type mismatch at path '{}': replacing {} with {}",
                                new_path,
                                get_yaml_type_name(existing),
                                get_yaml_type_name(value)
                            );
                        } else {
                            debug!("Overwriting value at path '{}'", new_path);
                        }
                        *existing = value.clone();
                    }
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => {
            if !target.is_null() && get_yaml_type_name(target) != get_yaml_type_name(source) {
                warn!(
                    "Type mismatch at path '{}': replacing {} with {}",
                    if path.is_empty() { "<root>" } else { path },
                    get_yaml_type_name(target),
                    get_yaml_type_name(source)
                );
            }
            *target = source.clone();
        }
    }
}

/// Get a human-readable type name for a YAML value
pub fn get_yaml_type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "Null",
        YamlValue::Bool(_) => "Bool",
        YamlValue::Number(_) => "Number",
        YamlValue::String(_) => "String",
        YamlValue::Sequence(_) => "Sequence",
        YamlValue::Mapping(_) => "Mapping",
        YamlValue::Tagged(_) => "Tagged",
    }
}

/// Merge the YAML text `overlay` into the file at `file`.
///
/// A missing or empty file is treated as an empty mapping and created. The
/// result is written back with a trailing newline. A symbolic link at `file`
/// is replaced by a regular file; whatever it pointed at is left untouched.
///
/// # Errors
///
/// Returns `Error::Merge` if the overlay or the existing file is not valid
/// YAML, and `Error::Io` if the file cannot be read or written.
pub fn merge_into_file(file: &Path, overlay: &str) -> Result<()> {
    let operation = format!("merge into {}", file.display());

    let overlay_value: YamlValue = serde_yaml::from_str(overlay).map_err(|err| Error::Merge {
        operation: operation.clone(),
        message: format!("Failed to parse overlay YAML: {}", err),
    })?;

    let existing = match fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let mut target: YamlValue = if existing.trim().is_empty() {
        YamlValue::Mapping(Default::default())
    } else {
        serde_yaml::from_str(&existing).map_err(|err| Error::Merge {
            operation: operation.clone(),
            message: format!("Failed to parse target YAML: {}", err),
        })?
    };

    merge_yaml_values(&mut target, &overlay_value, "");

    let serialized = serde_yaml::to_string(&target).map_err(|err| Error::Merge {
        operation,
        message: format!("Failed to serialize YAML: {}", err),
    })?;

    let is_link = fs::symlink_metadata(file)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    if is_link {
        debug!("Replacing symbolic link {} before merge", file.display());
        fs::remove_file(file)?;
    }

    fs::write(file, ensure_trailing_newline(serialized))?;
    Ok(())
}

fn ensure_trailing_newline(mut content: String) -> String {
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}
