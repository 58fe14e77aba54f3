//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `manifest-render` plugin. It uses the `thiserror` library to create a
//! single `Error` enum that covers every anticipated failure mode, with clear
//! and descriptive messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors. Each
//!   variant corresponds to one kind of failure and carries the context needed
//!   to diagnose it (the command that ran, the path involved, stderr output).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library.
//!
//! The variants fall into four groups, matching the stages of a run:
//!
//! - Usage errors: malformed command-line invocation.
//! - Isolation errors: git restore/clean failures, copy failures and
//!   temporary directory failures while preparing the working copy.
//! - Discovery errors: directory walk failures.
//! - Processing errors: a pre-processor or processor failing for a package,
//!   including external command failures and timeouts.
//!
//! Nothing in the library recovers from an error. Every failure propagates up
//! to `Collection::render` and from there to the binary, which reports it and
//! exits non-zero.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for manifest-render operations
#[derive(Error, Debug)]
pub enum Error {
    /// The command line was malformed.
    #[error("{message}")]
    Usage { message: String },

    /// A git command run against the working copy failed.
    #[error("Git command failed in {}: {command} - {stderr}", path.display())]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// The source tree could not be copied into the ephemeral working copy.
    #[error("Copy error {} -> {}: {message}", src.display(), dst.display())]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        message: String,
    },

    /// An external command could not be spawned or its pipes failed.
    #[error("Command error: {command} - {message}")]
    Command { command: String, message: String },

    /// An external command ran but exited unsuccessfully.
    #[error("Command failed: {command} ({status}){}", if stderr.is_empty() { String::new() } else { format!(" - {}", stderr) })]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// An external command did not finish within the configured timeout.
    #[error("Command timed out after {timeout_secs}s: {command}")]
    CommandTimeout { command: String, timeout_secs: u64 },

    /// A processor rejected its input or the package layout.
    #[error("Processor error: {processor} - {message}")]
    Processor { processor: String, message: String },

    /// Rendering a package failed. Wraps the underlying cause.
    #[error("Failed to render package {}: {source}", path.display())]
    Package {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// A YAML merge into an input file failed.
    #[error("Merge operation error: {operation} - {message}")]
    Merge { operation: String, message: String },

    /// A directory walk failed, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps this error with the package it was raised for.
    pub fn in_package(self, path: impl Into<PathBuf>) -> Self {
        Error::Package {
            path: path.into(),
            source: Box::new(self),
        }
    }
}
