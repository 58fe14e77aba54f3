//! # CLI Command Implementations
//!
//! Each command the `manifest-render` tool accepts lives in its own file and
//! exposes an `execute` function that calls into the `manifest_render`
//! library.

pub mod init;
pub mod render;
