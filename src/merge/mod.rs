//! Merging of input files inside the working copy.
//!
//! Processors use this to layer controller-supplied overrides onto a
//! package's own configuration before invoking the renderer.

pub mod yaml;
