//! p2 update site builder library.
//!
//! This crate assembles a zipped Eclipse p2 update site from feature and
//! bundle jars. It is used by the `p2-site-builder` binary and can be driven
//! programmatically, for instance with a stub publisher in tests.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Validated, immutable run configuration
//! - [`descriptor`] - `site.xml` generation
//! - [`error`] - Error type and exit-code mapping
//! - [`output`] - Best-effort user-facing output helpers
//! - [`packaging`] - Deterministic zip packaging
//! - [`pipeline`] - Build orchestration and staging directory lifecycle
//! - [`publisher`] - External p2 publisher invocation
//! - [`stager`] - Copying features and bundles into the site layout

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod output;
pub mod packaging;
pub mod pipeline;
pub mod publisher;
pub mod stager;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
