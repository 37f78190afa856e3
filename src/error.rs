//! Error types for the p2 site builder.
//!
//! Configuration problems are detected before any file is touched; the
//! publisher failure variant carries the subprocess exit code so the binary
//! can hand it back to its own caller unchanged.

use camino::Utf8PathBuf;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while assembling an update site.
#[derive(Debug, Error)]
pub enum SiteBuilderError {
    /// The `--feature`, `--feature-id` and `--feature-version` lists differ in length.
    #[error(
        "should provide the same number of --feature ({features}), --feature-id ({ids}) \
         and --feature-version ({versions})"
    )]
    FeatureListMismatch {
        /// Number of feature files supplied.
        features: usize,
        /// Number of feature identifiers supplied.
        ids: usize,
        /// Number of feature versions supplied.
        versions: usize,
    },

    /// Copying inputs into the staging layout failed.
    #[error("staging failed: {reason}")]
    StagingFailed {
        /// Description of the staging failure.
        reason: String,
    },

    /// The site descriptor could not be serialized.
    #[error("failed to write site descriptor: {reason}")]
    Descriptor {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The external publisher exited unsuccessfully.
    #[error("p2 publisher exited with status {code}")]
    PublisherFailed {
        /// Exit code reported by the publisher process.
        code: i32,
    },

    /// A temporary directory was allocated at a path that is not valid UTF-8.
    #[error("temporary path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// An input file given on the command line has no file name component.
    #[error("input path has no file name: {path}")]
    MissingFileName {
        /// The offending input path.
        path: Utf8PathBuf,
    },

    /// Writing the zip archive failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Walking a directory tree failed.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl SiteBuilderError {
    /// Return the process exit code this error should terminate the run with.
    ///
    /// A failing publisher hands its own status back verbatim; every other
    /// error maps to `1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use p2_site_builder::error::SiteBuilderError;
    ///
    /// assert_eq!(SiteBuilderError::PublisherFailed { code: 3 }.exit_code(), 3);
    /// let err = SiteBuilderError::StagingFailed { reason: "disk full".to_owned() };
    /// assert_eq!(err.exit_code(), 1);
    /// ```
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::PublisherFailed { code } => *code,
            _ => 1,
        }
    }
}

/// Result type alias using [`SiteBuilderError`].
pub type Result<T> = std::result::Result<T, SiteBuilderError>;
