//! Site build orchestration.
//!
//! A build walks through a fixed sequence of states:
//!
//! ```text
//! Init -> DescriptorWritten -> ArtifactsStaged -> MetadataPublished -> Archived -> CleanedUp
//!                                             \-> Failed (publisher exited non-zero)
//! ```
//!
//! The staging directory is a [`tempfile::TempDir`] owned by the run, so it
//! is removed when the build finishes, when the publisher fails, and when
//! any other step returns an error.

use crate::config::SiteConfig;
use crate::descriptor::{SiteDescriptor, write_site_xml};
use crate::error::{Result, SiteBuilderError};
use crate::output::write_stderr_line;
use crate::packaging::create_archive;
use crate::publisher::{CommandExecutor, Publisher};
use crate::stager::Stager;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use tempfile::TempDir;

/// Progress of a site build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Configuration validated, nothing written yet.
    Init,
    /// `site.xml` written into the staging directory.
    DescriptorWritten,
    /// Features and bundles copied into the staging layout.
    ArtifactsStaged,
    /// The publisher added p2 metadata to the staging directory.
    MetadataPublished,
    /// The output archive was written.
    Archived,
    /// The staging directory was removed.
    CleanedUp,
    /// The publisher failed; the staging directory was removed.
    Failed,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Path of the written archive.
    pub output: Utf8PathBuf,
    /// Number of entries in the archive.
    pub entries: usize,
    /// Final pipeline state.
    pub state: PipelineState,
}

/// A uniquely named staging directory, removed on drop.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
    path: Utf8PathBuf,
}

impl StagingDir {
    /// Create a fresh staging directory under the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its path is
    /// not valid UTF-8.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("p2-site-").tempdir()?;
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).map_err(|e| {
            SiteBuilderError::NonUtf8Path {
                path: e.into_path_buf(),
            }
        })?;
        Ok(Self { dir, path })
    }

    /// Return the staging directory path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Remove the staging directory, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}

struct Run<'a> {
    state: PipelineState,
    stderr: &'a mut dyn Write,
    quiet: bool,
}

impl Run<'_> {
    fn advance(&mut self, next: PipelineState) {
        log::debug!("site build: {:?} -> {next:?}", self.state);
        self.state = next;
    }

    fn progress(&mut self, message: impl std::fmt::Display) {
        if !self.quiet {
            write_stderr_line(&mut *self.stderr, message);
        }
    }
}

/// Build the update site described by `config` and write its archive.
///
/// Captured publisher output is echoed to `stdout`/`stderr` only when the
/// publisher fails; progress lines go to `stderr` unless `config.quiet`.
///
/// # Errors
///
/// Returns [`SiteBuilderError::PublisherFailed`] if the publisher exits
/// non-zero, or the first descriptor, staging, I/O or archive error. A
/// cleanup failure after the publisher fails is only reported as a warning.
pub fn build_site(
    config: &SiteConfig,
    executor: &dyn CommandExecutor,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<BuildReport> {
    let descriptor = SiteDescriptor::from_config(config)?;
    let staging = StagingDir::create()?;
    let mut run = Run {
        state: PipelineState::Init,
        stderr,
        quiet: config.quiet,
    };

    run.progress(format!("Writing site descriptor to {}...", staging.path()));
    write_site_xml(staging.path(), &descriptor)?;
    run.advance(PipelineState::DescriptorWritten);

    run.progress(format!(
        "Staging {} feature(s) and {} bundle(s)...",
        config.features.len(),
        config.bundles.len()
    ));
    Stager::new(staging.path()).stage_all(config)?;
    run.advance(PipelineState::ArtifactsStaged);

    run.progress("Generating p2 metadata...");
    let publisher = Publisher::new(executor, &config.java, &config.eclipse_launcher);
    if let Err(err) = publisher.publish(staging.path(), stdout, &mut *run.stderr) {
        run.advance(PipelineState::Failed);
        if let Err(cleanup) = staging.close() {
            log::warn!("failed to remove staging directory: {cleanup}");
            write_stderr_line(
                &mut *run.stderr,
                format!("warning: could not remove staging directory: {cleanup}"),
            );
        }
        return Err(err);
    }
    run.advance(PipelineState::MetadataPublished);

    run.progress(format!("Packaging {}...", config.output));
    let entries = create_archive(staging.path(), &config.output)?;
    run.advance(PipelineState::Archived);

    staging.close()?;
    run.advance(PipelineState::CleanedUp);

    Ok(BuildReport {
        output: config.output.clone(),
        entries,
        state: run.state,
    })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
