//! Artifact staging.
//!
//! Copies feature and bundle files into the `features/` and `plugins/`
//! directories of a freshly created staging directory, naming each copy by
//! the source file's base name.

use crate::config::SiteConfig;
use crate::error::{Result, SiteBuilderError};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Staged directory holding feature jars.
pub const FEATURES_DIR: &str = "features";

/// Staged directory holding bundle jars.
pub const PLUGINS_DIR: &str = "plugins";

/// Handles staging of input artifacts into the site layout.
#[derive(Debug, Clone)]
pub struct Stager {
    staging_dir: Utf8PathBuf,
}

impl Stager {
    /// Create a stager rooted at `staging_dir`.
    #[must_use]
    pub fn new(staging_dir: &Utf8Path) -> Self {
        Self {
            staging_dir: staging_dir.to_owned(),
        }
    }

    /// Create the `features/` and `plugins/` directories.
    ///
    /// # Errors
    ///
    /// Returns [`SiteBuilderError::StagingFailed`] if either directory
    /// already exists or cannot be created.
    pub fn prepare(&self) -> Result<()> {
        for dir in [self.features_dir(), self.plugins_dir()] {
            fs::create_dir(&dir).map_err(|e| SiteBuilderError::StagingFailed {
                reason: format!("failed to create {dir}: {e}"),
            })?;
        }
        Ok(())
    }

    /// Copy a feature file into `features/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has no file name or the copy fails.
    pub fn stage_feature(&self, source: &Utf8Path) -> Result<Utf8PathBuf> {
        copy_into(source, &self.features_dir())
    }

    /// Copy a bundle file into `plugins/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has no file name or the copy fails.
    pub fn stage_bundle(&self, source: &Utf8Path) -> Result<Utf8PathBuf> {
        copy_into(source, &self.plugins_dir())
    }

    /// Prepare the layout and stage every feature and bundle in `config`.
    ///
    /// Inputs that share a base name overwrite each other; the last one
    /// given on the command line wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout cannot be created or any copy fails.
    pub fn stage_all(&self, config: &SiteConfig) -> Result<Vec<Utf8PathBuf>> {
        self.prepare()?;
        let features = config
            .features
            .iter()
            .map(|feature| self.stage_feature(&feature.path));
        let bundles = config.bundles.iter().map(|bundle| self.stage_bundle(bundle));
        features.chain(bundles).collect()
    }

    /// Return the `features/` directory path.
    #[must_use]
    pub fn features_dir(&self) -> Utf8PathBuf {
        self.staging_dir.join(FEATURES_DIR)
    }

    /// Return the `plugins/` directory path.
    #[must_use]
    pub fn plugins_dir(&self) -> Utf8PathBuf {
        self.staging_dir.join(PLUGINS_DIR)
    }
}

fn copy_into(source: &Utf8Path, dest_dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| SiteBuilderError::MissingFileName {
            path: source.to_owned(),
        })?;
    let dest_path = dest_dir.join(file_name);

    if dest_path.exists() {
        log::debug!("{dest_path} already staged; overwriting with {source}");
    }

    fs::copy(source, &dest_path).map_err(|e| SiteBuilderError::StagingFailed {
        reason: format!("failed to copy {source} to {dest_path}: {e}"),
    })?;
    log::trace!("staged {source} -> {dest_path}");

    Ok(dest_path)
}
