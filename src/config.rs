//! Immutable run configuration.
//!
//! [`SiteConfig`] is built once from the parsed command line and handed by
//! reference to every stage of the pipeline. Building it is where the
//! feature lists are checked for matching lengths, so a bad invocation is
//! rejected before any file is created.

use crate::cli::Cli;
use crate::error::{Result, SiteBuilderError};
use camino::Utf8PathBuf;

/// A feature to include in the site, with its identifier and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRef {
    /// Path to the feature jar on disk.
    pub path: Utf8PathBuf,
    /// Feature identifier, e.g. `com.example.feature`.
    pub id: String,
    /// Feature version, e.g. `1.0.0.qualifier`.
    pub version: String,
}

impl FeatureRef {
    /// Return the base name of the feature file, if it has one.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

/// Site-level metadata written into the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMetadata {
    /// Display name of the site.
    pub name: String,
    /// URL of the site.
    pub url: String,
    /// Free-text description.
    pub description: String,
}

/// Everything a single site build needs, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Where the zip archive is written.
    pub output: Utf8PathBuf,
    /// Descriptor metadata.
    pub site: SiteMetadata,
    /// Runtime command used to launch the publisher.
    pub java: String,
    /// Path to the Eclipse launcher jar.
    pub eclipse_launcher: Utf8PathBuf,
    /// Features, in command-line order.
    pub features: Vec<FeatureRef>,
    /// Bundle files, in command-line order.
    pub bundles: Vec<Utf8PathBuf>,
    /// Suppress progress output.
    pub quiet: bool,
}

impl SiteConfig {
    /// Zip the three feature lists into [`FeatureRef`] triples.
    ///
    /// # Errors
    ///
    /// Returns [`SiteBuilderError::FeatureListMismatch`] if the lists differ
    /// in length.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use p2_site_builder::config::SiteConfig;
    ///
    /// let features = SiteConfig::pair_features(
    ///     &[Utf8PathBuf::from("dist/feature.jar")],
    ///     &["com.example".to_owned()],
    ///     &["1.0.0".to_owned()],
    /// )?;
    /// assert_eq!(features[0].file_name(), Some("feature.jar"));
    ///
    /// let mismatch = SiteConfig::pair_features(
    ///     &[Utf8PathBuf::from("a.jar"), Utf8PathBuf::from("b.jar")],
    ///     &["com.example".to_owned()],
    ///     &["1.0.0".to_owned(), "2.0.0".to_owned()],
    /// );
    /// assert!(mismatch.is_err());
    /// # Ok::<(), p2_site_builder::error::SiteBuilderError>(())
    /// ```
    pub fn pair_features(
        paths: &[Utf8PathBuf],
        ids: &[String],
        versions: &[String],
    ) -> Result<Vec<FeatureRef>> {
        if paths.len() != ids.len() || paths.len() != versions.len() {
            return Err(SiteBuilderError::FeatureListMismatch {
                features: paths.len(),
                ids: ids.len(),
                versions: versions.len(),
            });
        }

        Ok(paths
            .iter()
            .zip(ids)
            .zip(versions)
            .map(|((path, id), version)| FeatureRef {
                path: path.clone(),
                id: id.clone(),
                version: version.clone(),
            })
            .collect())
    }
}

impl TryFrom<&Cli> for SiteConfig {
    type Error = SiteBuilderError;

    fn try_from(cli: &Cli) -> Result<Self> {
        let features = Self::pair_features(&cli.feature, &cli.feature_id, &cli.feature_version)?;
        Ok(Self {
            output: cli.output.clone(),
            site: SiteMetadata {
                name: cli.name.clone(),
                url: cli.url.clone(),
                description: cli.description.clone(),
            },
            java: cli.java.clone(),
            eclipse_launcher: cli.eclipse_launcher.clone(),
            features,
            bundles: cli.bundle.clone(),
            quiet: cli.quiet,
        })
    }
}
