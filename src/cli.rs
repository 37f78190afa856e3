//! CLI argument definitions for the p2 site builder.
//!
//! The flags are parsed once in `main` and immediately converted into a
//! [`crate::config::SiteConfig`]; nothing else in the crate reads them.

use camino::Utf8PathBuf;
use clap::Parser;

/// Build a zipped Eclipse p2 update site from features and plugins.
#[derive(Parser, Debug, Clone)]
#[command(name = "p2-site-builder")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build a zipped Eclipse p2 update site from features and plugins.\n\n",
    "The builder writes a site.xml descriptor, copies features and bundles into ",
    "a fresh staging directory, runs the Eclipse FeaturesAndBundlesPublisher to ",
    "generate p2 metadata, and zips the result with fixed timestamps so that ",
    "identical inputs always yield a byte-identical archive.\n\n",
    "Each --feature must be matched by one --feature-id and one --feature-version, ",
    "in the same order.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Build a site with one feature and two bundles:\n",
    "    $ p2-site-builder --output site.zip --name \"My site\" \\\n",
    "        --url https://example.com/updates --description \"Nightly builds\" \\\n",
    "        --eclipse-launcher plugins/org.eclipse.equinox.launcher.jar \\\n",
    "        --feature feature.jar --feature-id com.example.feature \\\n",
    "        --feature-version 1.0.0 --bundle a.jar --bundle b.jar\n\n",
    "  Check the flags and preview site.xml without running the publisher:\n",
    "    $ p2-site-builder ... --dry-run",
))]
pub struct Cli {
    /// Path of the zip archive to create.
    #[arg(long, value_name = "FILE")]
    pub output: Utf8PathBuf,

    /// Site name (short description).
    #[arg(long)]
    pub name: String,

    /// URL of the site.
    #[arg(long)]
    pub url: String,

    /// Free-text description of the site.
    #[arg(long)]
    pub description: String,

    /// Java runtime used to launch the publisher.
    #[arg(long, value_name = "PATH", default_value = "java")]
    pub java: String,

    /// Path to the Eclipse launcher jar.
    #[arg(long, value_name = "JAR", alias = "eclipse_launcher")]
    pub eclipse_launcher: Utf8PathBuf,

    /// Feature file to include (repeatable, pairs with --feature-id and --feature-version).
    #[arg(long, value_name = "FILE")]
    pub feature: Vec<Utf8PathBuf>,

    /// Feature identifier (repeatable, pairs with --feature).
    #[arg(long, value_name = "ID", alias = "feature_id")]
    pub feature_id: Vec<String>,

    /// Feature version (repeatable, pairs with --feature).
    #[arg(long, value_name = "VERSION", alias = "feature_version")]
    pub feature_version: Vec<String>,

    /// Bundle file to include (repeatable).
    #[arg(long, value_name = "FILE")]
    pub bundle: Vec<Utf8PathBuf>,

    /// Suppress progress output (errors and publisher diagnostics still shown).
    #[arg(short, long)]
    pub quiet: bool,

    /// Validate the flags and print the planned site without building it.
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
