//! p2 metadata generation through the Eclipse publisher.
//!
//! The publisher is an opaque external program launched as
//! `<java> -jar <launcher> -application …FeaturesAndBundlesPublisher …`
//! against the staging directory, which it extends in place with
//! `content`/`artifacts` repository files. Exit status `0` means success;
//! any other status is reported back verbatim through
//! [`SiteBuilderError::PublisherFailed`].
//!
//! Process execution sits behind [`CommandExecutor`] so the invocation
//! contract can be exercised without a JVM.

use crate::error::{Result, SiteBuilderError};
use crate::output::{echo_bytes, write_stderr_line};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::Write;
use std::process::{Command, Output};
use walkdir::WalkDir;

/// Eclipse application that publishes features and bundles into a p2 repository.
pub const PUBLISHER_APPLICATION: &str =
    "org.eclipse.equinox.p2.publisher.FeaturesAndBundlesPublisher";

/// Extension of the diagnostic logs the publisher leaves in its configuration area.
pub const LOG_EXTENSION: &str = "log";

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    // mockall cannot mock an elided lifetime inside a slice element.
    fn run<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<Output>;
}

/// Executes commands on the host system.
///
/// # Examples
///
/// ```no_run
/// use p2_site_builder::publisher::{CommandExecutor, SystemCommandExecutor};
///
/// let executor = SystemCommandExecutor;
/// let output = executor.run("java", &["-version"])?;
/// assert!(output.status.success());
/// # Ok::<(), p2_site_builder::error::SiteBuilderError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<Output> {
        Command::new(cmd)
            .args(args)
            .output()
            .map_err(SiteBuilderError::from)
    }
}

/// Arguments for one publisher run.
#[derive(Debug, Clone, Copy)]
pub struct PublisherInvocation<'a> {
    /// Path to the Eclipse launcher jar.
    pub launcher: &'a Utf8Path,
    /// Site directory used as source and as metadata/artifact repository.
    pub staging_dir: &'a Utf8Path,
    /// Scratch directory for the publisher's OSGi configuration area.
    pub configuration_dir: &'a Utf8Path,
}

impl PublisherInvocation<'_> {
    /// Render the argument list passed to the runtime.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use p2_site_builder::publisher::PublisherInvocation;
    ///
    /// let invocation = PublisherInvocation {
    ///     launcher: Utf8Path::new("launcher.jar"),
    ///     staging_dir: Utf8Path::new("/tmp/site"),
    ///     configuration_dir: Utf8Path::new("/tmp/config"),
    /// };
    /// let args = invocation.args();
    /// assert_eq!(&args[..2], ["-jar", "launcher.jar"]);
    /// assert!(args.contains(&"file:/tmp/site".to_owned()));
    /// ```
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let repository = file_uri(self.staging_dir);
        vec![
            "-jar".to_owned(),
            self.launcher.to_string(),
            "-application".to_owned(),
            PUBLISHER_APPLICATION.to_owned(),
            "-metadataRepository".to_owned(),
            repository.clone(),
            "-artifactRepository".to_owned(),
            repository,
            "-configuration".to_owned(),
            self.configuration_dir.to_string(),
            "-source".to_owned(),
            self.staging_dir.to_string(),
            "-compress".to_owned(),
            "-publishArtifacts".to_owned(),
        ]
    }
}

/// Format `path` as a `file:` URI.
///
/// Absolute Unix paths map to `file:/…`; other paths (for instance Windows
/// drive paths) get a leading slash and forward separators.
#[must_use]
pub fn file_uri(path: &Utf8Path) -> String {
    let normalized = path.as_str().replace('\\', "/");
    if normalized.starts_with('/') {
        format!("file:{normalized}")
    } else {
        format!("file:/{normalized}")
    }
}

/// A log file found in the publisher's configuration area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLog {
    /// Full path of the log file.
    pub path: Utf8PathBuf,
    /// Contents, with invalid UTF-8 replaced.
    pub contents: String,
}

impl DiagnosticLog {
    /// Return the log's file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.path.as_str())
    }
}

/// Collect every `*.log` file under `dir`, in sorted walk order.
///
/// # Errors
///
/// Returns an error if the directory cannot be walked or a log cannot be read.
pub fn collect_diagnostic_logs(dir: &Utf8Path) -> Result<Vec<DiagnosticLog>> {
    let mut logs = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(path) = Utf8PathBuf::try_from(entry.into_path()) else {
            continue;
        };
        if path.extension() != Some(LOG_EXTENSION) {
            continue;
        }
        let contents = String::from_utf8_lossy(&fs::read(&path)?).into_owned();
        logs.push(DiagnosticLog { path, contents });
    }
    Ok(logs)
}

/// Runs the publisher against a staged site.
pub struct Publisher<'a> {
    executor: &'a dyn CommandExecutor,
    java: &'a str,
    launcher: &'a Utf8Path,
}

impl<'a> Publisher<'a> {
    /// Create a publisher that launches `launcher` with the `java` runtime.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, java: &'a str, launcher: &'a Utf8Path) -> Self {
        Self {
            executor,
            java,
            launcher,
        }
    }

    /// Generate p2 metadata for `staging_dir` in place.
    ///
    /// A fresh scratch directory is created for the publisher's
    /// configuration area and removed afterwards. The publisher's captured
    /// standard error is always echoed to `stderr`. When the publisher
    /// fails, its captured standard output is echoed to `stdout` and any
    /// `*.log` files from the configuration area follow on `stderr`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteBuilderError::PublisherFailed`] with the process exit
    /// code (`1` if the process was killed by a signal), or an I/O error if
    /// the process could not be launched.
    pub fn publish(
        &self,
        staging_dir: &Utf8Path,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        let scratch = tempfile::Builder::new()
            .prefix("p2-publisher-config-")
            .tempdir()?;
        let configuration_dir = Utf8PathBuf::try_from(scratch.path().to_path_buf())
            .map_err(|e| SiteBuilderError::NonUtf8Path {
                path: e.into_path_buf(),
            })?;

        let invocation = PublisherInvocation {
            launcher: self.launcher,
            staging_dir,
            configuration_dir: &configuration_dir,
        };
        let args = invocation.args();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        log::debug!("running {} {}", self.java, args.join(" "));
        let output = self.executor.run(self.java, &arg_refs)?;

        // Captured stderr is always forwarded; stdout only on failure.
        echo_bytes(stderr, &output.stderr);

        if output.status.success() {
            scratch.close()?;
            return Ok(());
        }

        let code = output.status.code().unwrap_or(1);
        log::warn!("publisher exited with {}", output.status);
        echo_bytes(stdout, &output.stdout);
        report_diagnostic_logs(&configuration_dir, stderr);

        Err(SiteBuilderError::PublisherFailed { code })
    }
}

/// Echo the publisher's log files to `stderr`.
///
/// A failure to read them is reported as a warning and never replaces the
/// publisher's own exit status.
fn report_diagnostic_logs(configuration_dir: &Utf8Path, stderr: &mut dyn Write) {
    match collect_diagnostic_logs(configuration_dir) {
        Ok(logs) => {
            for diagnostic in logs {
                write_stderr_line(
                    stderr,
                    format!("Log {}: {}", diagnostic.file_name(), diagnostic.contents),
                );
            }
        }
        Err(err) => {
            log::warn!("could not collect publisher logs from {configuration_dir}: {err}");
            write_stderr_line(stderr, format!("warning: could not read publisher logs: {err}"));
        }
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
