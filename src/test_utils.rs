//! Shared test utilities for exercising the pipeline without a JVM.

use crate::error::{Result, SiteBuilderError};
use crate::publisher::CommandExecutor;
use camino::Utf8PathBuf;
use std::cell::RefCell;
use std::fs;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a command `Output` with the given exit code and stdout.
#[must_use]
pub fn output_with(code: i32, stdout: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

/// A command invocation observed by [`StubExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// The program that was launched.
    pub cmd: String,
    /// The arguments it received.
    pub args: Vec<String>,
}

impl RecordedCall {
    /// Return the argument following `flag`, if any.
    #[must_use]
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(String::as_str)
    }
}

/// A stand-in for the Eclipse publisher.
///
/// Records each invocation and behaves like the publisher would: it writes
/// the configured repository files into the `-source` directory and the
/// configured log files into the `-configuration` directory, then reports
/// the configured exit code.
#[derive(Debug, Default)]
pub struct StubExecutor {
    exit_code: i32,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    remove_dirs: bool,
    published: Vec<(String, Vec<u8>)>,
    logs: Vec<(String, String)>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl StubExecutor {
    /// A publisher that exits with status `0`.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// A publisher that exits with `code`.
    #[must_use]
    pub fn failing(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    /// Write `contents` to `relative` under the `-source` directory when run.
    #[must_use]
    pub fn with_published_file(mut self, relative: &str, contents: &[u8]) -> Self {
        self.published.push((relative.to_owned(), contents.to_vec()));
        self
    }

    /// Write a log file to `relative` under the `-configuration` directory when run.
    #[must_use]
    pub fn with_log(mut self, relative: &str, contents: &str) -> Self {
        self.logs.push((relative.to_owned(), contents.to_owned()));
        self
    }

    /// Report `stdout` as the captured standard output.
    #[must_use]
    pub fn with_stdout(mut self, stdout: &[u8]) -> Self {
        self.stdout = stdout.to_vec();
        self
    }

    /// Report `stderr` as the captured standard error.
    #[must_use]
    pub fn with_stderr(mut self, stderr: &[u8]) -> Self {
        self.stderr = stderr.to_vec();
        self
    }

    /// Delete the `-source` and `-configuration` directories before exiting.
    #[must_use]
    pub fn removing_dirs(mut self) -> Self {
        self.remove_dirs = true;
        self
    }

    /// Return every invocation seen so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

fn write_under(root: &str, relative: &str, contents: &[u8]) -> Result<()> {
    let path = Utf8PathBuf::from(root).join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

impl CommandExecutor for StubExecutor {
    fn run<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<Output> {
        let call = RecordedCall {
            cmd: cmd.to_owned(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
        };

        let source = call
            .value_of("-source")
            .ok_or_else(|| SiteBuilderError::StubMismatch {
                message: "publisher invoked without -source".to_owned(),
            })?;
        let configuration =
            call.value_of("-configuration")
                .ok_or_else(|| SiteBuilderError::StubMismatch {
                    message: "publisher invoked without -configuration".to_owned(),
                })?;

        for (relative, contents) in &self.published {
            write_under(source, relative, contents)?;
        }
        for (relative, contents) in &self.logs {
            write_under(configuration, relative, contents.as_bytes())?;
        }

        if self.remove_dirs {
            fs::remove_dir_all(configuration)?;
            fs::remove_dir_all(source)?;
        }

        let mut output = output_with(self.exit_code, &self.stdout);
        output.stderr.clone_from(&self.stderr);
        self.calls.borrow_mut().push(call);
        Ok(output)
    }
}
