//! Best-effort writers for user-facing output.
//!
//! Progress lines and publisher diagnostics go to injected writers so that
//! the pipeline can be driven from tests with in-memory buffers.

use std::fmt::Display;
use std::io::Write;

/// Write `message` followed by a newline, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Copy captured process output to `sink` verbatim, ignoring write failures.
pub fn echo_bytes(sink: &mut dyn Write, bytes: &[u8]) {
    if sink.write_all(bytes).and_then(|()| sink.flush()).is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Format the final success message.
#[must_use]
pub fn success_message(entries: usize, output: impl Display) -> String {
    let plural = if entries == 1 { "entry" } else { "entries" };
    format!("Wrote update site with {entries} {plural} to {output}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn write_stderr_line_appends_newline() {
        let mut buffer = Vec::new();
        write_stderr_line(&mut buffer, "Staging artifacts...");
        assert_eq!(buffer, b"Staging artifacts...\n");
    }

    #[test]
    fn echo_bytes_copies_verbatim() {
        let mut buffer = Vec::new();
        echo_bytes(&mut buffer, b"no newline \xff");
        assert_eq!(buffer, b"no newline \xff");
    }

    #[rstest]
    #[case(1, "1 entry ")]
    #[case(4, "4 entries ")]
    fn success_message_pluralizes(#[case] count: usize, #[case] expected: &str) {
        let msg = success_message(count, "out/site.zip");
        assert!(msg.contains(expected));
        assert!(msg.ends_with("out/site.zip"));
    }
}
