//! Deterministic zip packaging of the finished site.
//!
//! Every file under the staging directory becomes one Deflate-compressed
//! entry named by its `/`-separated path relative to the staging root.
//! Entries are written in lexicographic order of those names and stamped
//! with a fixed timestamp and permission, so identical inputs always yield a
//! byte-identical archive whatever the filesystem metadata or build time.

use crate::error::{Result, SiteBuilderError};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Unix permission stamped on every archive entry.
pub const ENTRY_PERMISSIONS: u32 = 0o644;

/// A file to be written into the archive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArchiveEntry {
    /// Entry name inside the archive, `/`-separated.
    pub name: String,
    /// Location of the file on disk.
    pub source: Utf8PathBuf,
}

/// List every file under `root` as an [`ArchiveEntry`], sorted by name.
///
/// Directories are not listed; only the files beneath them.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked or contains a path that is
/// not valid UTF-8.
pub fn collect_entries(root: &Utf8Path) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let source = Utf8PathBuf::try_from(entry.into_path()).map_err(|e| {
            SiteBuilderError::NonUtf8Path {
                path: e.into_path_buf(),
            }
        })?;
        let name = entry_name(root, &source)?;
        entries.push(ArchiveEntry { name, source });
    }
    entries.sort();
    Ok(entries)
}

fn entry_name(root: &Utf8Path, source: &Utf8Path) -> Result<String> {
    let relative = source
        .strip_prefix(root)
        .map_err(|_| SiteBuilderError::StagingFailed {
            reason: format!("{source} is outside {root}"),
        })?;
    Ok(relative
        .components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Options shared by every entry.
///
/// `DateTime::default()` is the DOS epoch, 1980-01-01 00:00:00.
fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(ENTRY_PERMISSIONS)
}

/// Zip every file under `root` into a new archive at `output`.
///
/// Returns the number of entries written.
///
/// # Errors
///
/// Returns an error if the tree cannot be read or the archive cannot be
/// written. A partially written archive is removed.
pub fn create_archive(root: &Utf8Path, output: &Utf8Path) -> Result<usize> {
    let entries = collect_entries(root)?;
    write_archive(&entries, output)?;

    log::debug!("wrote {} entries to {output}", entries.len());
    Ok(entries.len())
}

/// Write `entries` to `output`, removing the file again if writing fails.
fn write_archive(entries: &[ArchiveEntry], output: &Utf8Path) -> Result<()> {
    let written = write_entries(fs::File::create(output)?, entries);
    if written.is_err() {
        if let Err(err) = fs::remove_file(output) {
            log::warn!("failed to remove partial archive {output}: {err}");
        }
    }
    written
}

fn write_entries(file: fs::File, entries: &[ArchiveEntry]) -> Result<()> {
    let options = entry_options();
    let mut archive = ZipWriter::new(file);
    for entry in entries {
        archive.start_file(entry.name.as_str(), options)?;
        let mut source = fs::File::open(&entry.source)?;
        io::copy(&mut source, &mut archive)?;
        log::trace!("archived {}", entry.name);
    }
    archive.finish()?;
    Ok(())
}

#[cfg(test)]
#[path = "packaging_tests.rs"]
mod tests;
