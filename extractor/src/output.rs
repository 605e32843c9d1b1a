//! Console output for the extractor CLI.
//!
//! Progress lines, the final run summary (human or JSON), and the dry-run
//! report all live here so the pipeline only decides *when* to speak.

use crate::config::{ArchiverKind, ExtractConfig, Layout};
use crate::manifest::{AuxCopyReport, AuxFile, Placement};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

/// Write a line, ignoring failures.
///
/// Progress output is best-effort; a closed pipe must not abort a run that is
/// otherwise succeeding.
pub fn write_line(out: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Final line of every successful run.
#[must_use]
pub fn used_time_line(elapsed_ms: u64) -> String {
    format!("Used time: {elapsed_ms}ms")
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Path of the packaged archive.
    pub archive_path: Utf8PathBuf,
    /// Class files placed in the archive.
    pub class_files: usize,
    /// Auxiliary files copied, per placement.
    pub aux_files: AuxCopyReport,
    /// Pre-built archives copied into the output directory.
    pub prebuilt_archives: usize,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Multi-line human-readable summary.
    #[must_use]
    pub fn display_text(&self) -> String {
        [
            format!("Archive: {}", self.archive_path),
            format!("  class files: {}", self.class_files),
            format!("  staged auxiliary files: {}", self.aux_files.staged),
            format!(
                "Auxiliary files written to the working directory: {}",
                self.aux_files.working_dir
            ),
            format!("Pre-built archives copied: {}", self.prebuilt_archives),
        ]
        .join("\n")
    }

    /// Pretty-printed JSON summary.
    ///
    /// # Errors
    ///
    /// Returns a serialisation error; none is expected for this type.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Configuration information for dry-run output.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use pz_extract::config::ExtractConfig;
/// use pz_extract::output::DryRunInfo;
///
/// let mut config = ExtractConfig::new(Utf8PathBuf::from("/work"));
/// config.source_root = Utf8PathBuf::from("/games/ProjectZomboid");
/// let info = DryRunInfo::new(&config);
///
/// let text = info.display_text();
/// assert!(text.contains("Dry run"));
/// assert!(text.contains("/work/lib/b42.jar"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Game installation directory.
    pub source_root: &'a Utf8Path,
    /// Directory relative outputs resolve against.
    pub working_dir: &'a Utf8Path,
    /// Derived output paths.
    pub layout: Layout,
    /// Archive backend.
    pub archiver: ArchiverKind,
    /// External archiver timeout, if any.
    pub archiver_timeout: Option<Duration>,
    /// Auxiliary manifest.
    pub aux_files: &'a [AuxFile],
}

impl<'a> DryRunInfo<'a> {
    /// Collect dry-run details from a configuration.
    #[must_use]
    pub fn new(config: &'a ExtractConfig) -> Self {
        Self {
            source_root: &config.source_root,
            working_dir: &config.working_dir,
            layout: config.layout(),
            archiver: config.archiver,
            archiver_timeout: config.archiver_timeout,
            aux_files: &config.aux_files,
        }
    }

    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let timeout = self
            .archiver_timeout
            .map_or_else(|| "none".to_owned(), |t| format!("{}s", t.as_secs()));
        let mut lines = vec![
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Source root: {}", self.source_root),
            format!("Working directory: {}", self.working_dir),
            format!("Destination root (recreated): {}", self.layout.destination_root),
            format!("Staging directory: {}", self.layout.staging_dir),
            format!("Archive: {}", self.layout.archive_path),
            format!("Archiver: {}", self.archiver.flag_name()),
            format!("Archiver timeout: {timeout}"),
            String::new(),
            "Auxiliary files:".to_owned(),
        ];
        for entry in self.aux_files {
            let root = match entry.placement {
                Placement::Staged => self.layout.staging_dir.as_path(),
                Placement::WorkingDir => self.working_dir,
            };
            lines.push(format!("  - {} -> {}", entry.from, root.join(&entry.to)));
        }
        lines.join("\n")
    }
}
