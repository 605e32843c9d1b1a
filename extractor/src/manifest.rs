//! Auxiliary file manifest.
//!
//! A handful of files cannot be found by globbing but must always ship: the
//! Lua bytecode standard library goes inside the archive, and a few Lua
//! sources are written next to the invoking project so that tooling can read
//! them directly. The table lives here, away from the pipeline, so new entries
//! never touch control flow.

use crate::error::{ExtractError, Result};
use crate::stager::copy_file;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Serialize;

/// Where an auxiliary file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Inside the staging directory, and therefore inside the archive.
    Staged,
    /// Relative to the working directory, bypassing the output directory.
    WorkingDir,
}

/// One auxiliary file to copy verbatim from the game installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuxFile {
    /// Path relative to the source root.
    pub from: Utf8PathBuf,
    /// Destination path relative to the placement's root.
    pub to: Utf8PathBuf,
    /// Which root `to` is resolved against.
    pub placement: Placement,
}

impl AuxFile {
    /// Entry that keeps its relative path.
    #[must_use]
    pub fn same_path(path: &str, placement: Placement) -> Self {
        Self {
            from: Utf8PathBuf::from(path),
            to: Utf8PathBuf::from(path),
            placement,
        }
    }

    /// Entry that is renamed on copy.
    #[must_use]
    pub fn renamed(from: &str, to: &str, placement: Placement) -> Self {
        Self {
            from: Utf8PathBuf::from(from),
            to: Utf8PathBuf::from(to),
            placement,
        }
    }
}

/// The built-in manifest.
#[must_use]
pub fn default_manifest() -> Vec<AuxFile> {
    vec![
        AuxFile::same_path("stdlib.lbc", Placement::Staged),
        AuxFile::same_path("serialize.lua", Placement::WorkingDir),
        AuxFile::same_path("media/lua/shared/defines.lua", Placement::WorkingDir),
        AuxFile::same_path(
            "media/lua/shared/Sandbox/Apocalypse.lua",
            Placement::WorkingDir,
        ),
    ]
}

/// Counts of auxiliary files copied per placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuxCopyReport {
    /// Files written into the staging directory.
    pub staged: usize,
    /// Files written relative to the working directory.
    pub working_dir: usize,
}

/// Reject manifest entries that could escape their placement root.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidConfig`] for empty, absolute, or
/// parent-relative paths.
pub fn validate_manifest(entries: &[AuxFile]) -> Result<()> {
    for entry in entries {
        check_relative(&entry.from, "manifest source")?;
        check_relative(&entry.to, "manifest destination")?;
    }
    Ok(())
}

/// Require a non-empty path made only of normal components.
pub(crate) fn check_relative(path: &Utf8Path, what: &str) -> Result<()> {
    let is_plain = !path.as_str().trim().is_empty()
        && path
            .components()
            .any(|c| matches!(c, Utf8Component::Normal(_)))
        && path
            .components()
            .all(|c| matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir));
    if is_plain {
        Ok(())
    } else {
        Err(ExtractError::InvalidConfig {
            reason: format!("{what} `{path}` must be a non-empty relative path without `..`"),
        })
    }
}

/// Copy every manifest entry to its placement.
///
/// # Errors
///
/// Returns an error on the first entry that cannot be copied; a missing source
/// file is fatal.
pub fn copy_aux_files(
    source_root: &Utf8Path,
    entries: &[AuxFile],
    staging_dir: &Utf8Path,
    working_dir: &Utf8Path,
) -> Result<AuxCopyReport> {
    let mut report = AuxCopyReport::default();

    for entry in entries {
        let from = source_root.join(&entry.from);
        let to = match entry.placement {
            Placement::Staged => {
                report.staged += 1;
                staging_dir.join(&entry.to)
            }
            Placement::WorkingDir => {
                report.working_dir += 1;
                working_dir.join(&entry.to)
            }
        };
        if is_same_file(&from, &to) {
            debug!("auxiliary file {} is already at {to}", entry.from);
            continue;
        }
        debug!("auxiliary file {} -> {to}", entry.from);
        copy_file(&from, &to)?;
    }

    Ok(report)
}

/// Copying a file onto itself would truncate it.
fn is_same_file(from: &Utf8Path, to: &Utf8Path) -> bool {
    match (from.canonicalize_utf8(), to.canonicalize_utf8()) {
        (Ok(from), Ok(to)) => from == to,
        _ => false,
    }
}
