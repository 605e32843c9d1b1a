//! Staging directory lifecycle and file copy helpers.
//!
//! The staging directory holds the tree that becomes the archive. It is
//! created inside the destination root, filled by the collector and the
//! auxiliary copier, archived, and then removed again.

use crate::error::{ExtractError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use std::fs;

/// Name of the scratch file written by [`Stager::prepare`].
const WRITE_CHECK: &str = ".pz-extract-write-test";

/// Owns the staging directory for a single run.
#[derive(Debug, Clone)]
pub struct Stager {
    staging_dir: Utf8PathBuf,
}

impl Stager {
    /// Create a stager for the given staging directory.
    #[must_use]
    pub const fn new(staging_dir: Utf8PathBuf) -> Self {
        Self { staging_dir }
    }

    /// Return the staging directory path.
    #[must_use]
    pub fn staging_path(&self) -> &Utf8Path {
        &self.staging_dir
    }

    /// Create the staging directory, discarding any previous contents, and
    /// check that it is writable.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be recreated or a scratch file
    /// cannot be written into it.
    pub fn prepare(&self) -> Result<()> {
        recreate_dir(&self.staging_dir)?;

        let scratch = self.staging_dir.join(WRITE_CHECK);
        match fs::write(&scratch, b"write check") {
            Ok(()) => {
                fs::remove_file(&scratch)?;
                Ok(())
            }
            Err(e) => Err(ExtractError::TargetNotWritable {
                path: self.staging_dir.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Delete the staging directory and everything beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be removed.
    pub fn cleanup(&self) -> Result<()> {
        remove_dir_if_exists(&self.staging_dir)
    }
}

/// Copy a single file, creating the destination's parent directories.
///
/// # Errors
///
/// Returns [`ExtractError::CopyFailed`] if the parent cannot be created or the
/// copy itself fails.
pub fn copy_file(from: &Utf8Path, to: &Utf8Path) -> Result<()> {
    trace!("copy {from} -> {to}");
    let copy_failed = |source| ExtractError::CopyFailed {
        from: from.to_owned(),
        to: to.to_owned(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(copy_failed)?;
    }
    fs::copy(from, to).map_err(copy_failed)?;
    Ok(())
}

/// Remove a directory tree if it exists.
///
/// # Errors
///
/// Returns [`ExtractError::RemoveFailed`] if the tree exists but cannot be
/// removed.
pub fn remove_dir_if_exists(path: &Utf8Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ExtractError::RemoveFailed {
            path: path.to_owned(),
            source,
        }),
    }
}

/// Delete a directory tree if present, then create it empty.
///
/// # Errors
///
/// Returns an error if removal or creation fails.
pub fn recreate_dir(path: &Utf8Path) -> Result<()> {
    remove_dir_if_exists(path)?;
    fs::create_dir_all(path)?;
    Ok(())
}
