//! Archive creation over the staged tree.
//!
//! Two backends produce the same layout: the staged directory's contents sit
//! at the archive root, never under the staging directory's own name.
//! [`JarArchiver`] delegates to the JDK's `jar` tool; [`ZipArchiver`] writes
//! the zip container in-process for hosts without a JDK.

use crate::command::{CommandExecutor, SystemCommandExecutor, diagnostic_text};
use crate::config::ArchiverKind;
use crate::error::{ExtractError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace};
use std::fs::{self, File};
use std::io;
use std::time::Duration;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Program name of the JDK archiving tool.
pub const JAR_PROGRAM: &str = "jar";

/// Jar manifest path inside the archive.
const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

/// File name of the packaged archive, e.g. `b42.jar`.
///
/// # Examples
///
/// ```
/// use pz_extract::archiver::archive_file_name;
///
/// assert_eq!(archive_file_name("42", "jar"), "b42.jar");
/// ```
#[must_use]
pub fn archive_file_name(version: &str, extension: &str) -> String {
    format!("b{version}.{extension}")
}

/// Packs a staged directory into a single archive file.
#[cfg_attr(test, mockall::automock)]
pub trait Archiver {
    /// Create `archive_path` whose root holds the contents of `staged_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be produced.
    fn archive(&self, staged_dir: &Utf8Path, archive_path: &Utf8Path) -> Result<()>;
}

/// Build the host archiver for `kind`. The timeout only applies to `jar`.
#[must_use]
pub fn archiver_for(kind: ArchiverKind, timeout: Option<Duration>) -> Box<dyn Archiver> {
    match kind {
        ArchiverKind::Jar => Box::new(JarArchiver::new(SystemCommandExecutor::with_timeout(
            timeout,
        ))),
        ArchiverKind::Zip => Box::new(ZipArchiver),
    }
}

/// Runs `jar cf <archive> -C <staged> .`.
#[derive(Debug)]
pub struct JarArchiver<E> {
    executor: E,
}

impl<E: CommandExecutor> JarArchiver<E> {
    /// Create an archiver that runs `jar` through `executor`.
    #[must_use]
    pub const fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E: CommandExecutor> Archiver for JarArchiver<E> {
    fn archive(&self, staged_dir: &Utf8Path, archive_path: &Utf8Path) -> Result<()> {
        if let Some(parent) = archive_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let output = self.executor.run(
            JAR_PROGRAM,
            &["cf", archive_path.as_str(), "-C", staged_dir.as_str(), "."],
        )?;

        if !output.status.success() {
            return Err(ExtractError::ArchiverFailed {
                program: JAR_PROGRAM.to_owned(),
                status: output.status,
                output: diagnostic_text(&output),
            });
        }

        debug!("{JAR_PROGRAM} wrote {archive_path}");
        Ok(())
    }
}

/// Writes the archive with the `zip` crate.
///
/// Entries are stored in sorted order with `/` separators. A minimal jar
/// manifest is added first unless the staged tree already carries one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn archive(&self, staged_dir: &Utf8Path, archive_path: &Utf8Path) -> Result<()> {
        if let Some(parent) = archive_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = ZipWriter::new(File::create(archive_path)?);
        let options = SimpleFileOptions::default();

        if !staged_dir.join(MANIFEST_ENTRY).is_file() {
            if !staged_dir.join("META-INF").is_dir() {
                writer.add_directory("META-INF/", options)?;
            }
            writer.start_file(MANIFEST_ENTRY, options)?;
            io::Write::write_all(
                &mut writer,
                concat!(
                    "Manifest-Version: 1.0\r\n",
                    "Created-By: pz-extract\r\n",
                    "\r\n"
                )
                .as_bytes(),
            )?;
        }

        for entry in WalkDir::new(staged_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|source| ExtractError::Walk {
                root: staged_dir.to_owned(),
                source,
            })?;
            let name = entry_name(staged_dir, entry.path())?;

            if entry.file_type().is_dir() {
                writer.add_directory(format!("{name}/"), options)?;
            } else if entry.file_type().is_file() {
                trace!("zip entry {name}");
                writer.start_file(name, options)?;
                io::copy(&mut File::open(entry.path())?, &mut writer)?;
            }
        }

        writer.finish()?;
        debug!("wrote {archive_path}");
        Ok(())
    }
}

/// Archive entry name for `path`, relative to `root` and `/`-separated.
fn entry_name(root: &Utf8Path, path: &std::path::Path) -> Result<String> {
    let path = Utf8PathBuf::from_path_buf(path.to_path_buf()).map_err(|p| {
        ExtractError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("non-UTF-8 path in staging tree: {}", p.display()),
        ))
    })?;
    let relative = path
        .strip_prefix(root)
        .map_err(|e| ExtractError::Io(io::Error::other(e.to_string())))?;
    Ok(relative
        .components()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("/"))
}
