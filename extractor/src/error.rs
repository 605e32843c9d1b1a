//! Error types for the extractor.
//!
//! Every failure in a run is fatal. Configuration problems are detected before
//! the filesystem is touched and map to a distinct exit code so that scripted
//! callers can tell "nothing happened" apart from "the run died part-way".

use camino::Utf8PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Exit code for configuration errors raised before any side effect.
pub const CONFIG_EXIT_CODE: i32 = 2;

/// Exit code for failures raised while the pipeline was running.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Errors that can occur while extracting and packaging game files.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No game installation directory was configured.
    #[error("Project Zomboid directory is not set; pass it as SOURCE or with --source")]
    SourceRootUnset,

    /// The configured installation directory does not exist.
    #[error("Project Zomboid directory {path} does not exist or is not a directory")]
    SourceRootMissing {
        /// The configured source root.
        path: Utf8PathBuf,
    },

    /// A configuration value was rejected during validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the rejected value.
        reason: String,
    },

    /// A glob pattern could not be compiled.
    #[error("invalid glob pattern {pattern}: {reason}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// Description of the compile error.
        reason: String,
    },

    /// Walking a directory tree failed.
    #[error("failed to walk {root}")]
    Walk {
        /// Root of the walk that failed.
        root: Utf8PathBuf,
        /// The underlying walk error.
        #[source]
        source: walkdir::Error,
    },

    /// A file could not be copied.
    #[error("failed to copy {from} to {to}")]
    CopyFailed {
        /// Source path of the copy.
        from: Utf8PathBuf,
        /// Destination path of the copy.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be removed.
    #[error("failed to remove {path}")]
    RemoveFailed {
        /// Path that could not be removed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The staging directory exists but is not writable.
    #[error("staging directory {path} is not writable: {reason}")]
    TargetNotWritable {
        /// Path to the non-writable directory.
        path: Utf8PathBuf,
        /// Description of the underlying I/O error.
        reason: String,
    },

    /// The archiving utility could not be started.
    #[error("failed to run {program}; is it installed and on PATH?")]
    ArchiverSpawn {
        /// Program that failed to start.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The archiving utility exited unsuccessfully.
    #[error("{program} exited with {status}: {output}")]
    ArchiverFailed {
        /// Program that failed.
        program: String,
        /// Exit status reported by the process.
        status: ExitStatus,
        /// Diagnostic output captured from the process.
        output: String,
    },

    /// The archiving utility did not finish within the configured timeout.
    #[error("{program} timed out after {seconds} seconds")]
    ArchiverTimeout {
        /// Program that was killed.
        program: String,
        /// Timeout that elapsed.
        seconds: u64,
    },

    /// The built-in archive writer failed.
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the run summary failed.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// Returns `true` for errors raised by configuration validation.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::SourceRootUnset | Self::SourceRootMissing { .. } | Self::InvalidConfig { .. }
        )
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            CONFIG_EXIT_CODE
        } else {
            FAILURE_EXIT_CODE
        }
    }
}

/// Result type alias using [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;
