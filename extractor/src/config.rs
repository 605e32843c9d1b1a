//! Run configuration.
//!
//! An [`ExtractConfig`] is assembled once at startup, from built-in defaults
//! overridden by command-line flags, and validated once before anything on
//! disk changes. Everything downstream receives the validated value and the
//! [`Layout`] derived from it.

use crate::archiver::archive_file_name;
use crate::error::{ExtractError, Result};
use crate::manifest::{AuxFile, check_relative, default_manifest, validate_manifest};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::time::Duration;

/// Game installation directory used when none is supplied. Empty means unset.
pub const DEFAULT_SOURCE_ROOT: &str = "";

/// Output directory, relative to the working directory.
pub const DEFAULT_OUT_DIR: &str = "lib";

/// Staging directory name inside the output directory.
pub const DEFAULT_STAGING_DIR: &str = "zombie_classes";

/// Game build number stamped into the archive name.
pub const DEFAULT_VERSION: &str = "42";

/// Archive file extension.
pub const DEFAULT_ARCHIVE_EXTENSION: &str = "jar";

/// Which backend builds the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ArchiverKind {
    /// Run the JDK `jar` tool found on `PATH`.
    #[default]
    Jar,
    /// Write the archive in-process.
    Zip,
}

impl ArchiverKind {
    /// Value accepted by `--archiver` for this backend.
    #[must_use]
    pub fn flag_name(self) -> String {
        use clap::ValueEnum;

        self.to_possible_value()
            .map_or_else(|| format!("{self:?}"), |value| value.get_name().to_owned())
    }
}

/// Complete configuration for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Game installation directory to read from.
    pub source_root: Utf8PathBuf,
    /// Directory the run resolves relative outputs against.
    pub working_dir: Utf8PathBuf,
    /// Output directory, relative to `working_dir`.
    pub out_dir: Utf8PathBuf,
    /// Staging directory name inside the output directory.
    pub staging_dir_name: String,
    /// Version token used in the archive name.
    pub version: String,
    /// Archive file extension.
    pub archive_extension: String,
    /// Archive backend.
    pub archiver: ArchiverKind,
    /// Kill the external archiver after this long. `None` waits forever.
    pub archiver_timeout: Option<Duration>,
    /// Auxiliary files copied outside of globbing.
    pub aux_files: Vec<AuxFile>,
}

impl ExtractConfig {
    /// Configuration with built-in defaults for everything except the working
    /// directory.
    #[must_use]
    pub fn new(working_dir: Utf8PathBuf) -> Self {
        Self {
            source_root: Utf8PathBuf::from(DEFAULT_SOURCE_ROOT),
            working_dir,
            out_dir: Utf8PathBuf::from(DEFAULT_OUT_DIR),
            staging_dir_name: DEFAULT_STAGING_DIR.to_owned(),
            version: DEFAULT_VERSION.to_owned(),
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_owned(),
            archiver: ArchiverKind::default(),
            archiver_timeout: None,
            aux_files: default_manifest(),
        }
    }

    /// Check every field before the run touches the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::SourceRootUnset`] for an empty source root,
    /// [`ExtractError::SourceRootMissing`] when it is not a directory, and
    /// [`ExtractError::InvalidConfig`] for any other rejected value.
    pub fn validate(&self) -> Result<()> {
        if self.source_root.as_str().trim().is_empty() {
            return Err(ExtractError::SourceRootUnset);
        }
        if !self.source_root.is_dir() {
            return Err(ExtractError::SourceRootMissing {
                path: self.source_root.clone(),
            });
        }

        // The source root is read-only input: outputs may neither land in it
        // nor delete it.
        let source_root = resolved(&self.source_root);
        let working_dir = resolved(&self.working_dir);
        if working_dir.starts_with(&source_root) {
            return Err(ExtractError::InvalidConfig {
                reason: format!(
                    "working directory {working_dir} is inside the source root {source_root}; run from outside the game directory"
                ),
            });
        }

        check_relative(&self.out_dir, "output directory")?;
        let destination_root = working_dir.join(&self.out_dir);
        if source_root.starts_with(&destination_root) {
            return Err(ExtractError::InvalidConfig {
                reason: format!(
                    "output directory {destination_root} contains the source root and would be deleted"
                ),
            });
        }

        let staging = Utf8Path::new(&self.staging_dir_name);
        let mut components = staging.components();
        let single_name = matches!(components.next(), Some(Utf8Component::Normal(_)))
            && components.next().is_none();
        if !single_name {
            return Err(ExtractError::InvalidConfig {
                reason: format!(
                    "staging directory `{}` must be a single directory name",
                    self.staging_dir_name
                ),
            });
        }

        require_token(&self.version, "version")?;
        require_token(&self.archive_extension, "archive extension")?;
        validate_manifest(&self.aux_files)
    }

    /// Derive the output paths for this configuration.
    #[must_use]
    pub fn layout(&self) -> Layout {
        let destination_root = self.working_dir.join(&self.out_dir);
        let archive_name = archive_file_name(&self.version, &self.archive_extension);
        Layout {
            staging_dir: destination_root.join(&self.staging_dir_name),
            archive_path: destination_root.join(&archive_name),
            archive_name,
            destination_root,
        }
    }
}

/// Symlink-free absolute form of `path`, or `path` itself when it does not
/// exist yet.
fn resolved(path: &Utf8Path) -> Utf8PathBuf {
    path.canonicalize_utf8().unwrap_or_else(|_| path.to_owned())
}

/// A token that ends up inside a file name.
fn require_token(value: &str, what: &str) -> Result<()> {
    let valid = !value.trim().is_empty()
        && !value
            .chars()
            .any(|c| matches!(c, '/' | '\\') || c.is_whitespace());
    if valid {
        Ok(())
    } else {
        Err(ExtractError::InvalidConfig {
            reason: format!("{what} `{value}` must be non-empty without separators or spaces"),
        })
    }
}

/// Output paths derived from an [`ExtractConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// Output tree rebuilt on each run.
    pub destination_root: Utf8PathBuf,
    /// Transient tree that becomes the archive.
    pub staging_dir: Utf8PathBuf,
    /// Archive file name, e.g. `b42.jar`.
    pub archive_name: String,
    /// Full path of the archive.
    pub archive_path: Utf8PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Placement;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        config: ExtractConfig,
    }

    #[fixture]
    fn valid() -> Fixture {
        let temp = TempDir::new().expect("temp dir");
        let base = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp path");
        let source = base.join("ProjectZomboid");
        std::fs::create_dir_all(&source).expect("create source");
        let mut config = ExtractConfig::new(base.join("work"));
        config.source_root = source;
        Fixture {
            _temp: temp,
            config,
        }
    }

    #[test]
    fn defaults_produce_lib_b42_layout() {
        let config = ExtractConfig::new(Utf8PathBuf::from("/work"));
        let layout = config.layout();
        assert_eq!(layout.destination_root, Utf8PathBuf::from("/work/lib"));
        assert_eq!(
            layout.staging_dir,
            Utf8PathBuf::from("/work/lib/zombie_classes")
        );
        assert_eq!(layout.archive_name, "b42.jar");
        assert_eq!(layout.archive_path, Utf8PathBuf::from("/work/lib/b42.jar"));
        assert_eq!(config.archiver, ArchiverKind::Jar);
        assert!(config.archiver_timeout.is_none());
    }

    #[rstest]
    #[case::jar(ArchiverKind::Jar, "jar")]
    #[case::zip(ArchiverKind::Zip, "zip")]
    fn archiver_flag_names_match_cli_values(#[case] kind: ArchiverKind, #[case] expected: &str) {
        assert_eq!(kind.flag_name(), expected);
    }

    #[test]
    fn empty_source_root_is_unset() {
        let config = ExtractConfig::new(Utf8PathBuf::from("/work"));
        assert!(matches!(
            config.validate(),
            Err(ExtractError::SourceRootUnset)
        ));
    }

    #[rstest]
    fn whitespace_source_root_is_unset(valid: Fixture) {
        let mut config = valid.config;
        config.source_root = Utf8PathBuf::from("   ");
        assert!(matches!(
            config.validate(),
            Err(ExtractError::SourceRootUnset)
        ));
    }

    #[rstest]
    fn missing_source_root_is_rejected(valid: Fixture) {
        let mut config = valid.config;
        config.source_root = config.source_root.join("nope");
        assert!(matches!(
            config.validate(),
            Err(ExtractError::SourceRootMissing { .. })
        ));
    }

    #[rstest]
    fn valid_config_passes(valid: Fixture) {
        valid.config.validate().expect("defaults with a real source are valid");
    }

    #[rstest]
    #[case::empty_out_dir(|c: &mut ExtractConfig| c.out_dir = Utf8PathBuf::new())]
    #[case::absolute_out_dir(|c: &mut ExtractConfig| c.out_dir = Utf8PathBuf::from("/lib"))]
    #[case::escaping_out_dir(|c: &mut ExtractConfig| c.out_dir = Utf8PathBuf::from("../lib"))]
    #[case::working_dir_itself(|c: &mut ExtractConfig| c.out_dir = Utf8PathBuf::from("."))]
    #[case::nested_staging(|c: &mut ExtractConfig| c.staging_dir_name = "a/b".to_owned())]
    #[case::parent_staging(|c: &mut ExtractConfig| c.staging_dir_name = "..".to_owned())]
    #[case::empty_staging(|c: &mut ExtractConfig| c.staging_dir_name = String::new())]
    #[case::empty_version(|c: &mut ExtractConfig| c.version = String::new())]
    #[case::spaced_version(|c: &mut ExtractConfig| c.version = "41 78".to_owned())]
    #[case::slashed_extension(|c: &mut ExtractConfig| c.archive_extension = "j/ar".to_owned())]
    #[case::bad_manifest(|c: &mut ExtractConfig| c.aux_files.push(AuxFile::same_path("/abs.lua", Placement::WorkingDir)))]
    fn invalid_fields_are_rejected(valid: Fixture, #[case] mutate: fn(&mut ExtractConfig)) {
        let mut config = valid.config;
        mutate(&mut config);
        assert!(matches!(
            config.validate(),
            Err(ExtractError::InvalidConfig { .. })
        ));
    }

    #[rstest]
    fn output_directory_may_not_contain_source(valid: Fixture) {
        let mut config = valid.config;
        config.working_dir = config
            .source_root
            .parent()
            .expect("source has a parent")
            .to_owned();
        config.out_dir = Utf8PathBuf::from("ProjectZomboid");
        assert!(matches!(
            config.validate(),
            Err(ExtractError::InvalidConfig { ref reason }) if reason.contains("source root")
        ));
    }

    #[rstest]
    #[case::same_dir("")]
    #[case::subdirectory("mods/mine")]
    fn working_dir_inside_source_is_rejected(valid: Fixture, #[case] below: &str) {
        let mut config = valid.config;
        config.working_dir = config.source_root.join(below);
        fs::create_dir_all(&config.working_dir).expect("create working dir");
        assert!(matches!(
            config.validate(),
            Err(ExtractError::InvalidConfig { ref reason }) if reason.contains("inside the source root")
        ));
    }

    #[cfg(unix)]
    #[rstest]
    fn working_dir_symlinked_to_source_is_rejected(valid: Fixture) {
        let mut config = valid.config;
        let link = config.working_dir.clone();
        fs::create_dir_all(link.parent().expect("parent")).expect("create parent");
        std::os::unix::fs::symlink(&config.source_root, &link).expect("symlink working dir");
        config.working_dir = link;
        assert!(matches!(
            config.validate(),
            Err(ExtractError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn custom_version_and_extension_shape_archive_name() {
        let mut config = ExtractConfig::new(Utf8PathBuf::from("/work"));
        config.version = "41".to_owned();
        config.archive_extension = "zip".to_owned();
        config.out_dir = Utf8PathBuf::from("build/lib");
        let layout = config.layout();
        assert_eq!(layout.archive_path, Utf8PathBuf::from("/work/build/lib/b41.zip"));
    }
}
