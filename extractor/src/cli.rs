//! CLI argument definitions for the extractor.
//!
//! Flags map one-to-one onto [`ExtractConfig`] fields; [`Cli::to_config`]
//! performs that mapping so the binary only orchestrates.

use crate::config::{
    ArchiverKind, DEFAULT_ARCHIVE_EXTENSION, DEFAULT_OUT_DIR, DEFAULT_STAGING_DIR,
    DEFAULT_VERSION, ExtractConfig,
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::time::Duration;

/// Extract Project Zomboid classes into a distributable jar.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "pz-extract")]
#[command(version, about)]
#[command(long_about = concat!(
    "Extract Project Zomboid classes into a distributable jar.\n\n",
    "Every *.class file under the game directory is packed into ",
    "<out-dir>/b<version>.jar with the JDK `jar` tool (or in-process with ",
    "--archiver zip). The Lua standard library bytecode goes into the archive, ",
    "a few Lua sources are copied next to the working directory, and the game's ",
    "bundled jars (except the JRE's) are copied into <out-dir>.\n\n",
    "The output directory is deleted and rebuilt on every run.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package a Steam install:\n",
    "    $ pz-extract ~/.steam/steam/steamapps/common/ProjectZomboid\n\n",
    "  Package without a JDK:\n",
    "    $ pz-extract --archiver zip /opt/pz\n\n",
    "  Preview the output layout:\n",
    "    $ pz-extract --dry-run /opt/pz\n",
))]
pub struct Cli {
    /// Project Zomboid installation directory.
    #[arg(value_name = "SOURCE", conflicts_with = "source")]
    pub source_positional: Option<Utf8PathBuf>,

    /// Project Zomboid installation directory (alternative to SOURCE).
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<Utf8PathBuf>,

    /// Output directory, relative to the working directory. Rebuilt each run.
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUT_DIR)]
    pub out_dir: Utf8PathBuf,

    /// Temporary directory name inside the output directory.
    #[arg(long = "staging-dir", value_name = "NAME", default_value = DEFAULT_STAGING_DIR)]
    pub staging_dir: String,

    /// Game build number used in the archive name.
    #[arg(long, value_name = "VERSION", default_value = DEFAULT_VERSION)]
    pub game_version: String,

    /// Archive file extension.
    #[arg(long = "archive-ext", value_name = "EXT", default_value = DEFAULT_ARCHIVE_EXTENSION)]
    pub archive_extension: String,

    /// Archive backend.
    #[arg(long, value_enum, default_value_t = ArchiverKind::Jar)]
    pub archiver: ArchiverKind,

    /// Kill the `jar` tool after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub archiver_timeout: Option<u64>,

    /// Resolve the output directory and Lua files against DIR instead of the
    /// current directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub working_dir: Option<Utf8PathBuf>,

    /// Show the planned layout and exit without touching the filesystem.
    #[arg(long, conflicts_with = "json")]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,

    /// Print a JSON run summary instead of progress lines.
    #[arg(long)]
    pub json: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            source_positional: None,
            source: None,
            out_dir: Utf8PathBuf::from(DEFAULT_OUT_DIR),
            staging_dir: DEFAULT_STAGING_DIR.to_owned(),
            game_version: DEFAULT_VERSION.to_owned(),
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_owned(),
            archiver: ArchiverKind::Jar,
            archiver_timeout: None,
            working_dir: None,
            dry_run: false,
            verbosity: 0,
            quiet: false,
            json: false,
        }
    }
}

impl Cli {
    /// The source root from either the positional argument or `--source`.
    #[must_use]
    pub fn source_root(&self) -> Option<&Utf8Path> {
        self.source_positional
            .as_deref()
            .or(self.source.as_deref())
    }

    /// Whether progress lines are suppressed. `--json` implies quiet.
    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        self.quiet || self.json
    }

    /// Build the run configuration, resolving relative paths against `cwd`.
    ///
    /// A missing source root is carried through as empty so that validation
    /// reports it.
    #[must_use]
    pub fn to_config(&self, cwd: &Utf8Path) -> ExtractConfig {
        let working_dir = self
            .working_dir
            .as_deref()
            .map_or_else(|| cwd.to_owned(), |dir| cwd.join(dir));

        let mut config = ExtractConfig::new(working_dir);
        if let Some(source) = self.source_root().filter(|s| !s.as_str().trim().is_empty()) {
            config.source_root = cwd.join(source);
        }
        config.out_dir.clone_from(&self.out_dir);
        config.staging_dir_name.clone_from(&self.staging_dir);
        config.version.clone_from(&self.game_version);
        config.archive_extension.clone_from(&self.archive_extension);
        config.archiver = self.archiver;
        config.archiver_timeout = self.archiver_timeout.map(Duration::from_secs);
        config
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
