//! Glob-driven artifact collection.
//!
//! Walks the game installation and copies every file whose path (relative to
//! the installation root) matches an [`ArtifactPattern`] to the same relative
//! path under a target directory.

use crate::error::{ExtractError, Result};
use crate::stager::copy_file;
use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern};
use log::{debug, trace};
use walkdir::WalkDir;

/// Case-sensitive, and `*` stops at `/`.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Include/exclude globs describing one family of artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPattern {
    /// Glob a relative path must match.
    pub include: &'static str,
    /// Globs that veto an otherwise matching path.
    pub exclude: &'static [&'static str],
}

/// Compiled Java class files anywhere in the installation.
pub const CLASS_FILES: ArtifactPattern = ArtifactPattern {
    include: "**/*.class",
    exclude: &[],
};

/// Pre-built jars, skipping the bundled Java runtimes.
pub const PREBUILT_ARCHIVES: ArtifactPattern = ArtifactPattern {
    include: "**/*.jar",
    exclude: &["jre/**/*.jar", "jre64/**/*.jar"],
};

/// An [`ArtifactPattern`] with its globs compiled.
#[derive(Debug)]
pub struct CompiledPattern {
    include: Pattern,
    exclude: Vec<Pattern>,
}

impl ArtifactPattern {
    /// Compile the include and exclude globs.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidPattern`] if any glob is malformed.
    pub fn compile(&self) -> Result<CompiledPattern> {
        Ok(CompiledPattern {
            include: compile_glob(self.include)?,
            exclude: self
                .exclude
                .iter()
                .map(|p| compile_glob(p))
                .collect::<Result<_>>()?,
        })
    }
}

fn compile_glob(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| ExtractError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })
}

impl CompiledPattern {
    /// Check a path relative to the collection root.
    #[must_use]
    pub fn matches(&self, relative: &Utf8Path) -> bool {
        let candidate = relative.as_str();
        self.include.matches_with(candidate, MATCH_OPTIONS)
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_with(candidate, MATCH_OPTIONS))
    }
}

/// List the files under `source_root` matching `pattern`, as sorted relative
/// paths.
///
/// Symbolic links are followed and reported under their link path, so a
/// linked class file or directory is collected like a regular one.
///
/// # Errors
///
/// Returns an error if the pattern is invalid or the tree cannot be walked,
/// including when a symbolic link loops back to an ancestor.
pub fn find_matches(source_root: &Utf8Path, pattern: &ArtifactPattern) -> Result<Vec<Utf8PathBuf>> {
    let compiled = pattern.compile()?;
    let mut matches = Vec::new();

    let walker = WalkDir::new(source_root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|source| ExtractError::Walk {
            root: source_root.to_owned(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(relative) = relative_utf8(source_root, entry.path()) else {
            trace!("skipping non-UTF-8 path {}", entry.path().display());
            continue;
        };
        if compiled.matches(&relative) {
            matches.push(relative);
        }
    }

    Ok(matches)
}

/// Copy every file matching `pattern` from `source_root` into `target_root`,
/// preserving relative paths. Returns the relative paths copied.
///
/// # Errors
///
/// Fails fast on the first walk or copy error.
pub fn collect(
    source_root: &Utf8Path,
    pattern: &ArtifactPattern,
    target_root: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>> {
    let matches = find_matches(source_root, pattern)?;
    debug!(
        "{} file(s) match {} under {source_root}",
        matches.len(),
        pattern.include
    );

    for relative in &matches {
        copy_file(&source_root.join(relative), &target_root.join(relative))?;
    }

    Ok(matches)
}

/// Dot-prefixed files and directories are never collected.
fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn relative_utf8(root: &Utf8Path, path: &std::path::Path) -> Option<Utf8PathBuf> {
    let relative = path.strip_prefix(root.as_std_path()).ok()?;
    Utf8PathBuf::from_path_buf(relative.to_path_buf()).ok()
}
