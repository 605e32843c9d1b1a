//! Extraction pipeline orchestration.
//!
//! A run is strictly sequential: rebuild the destination root, stage class
//! files and staged auxiliary files, archive the staging tree, delete it, then
//! copy pre-built archives beside the new one. The first failure aborts the
//! remaining steps and nothing already written is rolled back.

use crate::archiver::Archiver;
use crate::collector::{CLASS_FILES, PREBUILT_ARCHIVES, collect};
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::manifest::copy_aux_files;
use crate::output::{DryRunInfo, RunSummary, write_line};
use crate::stager::{Stager, recreate_dir};
use log::{debug, info};
use std::io::Write;
use std::time::Instant;

/// Run a full extraction, writing progress lines to `out`.
///
/// The configuration is validated before anything on disk changes, so a
/// rejected configuration produces neither side effects nor output.
///
/// # Errors
///
/// Returns the first error raised by validation, copying, archiving, or
/// cleanup.
pub fn run(
    config: &ExtractConfig,
    archiver: &dyn Archiver,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    let started = Instant::now();
    config.validate()?;
    let layout = config.layout();
    let archive_name = &layout.archive_name;

    write_line(out, format!("Start packaging {archive_name}"));
    debug!("rebuilding {}", layout.destination_root);
    recreate_dir(&layout.destination_root)?;

    let stager = Stager::new(layout.staging_dir.clone());
    stager.prepare()?;

    write_line(out, "Copying *.class");
    let class_files = collect(&config.source_root, &CLASS_FILES, stager.staging_path())?;
    let aux_files = copy_aux_files(
        &config.source_root,
        &config.aux_files,
        stager.staging_path(),
        &config.working_dir,
    )?;

    write_line(out, format!("Package the file into the {archive_name}"));
    archiver.archive(stager.staging_path(), &layout.archive_path)?;

    write_line(out, "Removing temporary files");
    stager.cleanup()?;
    write_line(out, format!("Complete {archive_name} packaging"));

    write_line(out, "Copying jar files");
    let prebuilt = collect(
        &config.source_root,
        &PREBUILT_ARCHIVES,
        &layout.destination_root,
    )?;

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        "packaged {} class file(s) into {} and copied {} pre-built archive(s)",
        class_files.len(),
        layout.archive_path,
        prebuilt.len()
    );

    Ok(RunSummary {
        archive_path: layout.archive_path,
        class_files: class_files.len(),
        aux_files,
        prebuilt_archives: prebuilt.len(),
        elapsed_ms,
    })
}

/// Describe what [`run`] would do without touching the filesystem.
///
/// # Errors
///
/// Returns the validation error a real run would fail with.
pub fn plan(config: &ExtractConfig) -> Result<DryRunInfo<'_>> {
    config.validate()?;
    Ok(DryRunInfo::new(config))
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
