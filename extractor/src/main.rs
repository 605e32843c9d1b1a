//! `pz-extract` CLI entrypoint.
//!
//! Parses flags, installs the log subscriber, runs the extraction pipeline,
//! and maps the outcome onto the process exit code.

use camino::Utf8PathBuf;
use clap::Parser;
use pz_extract::archiver::archiver_for;
use pz_extract::cli::Cli;
use pz_extract::error::{ExtractError, Result};
use pz_extract::output::{RunSummary, used_time_line, write_line};
use pz_extract::pipeline;
use std::io::{self, Write};
use tracing_subscriber::filter::LevelFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<()> {
    let cwd = current_dir()?;
    let config = cli.to_config(&cwd);

    if cli.dry_run {
        let info = pipeline::plan(&config)?;
        write_line(stdout, info.display_text());
        return Ok(());
    }

    let archiver = archiver_for(config.archiver, config.archiver_timeout);
    let summary = if cli.is_quiet() {
        pipeline::run(&config, archiver.as_ref(), &mut io::sink())?
    } else {
        pipeline::run(&config, archiver.as_ref(), stdout)?
    };

    write_report(cli, &summary, stdout)
}

/// Print the closing output: JSON alone, or the timing line preceded by the
/// counts when `-v` is given.
fn write_report(cli: &Cli, summary: &RunSummary, stdout: &mut dyn Write) -> Result<()> {
    if cli.json {
        let json = summary
            .to_json()
            .map_err(|e| ExtractError::WriteFailed {
                source: io::Error::other(e),
            })?;
        writeln!(stdout, "{json}").map_err(|source| ExtractError::WriteFailed { source })?;
    } else if !cli.quiet {
        if cli.verbosity > 0 {
            write_line(stdout, summary.display_text());
        }
        write_line(stdout, used_time_line(summary.elapsed_ms));
    }

    Ok(())
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| ExtractError::InvalidConfig {
        reason: format!("current directory is not valid UTF-8: {e}"),
    })
}

/// Log records go to stderr so stdout stays parseable under `--json`.
fn init_logging(verbosity: u8) {
    let level = level_for_verbosity(verbosity);
    // An already installed subscriber wins.
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

const fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_line(stderr, format!("error: {err}"));
            err.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pz_extract::manifest::AuxCopyReport;
    use rstest::rstest;

    fn summary() -> RunSummary {
        RunSummary {
            archive_path: Utf8PathBuf::from("/work/lib/b42.jar"),
            class_files: 12,
            aux_files: AuxCopyReport {
                staged: 1,
                working_dir: 3,
            },
            prebuilt_archives: 4,
            elapsed_ms: 250,
        }
    }

    fn report_lines(cli: &Cli) -> Vec<String> {
        let mut stdout = Vec::new();
        write_report(cli, &summary(), &mut stdout).expect("report written");
        String::from_utf8(stdout)
            .expect("stdout was not UTF-8")
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn default_report_is_only_the_timing_line() {
        assert_eq!(report_lines(&Cli::default()), ["Used time: 250ms"]);
    }

    #[test]
    fn verbose_report_lists_counts_before_timing() {
        let cli = Cli {
            verbosity: 1,
            ..Cli::default()
        };

        let lines = report_lines(&cli);

        assert_eq!(lines.first().map(String::as_str), Some("Archive: /work/lib/b42.jar"));
        assert!(lines.iter().any(|line| line == "  class files: 12"));
        assert!(lines.iter().any(|line| line == "Pre-built archives copied: 4"));
        assert_eq!(lines.last().map(String::as_str), Some("Used time: 250ms"));
    }

    #[test]
    fn quiet_report_prints_nothing() {
        let cli = Cli {
            quiet: true,
            ..Cli::default()
        };
        assert!(report_lines(&cli).is_empty());
    }

    #[test]
    fn json_report_ignores_verbosity() {
        let cli = Cli {
            json: true,
            verbosity: 2,
            ..Cli::default()
        };
        let mut stdout = Vec::new();
        write_report(&cli, &summary(), &mut stdout).expect("report written");

        let value: serde_json::Value = serde_json::from_slice(&stdout).expect("stdout is JSON");
        assert_eq!(value["class_files"], 12);
    }

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn unset_source_root_exits_with_config_code() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(ExtractError::SourceRootUnset), &mut stderr);
        assert_eq!(exit_code, 2);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.starts_with("error: Project Zomboid directory is not set"));
    }

    #[test]
    fn runtime_failure_exits_with_one() {
        let err = ExtractError::RemoveFailed {
            path: Utf8PathBuf::from("/work/lib"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Err(err), &mut stderr), 1);
    }

    #[rstest]
    #[case::default(0, LevelFilter::WARN)]
    #[case::info(1, LevelFilter::INFO)]
    #[case::debug(2, LevelFilter::DEBUG)]
    #[case::trace(3, LevelFilter::TRACE)]
    #[case::saturates(9, LevelFilter::TRACE)]
    fn verbosity_maps_to_level(#[case] verbosity: u8, #[case] expected: LevelFilter) {
        assert_eq!(level_for_verbosity(verbosity), expected);
    }

    #[test]
    fn dry_run_without_source_is_rejected() {
        let cli = Cli {
            dry_run: true,
            ..Cli::default()
        };
        let mut stdout = Vec::new();
        let err = run(&cli, &mut stdout).expect_err("source root is unset");
        assert!(matches!(err, ExtractError::SourceRootUnset));
        assert!(stdout.is_empty());
    }
}
