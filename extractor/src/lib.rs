//! Project Zomboid class extractor.
//!
//! This crate copies compiled game classes and a few auxiliary Lua files out of
//! a local Project Zomboid installation, packs the classes into a single
//! `b<version>.jar`, and copies the game's bundled jars beside it. It backs the
//! `pz-extract` CLI binary and can be driven programmatically.
//!
//! # Modules
//!
//! - [`archiver`] - Archive backends (`jar` tool or in-process zip)
//! - [`cli`] - Command-line argument definitions
//! - [`collector`] - Glob-driven file discovery and copying
//! - [`command`] - External command execution with optional timeout
//! - [`config`] - Run configuration and validation
//! - [`error`] - Error types and exit codes
//! - [`manifest`] - Auxiliary files copied outside of globbing
//! - [`output`] - Progress lines, run summary, and dry-run report
//! - [`pipeline`] - Extraction pipeline orchestration
//! - [`stager`] - Staging directory lifecycle and file copy helpers

pub mod archiver;
pub mod cli;
pub mod collector;
pub mod command;
pub mod config;
pub mod error;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod stager;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
