//! `flir` subcommands.
//!
//! Each command returns `Ok(true)` when it succeeded without findings that
//! should fail the process; `main` maps `false` to exit code 1.

pub mod analyze;
pub mod decode;
pub mod encode;
pub mod files;
pub mod rules;
pub mod stats;
pub mod validate;

use clap::ValueEnum;

/// Report format for commands that print results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Pretty,
    Json,
}
