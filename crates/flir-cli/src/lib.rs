//! Library half of the `flir` command: config loading, output helpers and
//! the subcommand implementations, kept here so they can be tested without
//! spawning the binary.

pub mod commands;
pub mod config;
pub mod output;
pub mod tracing_config;
