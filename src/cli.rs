// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `parmake`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "parmake",
    version,
    about = "Rebuild out-of-date makefile targets with a pool of worker threads.",
    long_about = None
)]
pub struct CliArgs {
    /// Makefile to read.
    ///
    /// Default: `makefile`, then `Makefile`, in the working directory.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Number of worker threads.
    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub jobs: u32,

    /// Change to this directory before reading the makefile; artifacts are
    /// looked up and commands run there.
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PARMAKE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse, check for cycles and print the build plan without running
    /// any command.
    #[arg(long)]
    pub dry_run: bool,

    /// Goals to build. Default: the first target in the makefile.
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
