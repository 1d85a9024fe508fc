// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `shadowdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shadowdag",
    version,
    about = "Track live workflow DAG state from a jobstate event log.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Shadowdag.toml` in the current working directory. The file
    /// is optional when --dag and --jobstate are given.
    #[arg(long, value_name = "PATH", default_value = "Shadowdag.toml")]
    pub config: String,

    /// Path to the workflow definition (.dag) file.
    ///
    /// Overrides `[workflow].dag_file` from the config.
    #[arg(long, value_name = "PATH")]
    pub dag: Option<String>,

    /// Path to the jobstate log.
    ///
    /// Overrides `[monitor].jobstate_log` from the config.
    #[arg(long, value_name = "PATH")]
    pub jobstate: Option<String>,

    /// Replay the existing log and exit instead of following appends.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHADOWDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate the workflow, print it, but don't monitor anything.
    #[arg(long)]
    pub dry_run: bool,
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
