//! Command-line argument parsing for multisql.

use crate::config::ServerGroups;
use crate::executor::psql::DEFAULT_PSQL_BIN;
use crate::orchestrator::{ExecutionMode, RunOptions};
use crate::report::ColorMode;
use clap::Parser;
use std::path::PathBuf;

/// Execute SQL statements on multiple servers.
#[derive(Parser, Debug)]
#[command(name = "multisql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File with SQL statements
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,

    /// Server group name
    #[arg(long, value_name = "NAME")]
    pub group: String,

    /// Hand the file to psql for each server instead of running it directly
    #[arg(long)]
    pub use_psql: bool,

    /// psql binary used with --use-psql
    #[arg(long, value_name = "PATH", env = "MULTISQL_PSQL", default_value = DEFAULT_PSQL_BIN)]
    pub psql_bin: PathBuf,

    /// Config file path (defaults to ./.multisqlrc, then ~/.multisqlrc)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of servers to run on at the same time
    #[arg(
        short = 'j',
        long,
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub jobs: u16,

    /// When to colorize output
    #[arg(long, value_name = "WHEN", value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default lookup.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(ServerGroups::default_path)
    }

    /// Builds the immutable run options from the parsed arguments.
    pub fn to_run_options(&self) -> RunOptions {
        let mode = if self.use_psql {
            ExecutionMode::Psql {
                bin: self.psql_bin.clone(),
            }
        } else {
            ExecutionMode::Driver
        };

        RunOptions {
            config_path: self.config_path(),
            sql_path: self.file.clone(),
            group: self.group.clone(),
            mode,
            jobs: usize::from(self.jobs),
            color: self.color,
        }
    }
}
