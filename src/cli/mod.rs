//! CLI definitions and entry point.

use crate::config::CliOverrides;
use crate::paginate::Strategy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Copy validated submission numbers into a Jira labels field, in bulk
#[derive(Parser, Debug)]
#[command(name = "jira-bulk-edit", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// YAML config file (default: ./.jira-bulk-edit.yaml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dotenv file with credentials (default: ./.env if present)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Append log events to this file (default: bulk_edit.log)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long, global = true, conflicts_with = "log_file")]
    pub no_log_file: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search, validate, and copy the source value into the target field
    Run(RunArgs),

    /// Check values against the submission-number pattern (no network)
    Check(CheckArgs),

    /// Show the merged configuration with secrets redacted
    Config,
}

/// Arguments for the run command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Compute updates without issuing them
    #[arg(long)]
    pub dry_run: bool,

    /// Stop after this many issues have been processed
    #[arg(long, value_name = "N")]
    pub max_results: Option<usize>,

    /// Pagination strategy
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Issues requested per search
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Override the search query
    #[arg(long)]
    pub jql: Option<String>,

    /// Field holding the submission number
    #[arg(long)]
    pub source_field: Option<String>,

    /// Labels field receiving the submission number
    #[arg(long)]
    pub target_field: Option<String>,

    /// Skip the live-mode confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Run against issues from a JSON file instead of Jira
    #[arg(long, value_name = "PATH")]
    pub fixture: Option<PathBuf>,
}

impl RunArgs {
    /// Config overrides carried by this command's flags.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            jql: self.jql.clone(),
            source_field: self.source_field.clone(),
            target_field: self.target_field.clone(),
            page_size: self.page_size,
            strategy: self.strategy,
        }
    }
}

/// Arguments for the check command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Values to check
    #[arg(required = true)]
    pub values: Vec<String>,
}
