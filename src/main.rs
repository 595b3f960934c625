use clap::Parser;
use jira_bulk_edit::cli::commands;
use jira_bulk_edit::cli::{Cli, Commands};
use jira_bulk_edit::config::ConfigSources;
use jira_bulk_edit::logging::{DEFAULT_LOG_FILE, init_logging};
use jira_bulk_edit::{BulkEditError, ErrorCode, StructuredError};
use std::io::{self, IsTerminal};
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();

    let log_file = log_file_path(&cli);
    if let Err(e) = init_logging(cli.verbose, cli.quiet, log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let sources = ConfigSources {
        config_file: cli.config.clone(),
        env_file: cli.env_file.clone(),
    };

    let result = match &cli.command {
        Commands::Run(args) => commands::run::execute(args, &sources, cli.json, cli.quiet),
        Commands::Check(args) => commands::check::execute(args, cli.json),
        Commands::Config => commands::config::execute(&sources, cli.json),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Only `run` writes the log file; read-only commands stay side-effect free.
fn log_file_path(cli: &Cli) -> Option<PathBuf> {
    if cli.no_log_file || !matches!(cli.command, Commands::Run(_)) {
        return None;
    }
    Some(
        cli.log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
    )
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &BulkEditError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    if structured.code == ErrorCode::Cancelled && !json_mode {
        eprintln!("Operation cancelled.");
        std::process::exit(exit_code);
    }

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}
