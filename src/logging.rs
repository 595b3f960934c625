//! Logging setup.
//!
//! Human-readable events go to stderr; an optional log file receives the
//! same events without ANSI colors. `RUST_LOG` overrides the verbosity flags.

use crate::error::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::metadata::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Default log file written next to the working directory.
pub const DEFAULT_LOG_FILE: &str = "bulk_edit.log";

fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Initialize the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_flags(verbose, quiet).into())
        .from_env_lossy()
        .add_directive("ureq=warn".parse().map_err(anyhow::Error::from)?)
        .add_directive("rustls=warn".parse().map_err(anyhow::Error::from)?);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(anyhow::Error::from)?;
    Ok(())
}

/// Install a test-friendly subscriber; safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(level_from_flags(0, false), LevelFilter::INFO);
        assert_eq!(level_from_flags(1, false), LevelFilter::DEBUG);
        assert_eq!(level_from_flags(3, false), LevelFilter::TRACE);
        assert_eq!(level_from_flags(2, true), LevelFilter::ERROR);
    }
}
