//! Configuration command.
//!
//! Shows the merged configuration with secrets redacted, and which files
//! contributed to it.

use crate::config::{
    CliOverrides, ConfigSources, DEFAULT_CONFIG_FILE, DEFAULT_ENV_FILE, load_config,
};
use crate::error::Result;
use serde_json::json;
use std::path::Path;
use tracing::debug;

/// Execute the config command.
///
/// # Errors
///
/// Returns an error if a config file cannot be loaded or JSON serialization
/// fails.
pub fn execute(sources: &ConfigSources, json: bool) -> Result<()> {
    let layer = load_config(sources, &CliOverrides::default())?;
    let values = layer.redacted();
    let config_file = sources
        .config_file
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let env_file = sources
        .env_file
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_ENV_FILE));
    debug!(keys = values.len(), "Resolved configuration");

    if json {
        let output = json!({
            "config_file": file_status(config_file),
            "env_file": file_status(env_file),
            "values": values,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Config file: {}", describe(config_file));
    println!("Env file: {}", describe(env_file));
    println!();
    let width = values.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in &values {
        println!("{key:<width$}  {value}");
    }
    Ok(())
}

fn file_status(path: &Path) -> serde_json::Value {
    json!({
        "path": path.display().to_string(),
        "exists": path.is_file(),
    })
}

fn describe(path: &Path) -> String {
    let status = if path.is_file() { "exists" } else { "not found" };
    format!("{} ({status})", path.display())
}
