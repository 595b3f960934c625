//! Configuration management for `jira_bulk_edit`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`JIRA_URL`, `JIRA_EMAIL`, `JIRA_API_TOKEN`,
//!    `JIRA_BULK_*`)
//! 3. `.env` file
//! 4. YAML config file (`.jira-bulk-edit.yaml`)
//! 5. Defaults
//!
//! Layers are merged once at startup and resolved into immutable
//! [`StoreConfig`] and [`RunConfig`] values; nothing below `main` reads the
//! environment.

use crate::error::{BulkEditError, Result};
use crate::model::{DEFAULT_SOURCE_FIELD, DEFAULT_SUMMARY_FIELD, DEFAULT_TARGET_FIELD, FieldNames};
use crate::paginate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, QuerySpec, Strategy};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// YAML config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".jira-bulk-edit.yaml";
/// Dotenv file looked up in the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";
/// HTTP timeout for a single store call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Prefix for tool-specific environment variables.
const ENV_PREFIX: &str = "JIRA_BULK_";

/// Issues whose submission number has not been copied yet.
pub const DEFAULT_JQL: &str = r#"project = es
AND "Numéro de soumission[Short text]" !~ "S-"
AND "Liste Numéro de soumission[Labels]" is empty
AND assignee != 5f6aaf8fad3484006a8038e1"#;

const KEY_URL: &[&str] = &["url", "jira.url", "jira-url"];
const KEY_EMAIL: &[&str] = &["email", "jira.email", "jira-email"];
const KEY_TOKEN: &[&str] = &["api-token", "jira.api-token", "jira-api-token"];
const KEY_TIMEOUT: &[&str] = &["timeout", "jira.timeout"];
const KEY_JQL: &[&str] = &["jql", "query"];
const KEY_SOURCE: &[&str] = &["source-field", "fields.source"];
const KEY_TARGET: &[&str] = &["target-field", "fields.target"];
const KEY_SUMMARY: &[&str] = &["summary-field", "fields.summary"];
const KEY_PAGE_SIZE: &[&str] = &["page-size"];
const KEY_STRATEGY: &[&str] = &["strategy"];

/// A configuration layer of normalized keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigLayer {
    values: BTreeMap<String, String>,
}

impl ConfigLayer {
    /// Insert a value under its normalized key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// First value found for any of `keys`.
    #[must_use]
    pub fn get(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|key| self.values.get(&normalize_key(key)))
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file. Nested keys flatten with dots.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        let mut flat = BTreeMap::new();
        flatten_yaml(&value, "", &mut flat);

        let mut layer = Self::default();
        for (key, value) in flat {
            layer.set(&key, value);
        }
        Ok(layer)
    }

    /// Build a layer from a `.env` file using dotenv rules: `export`
    /// prefixes, quoting, escapes and inline comments.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line does not parse.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let pairs = dotenvy::from_path_iter(path)
            .and_then(|iter| iter.collect::<std::result::Result<Vec<_>, _>>())
            .map_err(|e| match e {
                dotenvy::Error::Io(io) => BulkEditError::Io(io),
                other => BulkEditError::Config(format!("invalid env file: {other}")),
            })?;
        Ok(Self::from_env_pairs(pairs))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_pairs(env::vars())
    }

    /// Build a layer from `(NAME, value)` pairs, keeping only known names.
    #[must_use]
    pub fn from_env_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (name, value) in pairs {
            match name.as_str() {
                "JIRA_URL" => layer.set("url", value),
                "JIRA_EMAIL" => layer.set("email", value),
                "JIRA_API_TOKEN" => layer.set("api-token", value),
                other => {
                    if let Some(stripped) = other.strip_prefix(ENV_PREFIX) {
                        layer.set(stripped, value);
                    }
                }
            }
        }
        layer
    }

    /// Copy of the layer with secrets masked, for display.
    #[must_use]
    pub fn redacted(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(key, value)| {
                let shown = if KEY_TOKEN.contains(&key.as_str()) {
                    redact(value)
                } else {
                    value.clone()
                };
                (key.clone(), shown)
            })
            .collect()
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub jql: Option<String>,
    pub source_field: Option<String>,
    pub target_field: Option<String>,
    pub page_size: Option<usize>,
    pub strategy: Option<Strategy>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(jql) = &self.jql {
            layer.set("jql", jql.clone());
        }
        if let Some(field) = &self.source_field {
            layer.set("source-field", field.clone());
        }
        if let Some(field) = &self.target_field {
            layer.set("target-field", field.clone());
        }
        if let Some(page_size) = self.page_size {
            layer.set("page-size", page_size.to_string());
        }
        if let Some(strategy) = self.strategy {
            layer.set("strategy", strategy.as_str());
        }

        layer
    }
}

/// Where optional config files come from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Explicit YAML path; must exist when set.
    pub config_file: Option<PathBuf>,
    /// Explicit dotenv path; must exist when set.
    pub env_file: Option<PathBuf>,
}

/// Default layer values.
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.set("jql", DEFAULT_JQL);
    layer.set("source-field", DEFAULT_SOURCE_FIELD);
    layer.set("target-field", DEFAULT_TARGET_FIELD);
    layer.set("summary-field", DEFAULT_SUMMARY_FIELD);
    layer.set("page-size", DEFAULT_PAGE_SIZE.to_string());
    layer.set("strategy", Strategy::default().as_str());
    layer.set("timeout", DEFAULT_TIMEOUT_SECS.to_string());
    layer
}

/// Load and merge every layer.
///
/// # Errors
///
/// Returns an error if an explicitly named file is missing, or any present
/// file cannot be parsed.
pub fn load_config(sources: &ConfigSources, cli: &CliOverrides) -> Result<ConfigLayer> {
    let yaml = match &sources.config_file {
        Some(path) => ConfigLayer::from_yaml(path).map_err(|e| file_error(path, &e))?,
        None => optional_layer(Path::new(DEFAULT_CONFIG_FILE), ConfigLayer::from_yaml)?,
    };
    let dotenv = match &sources.env_file {
        Some(path) => ConfigLayer::from_env_file(path).map_err(|e| file_error(path, &e))?,
        None => optional_layer(Path::new(DEFAULT_ENV_FILE), ConfigLayer::from_env_file)?,
    };

    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        yaml,
        dotenv,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]))
}

fn optional_layer(path: &Path, load: fn(&Path) -> Result<ConfigLayer>) -> Result<ConfigLayer> {
    if path.is_file() {
        load(path)
    } else {
        Ok(ConfigLayer::default())
    }
}

fn file_error(path: &Path, err: &BulkEditError) -> BulkEditError {
    BulkEditError::Config(format!("{}: {err}", path.display()))
}

/// Connection settings for the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Resolve store settings, failing before any request is made.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` naming every unset variable, or a config
    /// error for a malformed URL or timeout.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let url = non_blank(layer.get(KEY_URL));
        let email = non_blank(layer.get(KEY_EMAIL));
        let token = non_blank(layer.get(KEY_TOKEN));

        let missing: Vec<String> = [
            ("JIRA_URL", url.is_none()),
            ("JIRA_EMAIL", email.is_none()),
            ("JIRA_API_TOKEN", token.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| name.to_string())
        .collect();

        let (Some(base_url), Some(email), Some(api_token)) = (url, email, token) else {
            return Err(BulkEditError::MissingCredentials { missing });
        };

        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(BulkEditError::Config(format!(
                "JIRA_URL must start with http:// or https:// (got '{base_url}')"
            )));
        }

        let timeout_secs = parse_number(layer, KEY_TIMEOUT, "timeout")?;
        if timeout_secs == 0 {
            return Err(BulkEditError::validation("timeout", "must be at least 1 second"));
        }

        Ok(Self {
            base_url,
            email,
            api_token,
            timeout_secs,
        })
    }
}

/// What the run searches for and how it pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub jql: String,
    pub fields: FieldNames,
    pub page_size: usize,
    pub strategy: Strategy,
}

impl RunConfig {
    /// Resolve run settings.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty query or field, an
    /// out-of-range page size, or an unknown strategy.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let jql = required(layer, KEY_JQL, "jql")?;
        let fields = FieldNames {
            source: required(layer, KEY_SOURCE, "source-field")?,
            target: required(layer, KEY_TARGET, "target-field")?,
            summary: required(layer, KEY_SUMMARY, "summary-field")?,
        };
        if fields.source == fields.target {
            return Err(BulkEditError::validation(
                "target-field",
                "must differ from source-field",
            ));
        }

        let page_size: usize = parse_number(layer, KEY_PAGE_SIZE, "page-size")?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(BulkEditError::validation(
                "page-size",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
            ));
        }

        let strategy = layer
            .get(KEY_STRATEGY)
            .map_or(Ok(Strategy::default()), str::parse::<Strategy>)?;

        Ok(Self {
            jql,
            fields,
            page_size,
            strategy,
        })
    }

    /// Query parameters for the paginator.
    #[must_use]
    pub fn query_spec(&self) -> QuerySpec {
        QuerySpec {
            query: self.jql.clone(),
            fields: self.fields.requested(),
            page_size: self.page_size,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn required(layer: &ConfigLayer, keys: &[&str], name: &str) -> Result<String> {
    non_blank(layer.get(keys)).ok_or_else(|| BulkEditError::validation(name, "cannot be empty"))
}

fn parse_number<T: std::str::FromStr>(layer: &ConfigLayer, keys: &[&str], name: &str) -> Result<T> {
    let raw = required(layer, keys, name)?;
    raw.parse()
        .map_err(|_| BulkEditError::validation(name, format!("expected a number, got '{raw}'")))
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn redact(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "****".to_string();
    }
    let skip = secret.chars().count() - 4;
    let tail: String = secret.chars().skip(skip).collect();
    format!("****{tail}")
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut BTreeMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null | serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            None
        }
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn credentials() -> ConfigLayer {
        ConfigLayer::from_env_pairs([
            ("JIRA_URL".to_string(), "https://example.atlassian.net".to_string()),
            ("JIRA_EMAIL".to_string(), "ops@example.com".to_string()),
            ("JIRA_API_TOKEN".to_string(), "tok-123456".to_string()),
        ])
    }

    #[test]
    fn normalize_key_handles_various_formats() {
        assert_eq!(normalize_key("PAGE_SIZE"), "page-size");
        assert_eq!(normalize_key("  page_size "), "page-size");
        assert_eq!(normalize_key("fields.source"), "fields.source");
    }

    #[test]
    fn env_pairs_map_known_names_only() {
        let layer = ConfigLayer::from_env_pairs([
            ("JIRA_URL".to_string(), "https://x".to_string()),
            ("JIRA_BULK_PAGE_SIZE".to_string(), "25".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ]);
        assert_eq!(layer.get(KEY_URL), Some("https://x"));
        assert_eq!(layer.get(KEY_PAGE_SIZE), Some("25"));
        assert_eq!(layer.get(&["home"]), None);
    }

    #[test]
    fn env_file_follows_dotenv_rules() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join(".env");
        fs::write(
            &path,
            "# comment\n\nJIRA_URL=\"https://a.example\"\nexport JIRA_EMAIL=\"a\\\"b@x\"\nJIRA_API_TOKEN=abc123 # prod token\nJIRA_BULK_PAGE_SIZE='25'\nUNRELATED=1\n",
        )
        .expect("write env");

        let layer = ConfigLayer::from_env_file(&path).expect("load env");
        assert_eq!(layer.get(KEY_URL), Some("https://a.example"));
        assert_eq!(layer.get(KEY_EMAIL), Some("a\"b@x"));
        assert_eq!(layer.get(KEY_TOKEN), Some("abc123"));
        assert_eq!(layer.get(KEY_PAGE_SIZE), Some("25"));
        assert_eq!(layer.redacted().get("api-token").map(String::as_str), Some("****c123"));
    }

    #[test]
    fn env_file_with_bad_line_is_a_config_error() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join(".env");
        fs::write(&path, "JIRA_URL=\"unterminated\n").expect("write env");
        let err = ConfigLayer::from_env_file(&path).unwrap_err();
        assert!(matches!(err, BulkEditError::Config(_)), "{err}");
    }

    #[test]
    fn yaml_nested_keys_flatten_with_dots() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            "jira:\n  url: https://y.example\nfields:\n  source: customfield_1\npage_size: 10\n",
        )
        .expect("write yaml");

        let layer = ConfigLayer::from_yaml(&path).expect("load yaml");
        assert_eq!(layer.get(KEY_URL), Some("https://y.example"));
        assert_eq!(layer.get(KEY_SOURCE), Some("customfield_1"));
        assert_eq!(layer.get(KEY_PAGE_SIZE), Some("10"));
    }

    #[test]
    fn later_layers_win() {
        let mut yaml = ConfigLayer::default();
        yaml.set("page-size", "10");
        let cli = CliOverrides {
            page_size: Some(5),
            strategy: Some(Strategy::OffsetWalk),
            ..CliOverrides::default()
        };
        let merged = ConfigLayer::merge_layers(&[default_config_layer(), yaml, cli.as_layer()]);
        let run = RunConfig::from_layer(&merged).expect("run config");
        assert_eq!(run.page_size, 5);
        assert_eq!(run.strategy, Strategy::OffsetWalk);
        assert_eq!(run.fields, FieldNames::default());
        assert_eq!(run.jql, DEFAULT_JQL);
    }

    #[test]
    fn store_config_reports_all_missing_credentials() {
        let err = StoreConfig::from_layer(&default_config_layer()).unwrap_err();
        match err {
            BulkEditError::MissingCredentials { missing } => {
                assert_eq!(missing, ["JIRA_URL", "JIRA_EMAIL", "JIRA_API_TOKEN"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn store_config_resolves() {
        let layer = ConfigLayer::merge_layers(&[default_config_layer(), credentials()]);
        let store = StoreConfig::from_layer(&layer).expect("store config");
        assert_eq!(store.base_url, "https://example.atlassian.net");
        assert_eq!(store.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn store_config_rejects_bad_url() {
        let mut layer = ConfigLayer::merge_layers(&[default_config_layer(), credentials()]);
        layer.set("url", "example.atlassian.net");
        assert!(matches!(
            StoreConfig::from_layer(&layer),
            Err(BulkEditError::Config(_))
        ));
    }

    #[test]
    fn run_config_rejects_page_size_out_of_range() {
        for bad in ["0", "1001", "many"] {
            let mut layer = default_config_layer();
            layer.set("page-size", bad);
            assert!(RunConfig::from_layer(&layer).is_err(), "{bad}");
        }
    }

    #[test]
    fn run_config_rejects_same_source_and_target() {
        let mut layer = default_config_layer();
        layer.set("target-field", DEFAULT_SOURCE_FIELD);
        assert!(RunConfig::from_layer(&layer).is_err());
    }

    #[test]
    fn redacted_masks_token() {
        let shown = credentials().redacted();
        assert_eq!(shown.get("api-token").map(String::as_str), Some("****3456"));
        assert_eq!(
            shown.get("email").map(String::as_str),
            Some("ops@example.com")
        );
        assert_eq!(redact("abc"), "****");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let sources = ConfigSources {
            config_file: Some(PathBuf::from("/nonexistent/jira-bulk-edit.yaml")),
            env_file: None,
        };
        let err = load_config(&sources, &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, BulkEditError::Config(_)));
    }

    #[test]
    fn query_spec_requests_all_fields() {
        let run = RunConfig::from_layer(&default_config_layer()).expect("run config");
        let spec = run.query_spec();
        assert_eq!(
            spec.fields,
            [DEFAULT_SOURCE_FIELD, DEFAULT_TARGET_FIELD, DEFAULT_SUMMARY_FIELD]
        );
        assert_eq!(spec.page_size, DEFAULT_PAGE_SIZE);
    }
}
