//! Jira REST client.
//!
//! Blocking HTTP over `ureq`; each call is a single request/response with no
//! retry at this layer.

use super::{IssueStore, SearchRequest};
use crate::config::StoreConfig;
use crate::error::{BulkEditError, Result};
use crate::model::{Batch, FieldNames, FieldUpdate, Issue, LabelSet};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{debug, info};

// Offset-paged search. Jira Cloud is retiring it for `/rest/api/3/search/jql`,
// which pages by `nextPageToken` and needs a cursor paginator.
const SEARCH_PATH: &str = "/rest/api/2/search";
const ISSUE_PATH: &str = "/rest/api/2/issue";
const MYSELF_PATH: &str = "/rest/api/2/myself";
const USER_AGENT: &str = concat!("jira-bulk-edit/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    key: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Myself {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email_address: Option<String>,
}

/// Jira Cloud / Data Center store.
pub struct JiraStore {
    agent: ureq::Agent,
    base_url: String,
    auth_header: String,
    fields: FieldNames,
}

impl JiraStore {
    /// Build a client from resolved configuration.
    #[must_use]
    pub fn new(config: &StoreConfig, fields: FieldNames) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build();
        let credentials = format!("{}:{}", config.email, config.api_token);
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {}", BASE64.encode(credentials)),
            fields,
        }
    }

    /// Verify credentials before the run starts.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the store rejects the credentials or
    /// cannot be reached.
    pub fn connect(&self) -> Result<()> {
        let endpoint = self.endpoint(MYSELF_PATH);
        info!("Connecting to Jira at {}...", self.base_url);
        let response = self
            .agent
            .get(&endpoint)
            .set("Authorization", &self.auth_header)
            .set("Accept", "application/json")
            .call();
        let body = read_body("GET", &endpoint, response)?;
        let me: Myself = serde_json::from_str(&body)
            .map_err(|e| BulkEditError::malformed(&endpoint, e.to_string()))?;
        info!(
            user = me.display_name.as_deref().unwrap_or("unknown"),
            email = me.email_address.as_deref().unwrap_or(""),
            "Successfully connected to Jira"
        );
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl IssueStore for JiraStore {
    fn search(&mut self, request: &SearchRequest) -> Result<Batch> {
        let endpoint = self.endpoint(SEARCH_PATH);
        debug!(
            offset = request.offset,
            limit = request.limit,
            "POST {endpoint}"
        );
        let response = self
            .agent
            .post(&endpoint)
            .set("Authorization", &self.auth_header)
            .set("Accept", "application/json")
            .send_json(json!({
                "jql": request.query,
                "startAt": request.offset,
                "maxResults": request.limit,
                "fields": request.fields,
            }));
        let body = read_body("POST", &endpoint, response)?;
        parse_search_response(&body, &self.fields, &endpoint)
    }

    fn update(&mut self, key: &str, update: &FieldUpdate) -> Result<()> {
        let endpoint = format!("{}/{key}", self.endpoint(ISSUE_PATH));
        debug!(field = %update.field, values = %update.values, "PUT {endpoint}");
        let mut fields = Map::new();
        fields.insert(update.field.clone(), json!(update.values.as_slice()));
        let response = self
            .agent
            .put(&endpoint)
            .set("Authorization", &self.auth_header)
            .set("Accept", "application/json")
            .send_json(json!({ "fields": fields }));
        read_body("PUT", &endpoint, response)?;
        Ok(())
    }
}

/// Turn a `ureq` outcome into a body or a transport error.
fn read_body(
    method: &str,
    endpoint: &str,
    response: std::result::Result<ureq::Response, ureq::Error>,
) -> Result<String> {
    match response {
        Ok(response) => response.into_string().map_err(|e| BulkEditError::Http {
            endpoint: endpoint.to_string(),
            reason: format!("failed to read response body: {e}"),
        }),
        Err(ureq::Error::Status(status, response)) => Err(BulkEditError::Transport {
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            status,
            body: response.into_string().unwrap_or_default(),
        }),
        Err(ureq::Error::Transport(transport)) => Err(BulkEditError::Http {
            endpoint: endpoint.to_string(),
            reason: transport.to_string(),
        }),
    }
}

/// Map a search payload onto typed issues.
pub(crate) fn parse_search_response(
    body: &str,
    fields: &FieldNames,
    endpoint: &str,
) -> Result<Batch> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| BulkEditError::malformed(endpoint, e.to_string()))?;

    let issues = response
        .issues
        .into_iter()
        .map(|raw| issue_from_fields(raw, fields, endpoint))
        .collect::<Result<Vec<_>>>()?;

    Ok(Batch::new(issues, response.total))
}

fn issue_from_fields(raw: RawIssue, names: &FieldNames, endpoint: &str) -> Result<Issue> {
    let RawIssue { key, fields } = raw;

    let source_value = fields
        .get(&names.source)
        .and_then(Value::as_str)
        .map(str::to_string);

    let target_values = match fields.get(&names.target) {
        None | Some(Value::Null) => LabelSet::new(),
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
        Some(other) => {
            return Err(BulkEditError::malformed(
                endpoint,
                format!(
                    "{key}: field {} is not a list (got {other})",
                    names.target
                ),
            ));
        }
    };

    let summary = fields
        .get(&names.summary)
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Issue {
        key,
        source_value,
        target_values,
        summary,
    })
}
