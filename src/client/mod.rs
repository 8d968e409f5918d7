//! Analytics backend client.
//!
//! Issues one GET per metric kind with all selected project keys joined into
//! a single query parameter, and decodes the response into per-project
//! metric series.

pub mod decode;

use crate::error::FetchError;
use crate::models::{ComparisonPayload, MetricKind, ProjectKey};
use std::time::Duration;
use tracing::{debug, info};

pub use decode::{decode_body, decode_payload};

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `http://localhost:8000`.
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Query parameter carrying the comma-joined project keys.
    pub project_param: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 30,
            project_param: "key".to_string(),
        }
    }
}

impl From<&crate::config::BackendConfig> for ClientConfig {
    fn from(config: &crate::config::BackendConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout_seconds: config.timeout_seconds,
            project_param: config.project_param.clone(),
        }
    }
}

/// HTTP client for the comparison endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl BackendClient {
    /// Create a client for the configured backend.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Full URL of the comparison endpoint for `kind`.
    pub fn endpoint_url(&self, kind: MetricKind) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            kind.endpoint_path()
        )
    }

    /// Fetch the comparison payload of one metric kind for all `projects`.
    pub async fn fetch_comparison(
        &self,
        kind: MetricKind,
        projects: &[ProjectKey],
    ) -> Result<ComparisonPayload, FetchError> {
        let url = self.endpoint_url(kind);
        let keys = join_keys(projects);

        debug!("GET {}?{}={}", url, self.config.project_param, keys);

        let response = self
            .http_client
            .get(&url)
            .query(&[(self.config.project_param.as_str(), keys.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    FetchError::Connect(self.config.base_url.clone())
                } else {
                    FetchError::Transport(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let payload = decode_body(kind, &body)?;

        info!(
            "Fetched {} comparison for {} project(s)",
            kind,
            payload.projects.len()
        );

        Ok(payload)
    }
}

/// Comma-join project keys for the query string.
pub fn join_keys(projects: &[ProjectKey]) -> String {
    projects
        .iter()
        .map(ProjectKey::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
