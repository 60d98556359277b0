use crate::config::{SnykConfig, ValidationError};
use crate::metrics_defs::{SNYK_DURATION, SNYK_ERRORS};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::time::{Duration, Instant};
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum SnykError {
    #[error("request to snyk failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("snyk responded with {0}")]
    Status(StatusCode),
    #[error("could not parse snyk response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl SnykError {
    pub fn kind(&self) -> &'static str {
        match self {
            SnykError::Transport(_) => "transport",
            SnykError::Status(_) => "status",
            SnykError::Malformed(_) => "malformed",
        }
    }
}

/// Body of `GET /org/{org_id}/projects`. Entries that are not objects are dropped.
#[derive(Deserialize, Debug)]
pub struct ProjectList {
    #[serde(deserialize_with = "lenient_entries")]
    pub projects: Vec<Project>,
}

/// A tracked project. Fields that are missing or have an unexpected type
/// decode as `None`.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub issue_counts_by_severity: Option<IssueCounts>,
}

impl Project {
    /// Sum over all severities, 0 when the project carries no counts.
    pub fn issue_total(&self) -> u64 {
        self.issue_counts_by_severity
            .map(|counts| counts.total())
            .unwrap_or(0)
    }
}

/// Not every plan reports `critical`, absent severities count as 0.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IssueCounts {
    #[serde(default, deserialize_with = "lenient")]
    pub critical: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub high: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub medium: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub low: Option<u64>,
}

impl IssueCounts {
    pub fn total(&self) -> u64 {
        [self.critical, self.high, self.medium, self.low]
            .into_iter()
            .flatten()
            .fold(0, u64::saturating_add)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

/// Lists the projects of the configured Snyk organization.
#[derive(Clone)]
pub struct SnykClient {
    client: reqwest::Client,
    projects_url: Url,
    authorization: HeaderValue,
    timeout: Duration,
}

impl SnykClient {
    pub fn new(client: reqwest::Client, config: &SnykConfig) -> Result<Self, ValidationError> {
        Ok(SnykClient {
            client,
            projects_url: config.projects_url()?,
            authorization: config.authorization()?,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, SnykError> {
        let started = Instant::now();
        let result = self.fetch_projects().await;
        shared::histogram!(SNYK_DURATION).record(started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            shared::counter!(SNYK_ERRORS, "kind" => e.kind()).increment(1);
        }
        result
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>, SnykError> {
        let response = self
            .client
            .get(self.projects_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, self.authorization.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(SnykError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let list: ProjectList = serde_json::from_slice(&body)?;

        tracing::debug!(projects = list.projects.len(), "Fetched snyk projects");
        Ok(list.projects)
    }
}
