use http::HeaderValue;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SNYK_API_URL: &str = "https://snyk.io/api/v1";
pub const DEFAULT_BADGE_BASE_URL: &str = "https://img.shields.io";
pub const DEFAULT_LOGO: &str = "snyk";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_ORG_ID: &str = "SNYK_ORG_ID";
pub const ENV_API_KEY: &str = "SNYK_API_KEY";
pub const ENV_PORT: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Invalid port override in FUNCTIONS_CUSTOMHANDLER_PORT: {0}")]
    InvalidPortOverride(String),

    #[error("Snyk organization id is not set (config `snyk.org_id` or SNYK_ORG_ID)")]
    MissingOrgId,

    #[error("Snyk API key is not set (config `snyk.api_key` or SNYK_API_KEY)")]
    MissingApiKey,

    #[error("Snyk API key is not a valid header value")]
    InvalidApiKey,

    #[error("Timeout for {0} cannot be 0")]
    InvalidTimeout(&'static str),

    #[error("URL cannot be used as a base: {0}")]
    InvalidUrl(Url),
}

/// Badge service configuration
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for badge requests
    #[serde(default)]
    pub listener: Listener,
    /// Optional listener for `/health` and `/ready`
    #[serde(default)]
    pub admin_listener: Option<Listener>,
    #[serde(default)]
    pub snyk: SnykConfig,
    #[serde(default)]
    pub badges: BadgesConfig,
}

impl Config {
    /// Applies the process environment on top of the file configuration.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`. Empty values are
    /// treated as unset.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(org_id) = lookup(ENV_ORG_ID) {
            self.snyk.org_id = org_id;
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.snyk.api_key = api_key;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.listener.port = port
                .parse()
                .map_err(|_| ValidationError::InvalidPortOverride(port))?;
        }

        Ok(self)
    }

    /// Validates the badge service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        if let Some(admin_listener) = &self.admin_listener {
            admin_listener.validate()?;
        }

        self.snyk.validate()?;
        self.badges.validate()?;

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Credentials and endpoint of the Snyk API
#[derive(Clone, Deserialize, PartialEq)]
pub struct SnykConfig {
    #[serde(default = "default_snyk_api_url")]
    pub api_url: Url,
    #[serde(default)]
    pub org_id: String,
    /// Sent verbatim as the `Authorization` header, e.g. `token <key>`
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SnykConfig {
    fn default() -> Self {
        SnykConfig {
            api_url: default_snyk_api_url(),
            org_id: String::new(),
            api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for SnykConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnykConfig")
            .field("api_url", &self.api_url.as_str())
            .field("org_id", &self.org_id)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SnykConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.org_id.is_empty() {
            return Err(ValidationError::MissingOrgId);
        }
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("snyk"));
        }
        self.authorization()?;
        self.projects_url()?;
        Ok(())
    }

    /// `{api_url}/org/{org_id}/projects`
    pub fn projects_url(&self) -> Result<Url, ValidationError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ValidationError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(["org", self.org_id.as_str(), "projects"]);
        Ok(url)
    }

    pub fn authorization(&self) -> Result<HeaderValue, ValidationError> {
        let mut value =
            HeaderValue::from_str(&self.api_key).map_err(|_| ValidationError::InvalidApiKey)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Where badge images are rendered
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BadgesConfig {
    #[serde(default = "default_badge_base_url")]
    pub base_url: Url,
    /// shields.io logo name, `null` disables the logo
    #[serde(default = "default_logo")]
    pub logo: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BadgesConfig {
    fn default() -> Self {
        BadgesConfig {
            base_url: default_badge_base_url(),
            logo: default_logo(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BadgesConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.cannot_be_a_base() {
            return Err(ValidationError::InvalidUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("badges"));
        }
        Ok(())
    }
}

fn default_snyk_api_url() -> Url {
    Url::parse(DEFAULT_SNYK_API_URL).expect("default snyk url is valid")
}

fn default_badge_base_url() -> Url {
    Url::parse(DEFAULT_BADGE_BASE_URL).expect("default badge url is valid")
}

fn default_logo() -> Option<String> {
    Some(DEFAULT_LOGO.to_string())
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
