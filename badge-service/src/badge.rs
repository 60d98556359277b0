use crate::config::BadgesConfig;
use http::StatusCode;
use hyper::body::Bytes;
use std::time::Duration;
use url::Url;

pub const LABEL: &str = "vulnerabilities";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeState {
    /// No data: invalid request or the project list could not be fetched
    Unknown,
    Clean,
    Vulnerable(u64),
}

impl BadgeState {
    pub fn classify(total: u64) -> Self {
        match total {
            0 => BadgeState::Clean,
            n => BadgeState::Vulnerable(n),
        }
    }

    pub fn value(&self) -> String {
        match self {
            BadgeState::Unknown => "unknown".to_string(),
            BadgeState::Clean => "0".to_string(),
            BadgeState::Vulnerable(n) => n.to_string(),
        }
    }

    pub fn color(&self) -> BadgeColor {
        match self {
            BadgeState::Unknown => BadgeColor::Neutral,
            BadgeState::Clean => BadgeColor::Success,
            BadgeState::Vulnerable(_) => BadgeColor::Danger,
        }
    }

    /// Metric tag
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeState::Unknown => "unknown",
            BadgeState::Clean => "clean",
            BadgeState::Vulnerable(_) => "vulnerable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Neutral,
    Success,
    Danger,
}

impl BadgeColor {
    /// shields.io color name
    pub const fn as_str(&self) -> &'static str {
        match self {
            BadgeColor::Neutral => "inactive",
            BadgeColor::Success => "brightgreen",
            BadgeColor::Danger => "red",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("request to badge service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("badge service responded with {0}")]
    Status(StatusCode),
}

/// Resolves badge states to shields.io URLs and fetches the rendered image.
#[derive(Clone)]
pub struct BadgeRenderer {
    client: reqwest::Client,
    base_url: Url,
    logo: Option<String>,
    timeout: Duration,
}

impl BadgeRenderer {
    pub fn new(client: reqwest::Client, config: &BadgesConfig) -> Self {
        BadgeRenderer {
            client,
            base_url: config.base_url.clone(),
            logo: config.logo.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// `{base_url}/badge/vulnerabilities-{value}-{color}[?logo={logo}]`
    pub fn badge_url(&self, state: BadgeState) -> Url {
        let mut url = self.base_url.clone();
        let badge = format!("{LABEL}-{}-{}", state.value(), state.color().as_str());

        // base_url is validated to be a base URL on startup
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["badge", badge.as_str()]);
        }
        if let Some(logo) = &self.logo {
            url.query_pairs_mut().append_pair("logo", logo);
        }
        url
    }

    /// Fetches the rendered badge. The body is fully read, so a failure never
    /// leaves a partial image behind.
    pub async fn render(&self, url: &Url) -> Result<Bytes, RenderError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(RenderError::Status(response.status()));
        }

        Ok(response.bytes().await?)
    }
}
