use crate::config::ValidationError;
use thiserror::Error;

/// Errors that stop the badge service. Per-request failures never end up
/// here, they are turned into an `unknown` badge instead.
#[derive(Error, Debug)]
pub enum BadgeServiceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
}
