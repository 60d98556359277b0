use badge_service::config::{Config as BadgeServiceConfig, ValidationError};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_level")]
    pub level: String,
    pub sentry_dsn: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            sentry_dsn: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub badge_service: BadgeServiceConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }

    /// Reads `path` if given, applies environment overrides and validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };

        config.badge_service = config.badge_service.with_env_overrides(lookup)?;
        config.badge_service.validate()?;

        Ok(config)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            logging:
                level: debug
                sentry_dsn: https://key@sentry.example.com/1
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            badge_service:
                listener:
                    host: 0.0.0.0
                    port: 3000
                admin_listener:
                    host: 127.0.0.1
                    port: 3001
                snyk:
                    org_id: my-org
                    api_key: token abc
                badges:
                    logo: github
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::load_with(Some(tmp.path()), env(&[])).expect("load config");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.sentry_dsn.as_deref(),
            Some("https://key@sentry.example.com/1")
        );
        assert_eq!(
            config.metrics,
            Some(MetricsConfig {
                statsd_host: "127.0.0.1".into(),
                statsd_port: 8125,
            })
        );
        assert_eq!(config.badge_service.listener.port, 3000);
        assert_eq!(config.badge_service.snyk.org_id, "my-org");
        assert_eq!(config.badge_service.badges.logo.as_deref(), Some("github"));
    }

    #[test]
    fn env_only_config() {
        let config = Config::load_with(
            None,
            env(&[
                ("SNYK_ORG_ID", "my-org"),
                ("SNYK_API_KEY", "token abc"),
                ("FUNCTIONS_CUSTOMHANDLER_PORT", "7071"),
            ]),
        )
        .expect("load config");

        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.metrics, None);
        assert_eq!(config.badge_service.listener.port, 7071);
        assert_eq!(config.badge_service.snyk.api_key, "token abc");
    }

    #[test]
    fn env_overrides_file() {
        let yaml = r#"
            badge_service:
                snyk:
                    org_id: from-file
                    api_key: token abc
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::load_with(Some(tmp.path()), env(&[("SNYK_ORG_ID", "from-env")]))
            .expect("load config");

        assert_eq!(config.badge_service.snyk.org_id, "from-env");
    }

    #[test]
    fn missing_credentials() {
        let err = Config::load_with(None, env(&[("SNYK_ORG_ID", "my-org")])).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::MissingApiKey)
        ));
    }

    #[test]
    fn unreadable_and_malformed_files() {
        let err = Config::load_with(Some(Path::new("/nonexistent/badger.yaml")), env(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));

        let tmp = write_tmp_file("badge_service:\n  listener: not-a-map\n");
        let err = Config::load_with(Some(tmp.path()), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
