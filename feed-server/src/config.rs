use feed::config::{Config as FeedConfig, ValidationError};
use feed::Credential;
use serde::Deserialize;
use std::fs::File;

#[derive(Debug, Deserialize)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

fn default_metrics_prefix() -> String {
    "feed".into()
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Errors are reported to Sentry when set
    pub sentry_dsn: Option<String>,
    pub environment: Option<String>,
    /// Default filter directive, `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Deserialize)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub feed: FeedConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data: Config = serde_yaml::from_reader(file)?;
        data.feed.validate()?;

        Ok(data)
    }

    /// Reads the Notion token from the environment variable named in the config.
    pub fn credential(&self) -> Result<Credential, ConfigError> {
        self.credential_from(|name| std::env::var(name).ok())
    }

    fn credential_from<F>(&self, lookup: F) -> Result<Credential, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = &self.feed.notion.token_env;
        match lookup(name) {
            Some(token) if !token.trim().is_empty() => Ok(Credential::new(token.trim())),
            _ => Err(ConfigError::MissingCredential(name.clone())),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("environment variable {0} with the Notion token is not set")]
    MissingCredential(String),
}
