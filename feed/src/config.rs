use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Notion refuses page sizes above this.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Notion API version cannot be empty")]
    EmptyNotionVersion,

    #[error("Credential environment variable name cannot be empty")]
    EmptyTokenEnv,

    #[error("Page size must be between 1 and 100, got {0}")]
    InvalidPageSize(u32),

    #[error("Record cap cannot be 0")]
    InvalidMaxRecords,

    #[error("Notion base URL cannot be a base for paths: {0}")]
    InvalidBaseUrl(Url),
}

/// Feed service configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Public listener serving the feed endpoint
    pub listener: Listener,
    /// Listener for health and readiness probes
    #[serde(default = "Listener::admin_default")]
    pub admin_listener: Listener,
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Reported by the liveness probe of the feed endpoint
    #[serde(default = "default_version")]
    pub version: String,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.notion.validate()?;
        Ok(())
    }
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    pub port: u16,
}

impl Listener {
    fn admin_default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3001,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Connection settings for the Notion query API
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotionConfig {
    pub base_url: Url,
    /// Sent as the `Notion-Version` header
    pub version: String,
    /// Name of the environment variable holding the integration token
    pub token_env: String,
    pub page_size: u32,
    /// Pagination stops once this many records have been collected
    pub max_records: usize,
    /// Per-page request timeout. No timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl NotionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version.trim().is_empty() {
            return Err(ValidationError::EmptyNotionVersion);
        }
        if self.token_env.trim().is_empty() {
            return Err(ValidationError::EmptyTokenEnv);
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::InvalidPageSize(self.page_size));
        }
        if self.max_records == 0 {
            return Err(ValidationError::InvalidMaxRecords);
        }
        if self.base_url.cannot_be_a_base() {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        NotionConfig {
            base_url: Url::parse("https://api.notion.com/v1").expect("static URL is valid"),
            version: "2022-06-28".into(),
            token_env: "NOTION_TOKEN".into(),
            page_size: MAX_PAGE_SIZE,
            max_records: 500,
            timeout_secs: None,
        }
    }
}

/// Optional parts of the feed contract. Older front-ends expect neither.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Capabilities {
    /// Expose the `Format` property on items and the `formats` list on the envelope
    pub format: bool,
    /// Answer `ping=1` with a liveness payload
    pub ping: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            format: true,
            ping: true,
        }
    }
}

/// Bearer token for the Notion API. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
listener:
    host: "0.0.0.0"
    port: 3000
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.admin_listener.port, 3001);
        assert_eq!(config.notion, NotionConfig::default());
        assert_eq!(config.notion.base_url.as_str(), "https://api.notion.com/v1");
        assert_eq!(config.notion.max_records, 500);
        assert_eq!(config.capabilities, Capabilities::default());
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
listener:
    host: "0.0.0.0"
    port: 8080
admin_listener:
    host: "127.0.0.1"
    port: 8081
notion:
    base_url: "http://127.0.0.1:9000/v1"
    version: "2025-09-03"
    token_env: GALLERY_NOTION_TOKEN
    page_size: 50
    max_records: 200
    timeout_secs: 10
capabilities:
    format: false
version: "2.1"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.notion.version, "2025-09-03");
        assert_eq!(config.notion.token_env, "GALLERY_NOTION_TOKEN");
        assert_eq!(config.notion.page_size, 50);
        assert_eq!(config.notion.timeout_secs, Some(10));
        assert!(!config.capabilities.format);
        assert!(config.capabilities.ping);
        assert_eq!(config.version, "2.1");
    }

    #[test]
    fn test_validation_errors() {
        let base_config: Config =
            serde_yaml::from_str("listener: {host: \"0.0.0.0\", port: 3000}").unwrap();

        let mut config = base_config.clone();
        config.admin_listener.port = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidPort
        ));

        let mut config = base_config.clone();
        config.notion.page_size = 101;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidPageSize(101)
        ));

        let mut config = base_config.clone();
        config.notion.max_records = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidMaxRecords
        ));

        let mut config = base_config.clone();
        config.notion.version = "".into();
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::EmptyNotionVersion
        ));

        let mut config = base_config;
        config.notion.base_url = Url::parse("mailto:feed@example.com").unwrap();
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidBaseUrl(_)
        ));
    }

    #[test]
    fn test_deserialization_errors() {
        // Invalid URL
        assert!(
            serde_yaml::from_str::<Config>(
                r#"
listener: {host: "0.0.0.0", port: 3000}
notion: {base_url: "not-a-url"}
"#
            )
            .is_err()
        );

        // Missing listener
        assert!(serde_yaml::from_str::<Config>("version: \"1\"").is_err());
    }

    #[test]
    fn test_credential_is_redacted() {
        let credential = Credential::new("secret_abc");
        assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
        assert_eq!(credential.expose(), "secret_abc");
    }
}
