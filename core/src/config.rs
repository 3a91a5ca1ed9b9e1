//! Client configuration.
//!
//! Can be loaded from TOML or constructed programmatically:
//!
//! ```toml
//! base_url = "https://api.example-shipping.test/v2"
//! app_key = "3f1c..."
//! timeout_secs = 15
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,

    /// Application key issued by the provider, sent in every request body.
    #[serde(default)]
    pub app_key: Option<String>,

    /// Session identifier from a previous login.
    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

pub(crate) const REDACTED: &str = "<redacted>";

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("app_key", &self.app_key.as_ref().map(|_| REDACTED))
            .field("session_id", &self.session_id.as_ref().map(|_| REDACTED))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            app_key: None,
            session_id: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_app_key(mut self, app_key: impl Into<String>) -> Self {
        self.app_key = Some(app_key.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ApiError> {
        let config: Self = toml::from_str(text).map_err(|e| ApiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ApiError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ApiError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_defaults_apply() {
        let config = ClientConfig::from_toml_str(r#"base_url = "https://api.test""#).unwrap();
        assert_eq!(config.base_url, "https://api.test");
        assert!(config.app_key.is_none());
        assert!(config.session_id.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn toml_reads_all_fields() {
        let text = r#"
            base_url = "http://localhost:3000"
            app_key = "key-1"
            session_id = "s-1"
            timeout_secs = 5
        "#;
        let config = ClientConfig::from_toml_str(text).unwrap();
        assert_eq!(
            config,
            ClientConfig::new("http://localhost:3000")
                .with_app_key("key-1")
                .with_session("s-1")
                .with_timeout(Duration::from_secs(5))
        );
    }

    #[test]
    fn rejects_relative_base_url() {
        let err = ClientConfig::from_toml_str(r#"base_url = "api.test""#).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ClientConfig::from_toml_str("base_url = \"https://a\"\ntimeout_secs = 0").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let config = ClientConfig::new("https://api.test")
            .with_app_key("key-secret")
            .with_session("session-secret");
        let shown = format!("{config:?}");
        assert!(shown.contains("https://api.test"));
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains("key-secret"));
        assert!(!shown.contains("session-secret"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = ClientConfig::from_file("/nonexistent/shipping.toml").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
