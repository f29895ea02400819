//! Configuration for the Tag Manager connector.
//!
//! The connector receives a ready-to-use OAuth bearer token; minting and
//! refreshing it is the job of whatever launches the connector.

use std::fmt;

use idsync_core::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://tagmanager.googleapis.com";

/// Configuration for the Tag Manager connector.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagManagerConfig {
    /// API base URL (scheme + host, no path).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth bearer token sent with every request.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    /// Only sync these account ids. Empty means every visible account.
    #[serde(default)]
    pub accounts: Vec<String>,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u32,

    /// Request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_connect_timeout_ms() -> u32 {
    10_000 // 10 seconds
}

const fn default_request_timeout_ms() -> u32 {
    60_000 // 60 seconds
}

impl Default for TagManagerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            accounts: Vec::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl fmt::Debug for TagManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagManagerConfig")
            .field("base_url", &self.base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("accounts", &self.accounts)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

fn invalid(message: impl Into<String>) -> SyncError {
    SyncError::InvalidConfig {
        message: message.into(),
    }
}

impl TagManagerConfig {
    /// Parse configuration from a JSON value.
    ///
    /// # Errors
    /// Returns `SyncError::InvalidConfig` if the value does not match.
    pub fn from_params(params: &serde_json::Value) -> SyncResult<Self> {
        serde_json::from_value(params.clone())
            .map_err(|e| invalid(format!("Invalid tagmanager configuration: {e}")))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Returns `SyncError::InvalidConfig` if the text does not match.
    pub fn from_toml_str(raw: &str) -> SyncResult<Self> {
        toml::from_str(raw).map_err(|e| invalid(format!("Invalid tagmanager configuration: {e}")))
    }

    /// Validate the configuration and normalize `base_url`.
    ///
    /// # Errors
    /// Returns `SyncError::InvalidConfig` if validation fails.
    pub fn validate(&mut self) -> SyncResult<()> {
        self.base_url = normalize_base_url(&self.base_url)?;

        match self.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => {}
            _ => return Err(invalid("access_token is required")),
        }

        if let Some(bad) = self
            .accounts
            .iter()
            .find(|id| id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(invalid(format!("account id '{bad}' must be numeric")));
        }

        if self.connect_timeout_ms == 0 || self.connect_timeout_ms > 300_000 {
            return Err(invalid(
                "Connect timeout must be between 1ms and 300000ms",
            ));
        }

        if self.request_timeout_ms == 0 || self.request_timeout_ms > 600_000 {
            return Err(invalid(
                "Request timeout must be between 1ms and 600000ms",
            ));
        }

        Ok(())
    }

    /// Check whether an account passes the configured allow-list.
    #[must_use]
    pub fn includes_account(&self, account_id: &str) -> bool {
        self.accounts.is_empty() || self.accounts.iter().any(|id| id == account_id)
    }
}

fn normalize_base_url(base_url: &str) -> SyncResult<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(invalid("base_url cannot be empty"));
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| invalid(format!("Invalid base_url: {e}")))?;

    if !matches!(parsed.scheme(), "https" | "http") {
        return Err(invalid("base_url must be http or https"));
    }

    if parsed.host_str().is_none() {
        return Err(invalid("base_url must include a host"));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> TagManagerConfig {
        TagManagerConfig {
            access_token: Some("ya29.token".into()),
            ..TagManagerConfig::default()
        }
    }

    #[test]
    fn test_config_from_params_defaults() {
        let config = TagManagerConfig::from_params(&json!({
            "access_token": "ya29.token",
            "accounts": ["123", "456"]
        }))
        .unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.accounts, vec!["123", "456"]);
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.request_timeout_ms, 60_000);
    }

    #[test]
    fn test_config_from_toml() {
        let config = TagManagerConfig::from_toml_str(
            r#"
            base_url = "http://localhost:8080/"
            access_token = "t"
            accounts = ["42"]
            request_timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.accounts, vec!["42"]);
        assert_eq!(config.request_timeout_ms, 5000);
    }

    #[test]
    fn test_config_from_params_rejects_wrong_shape() {
        let err = TagManagerConfig::from_params(&json!({ "accounts": "123" })).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig { .. }));
    }

    #[test]
    fn test_validate_normalizes_trailing_slash() {
        let mut config = TagManagerConfig {
            base_url: "http://127.0.0.1:9000/".into(),
            ..valid()
        };
        config.validate().unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_validate_requires_token() {
        let mut config = TagManagerConfig::default();
        assert!(config.validate().is_err());

        let mut blank = TagManagerConfig {
            access_token: Some("   ".into()),
            ..TagManagerConfig::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scheme_and_accounts() {
        let mut config = TagManagerConfig {
            base_url: "ftp://tagmanager.example".into(),
            ..valid()
        };
        assert!(config.validate().is_err());

        let mut config = TagManagerConfig {
            accounts: vec!["abc".into()],
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_timeouts() {
        let mut config = TagManagerConfig {
            request_timeout_ms: 0,
            ..valid()
        };
        assert!(config.validate().is_err());

        let mut config = TagManagerConfig {
            connect_timeout_ms: 300_001,
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_includes_account() {
        let open = valid();
        assert!(open.includes_account("999"));

        let filtered = TagManagerConfig {
            accounts: vec!["123".into()],
            ..valid()
        };
        assert!(filtered.includes_account("123"));
        assert!(!filtered.includes_account("999"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("ya29"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_token_not_serialized() {
        let value = serde_json::to_value(valid()).unwrap();
        assert!(value.get("access_token").is_none());
    }
}
