//! Client configuration
//!
//! Loaded with the `config` crate: an optional file layered under
//! `MOBANK__`-prefixed environment variables (`MOBANK__API__BASE_URL`,
//! `MOBANK__REFRESH__CHECK_INTERVAL_SECS`, ...).

use crate::error::CoreResult;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "MOBANK";

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Remote banking API
    pub api: ApiConfig,
    /// Background token refresh
    pub refresh: RefreshConfig,
    /// Paths the session layer redirects to
    pub routes: RouteConfig,
    /// Credential persistence
    pub storage: StorageConfig,
    pub logging: LogConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Background refresh configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// How often the access token expiry is inspected
    pub check_interval_secs: u64,
    /// Refresh once the token expires within this many minutes
    pub threshold_minutes: i64,
}

/// Navigation targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub login_path: String,
    /// Default view after signing in
    pub home_path: String,
}

/// Where credentials are persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub file_name: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 60,
            threshold_minutes: crate::jwt::DEFAULT_EXPIRY_THRESHOLD_MINUTES,
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            home_path: "/dashboard".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = directories::ProjectDirs::from("com", "mobank", "mobank").map_or_else(
            || PathBuf::from(".mobank"),
            |dirs| dirs.data_dir().to_path_buf(),
        );

        Self {
            data_dir,
            file_name: "session.json".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ApiConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RefreshConfig {
    pub const fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

impl StorageConfig {
    /// Full path of the credential file
    pub fn file_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

impl SessionConfig {
    /// Load configuration from file, overridden by environment variables
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from defaults and environment variables
    pub fn from_env() -> CoreResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(environment())
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        validators::validate_url(&self.api.base_url, "api.base_url")?;
        validators::validate_positive(self.api.timeout_secs, "api.timeout_secs")?;
        validators::validate_positive(self.refresh.check_interval_secs, "refresh.check_interval_secs")?;
        if self.refresh.threshold_minutes < 0 {
            return Err(ConfigError::Message(
                "refresh.threshold_minutes: cannot be negative".to_string(),
            ));
        }
        validators::validate_route(&self.routes.login_path, "routes.login_path")?;
        validators::validate_route(&self.routes.home_path, "routes.home_path")?;
        validators::validate_not_empty(&self.storage.file_name, "storage.file_name")?;
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

/// Common validation helpers
pub mod validators {
    use config::ConfigError;

    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::Message(format!("{field}: cannot be empty")));
        }
        Ok(())
    }

    /// Validate URL format
    pub fn validate_url(url: &str, field: &str) -> Result<(), ConfigError> {
        url::Url::parse(url)
            .map_err(|e| ConfigError::Message(format!("{field}: invalid URL - {e}")))?;
        Ok(())
    }

    /// Validate that a duration-like value is non-zero
    pub fn validate_positive(value: u64, field: &str) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::Message(format!("{field}: must be greater than 0")));
        }
        Ok(())
    }

    /// Validate an in-app absolute route path
    pub fn validate_route(path: &str, field: &str) -> Result<(), ConfigError> {
        if !path.starts_with('/') {
            return Err(ConfigError::Message(format!("{field}: must start with '/'")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(15));
        assert_eq!(config.refresh.check_interval(), Duration::from_secs(60));
        assert_eq!(config.refresh.threshold_minutes, 5);
        assert_eq!(config.routes.login_path, "/login");
        assert_eq!(config.routes.home_path, "/dashboard");
        assert!(config.storage.file_path().ends_with("session.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://bank.example.com/api"

[refresh]
check_interval_secs = 30
"#
        )
        .unwrap();

        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://bank.example.com/api");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.refresh.check_interval_secs, 30);
        assert_eq!(config.routes.home_path, "/dashboard");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SessionConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.refresh.check_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.routes.login_path = "login".to_string();
        assert!(config.validate().is_err());
    }
}
