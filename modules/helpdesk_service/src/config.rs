//! Configuration for the helpdesk service and its clients

use anyhow::Context;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::ServiceConfig;

/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "HELPDESK_";

/// Helpdesk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection URL (`postgres://…` or `sqlite::memory:`)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Address the RPC endpoint listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// HMAC secret used to verify bearer tokens
    #[serde(default)]
    pub jwt_secret: String,

    /// Expected `aud` claim
    #[serde(default = "default_jwt_audience")]
    pub jwt_audience: String,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// Settings for the HTTP façade and auth client
    #[serde(default)]
    pub client: ClientConfig,
}

/// Remote client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the RPC endpoint; `/rpc` is appended
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the auth service (`…/auth/v1`)
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Public API key sent as the `apikey` header
    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            bind_addr: default_bind_addr(),
            jwt_secret: String::new(),
            jwt_audience: default_jwt_audience(),
            log_level: default_log_level(),
            log_json: false,
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            client: ClientConfig::default(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth_url: default_auth_url(),
            anon_key: String::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Config {
    /// Defaults, then the YAML file (when given and present), then
    /// `HELPDESK_*` environment variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract().context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            anyhow::bail!("page sizes must be positive");
        }
        if self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size,
                self.max_page_size
            );
        }
        Ok(())
    }

    pub fn service(&self) -> ServiceConfig {
        ServiceConfig {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }
}

impl ClientConfig {
    /// HTTP client shared by the façade and the auth client
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("failed to build HTTP client")
    }
}

fn default_database_url() -> String {
    "sqlite::memory:".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8087".to_string()
}

fn default_jwt_audience() -> String {
    "authenticated".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_size() -> u64 {
    50
}

fn default_max_page_size() -> u64 {
    200
}

fn default_api_url() -> String {
    "http://127.0.0.1:8087".to_string()
}

fn default_auth_url() -> String {
    "http://127.0.0.1:9999".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_consistent() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.service().default_page_size, 50);
        assert_eq!(config.client.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_url: \"postgres://localhost/helpdesk\"\nmax_page_size: 100\nclient:\n  api_url: \"https://api.example.com\"\n  request_timeout: \"5s\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.database_url, "postgres://localhost/helpdesk");
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.client.api_url, "https://api.example.com");
        assert_eq!(config.client.request_timeout, Duration::from_secs(5));
        assert_eq!(config.bind_addr, "127.0.0.1:8087");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "databse_url: \"typo\"").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/helpdesk.yaml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn default_page_size_cannot_exceed_max() {
        let config = Config {
            default_page_size: 500,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
