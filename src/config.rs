//! Configuration for the API client.
//!
//! [`ClientConfig`] holds the settings passed through to the underlying HTTP
//! client. [`Config`] is the file format read by the `rbxweb-login` binary,
//! loaded with [`Config::load`] from YAML with environment variable overrides.
//!
//! # Configuration File Format
//!
//! ```yaml
//! client:
//!   # Domain every service subdomain is resolved against
//!   base_domain: "roblox.com"
//!   # User agent sent with every request
//!   user_agent: "rbxweb/0.1.0"
//!   # Request timeout in seconds, no timeout when omitted
//!   timeout: 30
//!   # Proxy used for every request
//!   proxy: "http://127.0.0.1:8080"
//!
//! # Seconds between two polls of a quick login token status
//! poll_interval: 4
//! ```
//!
//! # Environment Variable Overrides
//!
//! Any value can be overridden with the `RBXWEB_` prefix, nested keys being
//! separated by `__`:
//!
//! ```bash
//! export RBXWEB_CLIENT__BASE_DOMAIN="roblox.com"
//! export RBXWEB_POLL_INTERVAL=2
//! ```

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

/// Default domain of the web API.
pub const DEFAULT_BASE_DOMAIN: &str = "roblox.com";
/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("rbxweb/", env!("CARGO_PKG_VERSION"));

/// Settings of a [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Domain requests are sent to, prefixed by the service subdomain.
    pub base_domain: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Timeout of a whole exchange, in seconds.
    ///
    /// `None` leaves the underlying client without timeout.
    pub timeout: Option<u64>,
    /// Proxy URL used for every request.
    pub proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_domain: DEFAULT_BASE_DOMAIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            proxy: None,
        }
    }
}

/// Root configuration of the `rbxweb-login` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Client settings
    #[serde(default)]
    pub client: ClientConfig,
    /// Seconds between two polls of a quick login token status
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

fn default_poll_interval() -> u64 {
    4
}

impl Default for Config {
    fn default() -> Self {
        Config {
            client: ClientConfig::default(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl Config {
    /// Load the configuration from a YAML file, then apply `RBXWEB_`
    /// environment overrides.
    ///
    /// Missing values fall back to their defaults. A missing file is not an
    /// error, so the configuration can be given through the environment only.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rbxweb::config::Config;
    ///
    /// let config = Config::load("config.yaml").unwrap();
    /// println!("base domain: {}", config.client.base_domain);
    /// ```
    pub fn load(path: &str) -> Result<Config, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("RBXWEB_").split("__"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_load_full_config() {
        let file = write_config(
            r#"
client:
  base_domain: "example.com"
  user_agent: "tests/1.0"
  timeout: 10
  proxy: "http://127.0.0.1:8080"
poll_interval: 2
"#,
        );

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.client.base_domain, "example.com");
        assert_eq!(config.client.user_agent, "tests/1.0");
        assert_eq!(config.client.timeout, Some(10));
        assert_eq!(config.client.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(config.poll_interval, 2);
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        let file = write_config("poll_interval: 8\n");

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.client, ClientConfig::default());
        assert_eq!(config.client.base_domain, DEFAULT_BASE_DOMAIN);
        assert_eq!(config.poll_interval, 8);
    }

    #[test]
    #[serial]
    fn test_load_missing_file() {
        let config = Config::load("/nonexistent/rbxweb.yaml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_load_env_override() {
        let file = write_config("client:\n  base_domain: \"example.com\"\n");

        unsafe {
            std::env::set_var("RBXWEB_CLIENT__BASE_DOMAIN", "roblox.qq.com");
        }
        let config = Config::load(file.path().to_str().unwrap());
        unsafe {
            std::env::remove_var("RBXWEB_CLIENT__BASE_DOMAIN");
        }

        assert_eq!(config.unwrap().client.base_domain, "roblox.qq.com");
    }

    #[test]
    #[serial]
    fn test_load_invalid_value() {
        let file = write_config("poll_interval: \"often\"\n");
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }
}
