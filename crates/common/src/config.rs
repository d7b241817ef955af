//! Client configuration.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::KisaResult;

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Remote server configuration.
    pub server: ServerConfig,
    /// HTTP transport configuration.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Remote server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the instance, e.g. `https://mastodon.example`.
    pub url: String,
    /// OAuth access token sent as a bearer credential.
    #[serde(default)]
    pub access_token: Option<String>,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// TCP/TLS connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds. Leave unset when streaming.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// User-Agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    #[serde(default)]
    pub no_proxy: bool,
}

/// Values supplied by the caller, e.g. on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replaces `server.url`.
    pub url: Option<String>,
    /// Replaces `server.access_token`.
    pub access_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: None,
            user_agent: default_user_agent(),
            no_proxy: false,
        }
    }
}

impl HttpConfig {
    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout as a [`Duration`], if one is configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("kisa/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `KISA_ENV`)
    /// 3. Environment variables with `KISA__` prefix, e.g. `KISA__SERVER__URL`
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with("config", &Overrides::default())
    }

    /// Load configuration from `dir`, applying `overrides` over every other source.
    ///
    /// Any failure in a file or environment variable is reported, even when the
    /// overrides alone would make a complete configuration.
    pub fn load_with<P: AsRef<Path>>(
        dir: P,
        overrides: &Overrides,
    ) -> Result<Self, config::ConfigError> {
        let dir = dir.as_ref();
        let env = std::env::var("KISA_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::from(dir.join("default.toml")).required(false))
            .add_source(config::File::from(dir.join(format!("{env}.toml"))).required(false))
            .add_source(
                config::Environment::with_prefix("KISA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.url", overrides.url.as_deref())?
            .set_override_option("server.access_token", overrides.access_token.as_deref())?
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("KISA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse configuration from TOML text, without consulting the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Build the default header set sent with every request.
    ///
    /// Carries `Authorization: Bearer <token>` when an access token is configured.
    pub fn default_headers(&self) -> KisaResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Some(token) = self.server.access_token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}
