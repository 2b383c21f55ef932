//! Client configuration.

use crate::error::{Error, Result};
use crate::status::StatusTable;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.postmarkapp.com";

/// Token accepted by the provider for test sends that are never delivered.
pub const TEST_SERVER_TOKEN: &str = "POSTMARK_API_TEST";

/// Environment variable holding the server token.
pub const ENV_SERVER_TOKEN: &str = "POSTMARK_SERVER_TOKEN";

/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "POSTMARK_API_URL";

const DEFAULT_USER_AGENT: &str = concat!("postmark-client/", env!("CARGO_PKG_VERSION"));

/// Client configuration.
#[derive(Clone)]
pub struct Config {
    /// Server API token sent with every request.
    pub server_token: String,
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout. `None` leaves the transport default.
    pub timeout: Option<Duration>,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// HTTP status classification.
    pub status_table: StatusTable,
}

impl Config {
    /// Creates a configuration for the production endpoint.
    #[must_use]
    pub fn new(server_token: impl Into<String>) -> Self {
        Self {
            server_token: server_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            status_table: StatusTable::default(),
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(server_token: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(server_token)
    }

    /// Reads the configuration from `POSTMARK_SERVER_TOKEN` and, if set,
    /// `POSTMARK_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not set or the URL is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not set or the URL is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup(ENV_SERVER_TOKEN)
            .ok_or_else(|| Error::InvalidConfig(format!("{ENV_SERVER_TOKEN} not set")))?;

        let mut builder = ConfigBuilder::new(token);
        if let Some(url) = lookup(ENV_API_URL) {
            builder = builder.base_url(url);
        }
        builder.build()
    }

    /// Returns the full URL for an API path such as `/email`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("status_table", &self.status_table)
            .finish()
    }
}

/// Builder for client configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder with the given token.
    #[must_use]
    pub fn new(server_token: impl Into<String>) -> Self {
        Self {
            config: Config::new(server_token),
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Sets the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Replaces the status table.
    #[must_use]
    pub fn status_table(mut self, table: StatusTable) -> Self {
        self.config.status_table = table;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL.
    pub fn build(mut self) -> Result<Config> {
        let url = Url::parse(&self.config.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        self.config.base_url = url.as_str().trim_end_matches('/').to_string();
        Ok(self.config)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::status::Status;
    use std::collections::HashMap;

    #[test]
    fn test_config_new() {
        let config = Config::new("token");
        assert_eq!(config.server_token, "token");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.timeout.is_none());
        assert_eq!(config.endpoint("/email"), "https://api.postmarkapp.com/email");
    }

    #[test]
    fn test_builder() {
        let config = Config::builder("token")
            .base_url("http://127.0.0.1:8080/")
            .timeout(Duration::from_secs(5))
            .user_agent("tests")
            .status_table(StatusTable::empty().with_code(200, Status::Success))
            .build()
            .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.endpoint("/email/batch"), "http://127.0.0.1:8080/email/batch");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent, "tests");
        assert_eq!(config.status_table.classify(500), Status::Unknown);
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        assert!(matches!(
            Config::builder("t").base_url("not a url").build(),
            Err(Error::Url(_))
        ));
        assert!(matches!(
            Config::builder("t").base_url("ftp://example.com").build(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_SERVER_TOKEN, "server-token"),
            (ENV_API_URL, "https://mock.example.com/"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|k| vars.get(k).map(ToString::to_string)).unwrap();
        assert_eq!(config.server_token, "server-token");
        assert_eq!(config.base_url, "https://mock.example.com");
    }

    #[test]
    fn test_from_lookup_missing_token() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", Config::new("secret-token"));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
