//! Client configuration.

use crate::error::{ClientError, Result};
use datastore_transport::{RetryConfig, TransportConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Datastore client configuration.
///
/// Durations are millisecond integers so the same shape loads from TOML and
/// from environment variables.
///
/// ```toml
/// nodes = ["http://es-1:9200", "http://es-2:9200"]
/// request_timeout_ms = 30000
/// retry_attempt_max = 3
/// retry_attempt_wait_ms = 2500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Engine node URLs.
    pub nodes: Vec<String>,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Retries allowed after a timed-out attempt.
    pub retry_attempt_max: u32,
    /// Base wait between retries in milliseconds.
    pub retry_attempt_wait_ms: u64,
    /// Treat a 400 answer to delete-by-query as "nothing deleted".
    pub delete_by_query_tolerates_bad_request: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            username: None,
            password: None,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            retry_attempt_max: 3,
            retry_attempt_wait_ms: 2_500,
            delete_by_query_tolerates_bad_request: true,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for a single node.
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            nodes: vec![node.into()],
            ..Default::default()
        }
    }

    /// Set basic authentication.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = millis(timeout);
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = millis(timeout);
        self
    }

    /// Set retry policy.
    pub fn with_retry(mut self, max_attempts: u32, base_wait: Duration) -> Self {
        self.retry_attempt_max = max_attempts;
        self.retry_attempt_wait_ms = millis(base_wait);
        self
    }

    /// Set the delete-by-query bad request policy.
    pub fn with_delete_by_query_tolerates_bad_request(mut self, tolerate: bool) -> Self {
        self.delete_by_query_tolerates_bad_request = tolerate;
        self
    }

    /// Transport settings.
    pub fn transport_config(&self) -> TransportConfig {
        let config = TransportConfig::cluster(self.nodes.clone())
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms));

        match (&self.username, &self.password) {
            (Some(username), Some(password)) => config.with_basic_auth(username, password),
            _ => config,
        }
    }

    /// Retry settings.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.retry_attempt_max,
            Duration::from_millis(self.retry_attempt_wait_ms),
        )
    }

    /// Reject configurations the client cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ClientError::Initialization(
                "at least one engine node is required".to_string(),
            ));
        }
        if self.nodes.iter().any(|n| n.trim().is_empty()) {
            return Err(ClientError::Initialization("engine node URL is blank".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ClientError::Initialization(
                "request timeout must be positive".to_string(),
            ));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(ClientError::Initialization(
                "username and password must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ClientError::Initialization(format!("invalid client configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Initialization(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `<PREFIX>_*` environment variables over the defaults.
    ///
    /// Recognized suffixes: `NODES` (comma separated), `USERNAME`,
    /// `PASSWORD`, `CONNECT_TIMEOUT_MS`, `REQUEST_TIMEOUT_MS`,
    /// `RETRY_ATTEMPT_MAX`, `RETRY_ATTEMPT_WAIT_MS`,
    /// `DELETE_BY_QUERY_TOLERATES_BAD_REQUEST`.
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{}_{suffix}", prefix.to_uppercase()));
        let mut config = Self::default();

        if let Some(nodes) = var("NODES") {
            config.nodes = nodes
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(username) = var("USERNAME") {
            config.username = Some(username);
        }
        if let Some(password) = var("PASSWORD") {
            config.password = Some(password);
        }
        if let Some(v) = var("CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = parse_var("CONNECT_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = var("REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = parse_var("REQUEST_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = var("RETRY_ATTEMPT_MAX") {
            config.retry_attempt_max = parse_var("RETRY_ATTEMPT_MAX", &v)?;
        }
        if let Some(v) = var("RETRY_ATTEMPT_WAIT_MS") {
            config.retry_attempt_wait_ms = parse_var("RETRY_ATTEMPT_WAIT_MS", &v)?;
        }
        if let Some(v) = var("DELETE_BY_QUERY_TOLERATES_BAD_REQUEST") {
            config.delete_by_query_tolerates_bad_request =
                parse_var("DELETE_BY_QUERY_TOLERATES_BAD_REQUEST", &v)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ClientError::Initialization(format!("invalid {name} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout_ms, 30_000);
        assert_eq!(config.retry_attempt_max, 3);
        assert_eq!(config.retry_attempt_wait_ms, 2_500);
        assert!(config.delete_by_query_tolerates_bad_request);
        assert!(config.validate().is_ok());

        let retry = config.retry_config();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.base_wait, Duration::from_millis(2_500));
    }

    #[test]
    fn test_from_toml() {
        let config = ClientConfig::from_toml_str(
            r#"
            nodes = ["http://es-1:9200", "http://es-2:9200"]
            username = "ingest"
            password = "secret"
            retry_attempt_max = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.nodes.len(), 2);
        assert_eq!(config.retry_attempt_max, 5);
        assert_eq!(config.request_timeout_ms, 30_000);

        let transport = config.transport_config();
        assert_eq!(transport.nodes, config.nodes);
        assert_eq!(transport.username.as_deref(), Some("ingest"));
        assert_eq!(transport.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_toml_rejects_empty_nodes() {
        let result = ClientConfig::from_toml_str("nodes = []");
        assert!(matches!(result, Err(ClientError::Initialization(_))));

        let result = ClientConfig::from_toml_str("retry_attempt_max = \"three\"");
        assert!(matches!(result, Err(ClientError::Initialization(_))));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATASTORE_NODES", "http://a:9200, http://b:9200"),
            ("DATASTORE_RETRY_ATTEMPT_MAX", "0"),
            ("DATASTORE_REQUEST_TIMEOUT_MS", "500"),
            ("DATASTORE_DELETE_BY_QUERY_TOLERATES_BAD_REQUEST", "false"),
        ]);

        let config =
            ClientConfig::from_lookup("datastore", |key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.nodes, vec!["http://a:9200", "http://b:9200"]);
        assert_eq!(config.retry_attempt_max, 0);
        assert_eq!(config.request_timeout_ms, 500);
        assert!(!config.delete_by_query_tolerates_bad_request);
        assert_eq!(config.retry_attempt_wait_ms, 2_500);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = ClientConfig::from_lookup("DATASTORE", |key| {
            (key == "DATASTORE_RETRY_ATTEMPT_WAIT_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ClientError::Initialization(_))));
    }

    #[test]
    fn test_from_env_without_vars_uses_defaults() {
        let config = ClientConfig::from_env("DATASTORE_CLIENT_TEST_UNSET_7731").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_duration_setters_saturate() {
        let config = ClientConfig::default()
            .with_request_timeout(Duration::from_millis(1_500))
            .with_connect_timeout(Duration::MAX)
            .with_retry(2, Duration::MAX);

        assert_eq!(config.request_timeout_ms, 1_500);
        assert_eq!(config.connect_timeout_ms, u64::MAX);
        assert_eq!(config.retry_attempt_wait_ms, u64::MAX);
    }

    #[test]
    fn test_credentials_must_pair() {
        let mut config = ClientConfig::default();
        config.username = Some("ingest".to_string());
        assert!(config.validate().is_err());
    }
}
