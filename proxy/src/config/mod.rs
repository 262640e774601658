//! Configuration management
//!
//! Credentials and downstream endpoints, read once from the environment at
//! startup. Nothing here is mutated after `Config::from_env` returns.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use zeroize::{Zeroize, ZeroizeOnDrop};

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_GITHUB_OWNER: &str = "OSTrails";
const DEFAULT_GITHUB_REPO: &str = "assessment-component-metadata-records";
const DEFAULT_GITHUB_BRANCH: &str = "main";
const DEFAULT_GRAPHQL_URL: &str = "https://api.fairsharing.org/graphql";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },
}

/// Static secrets for the three downstream services
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    #[zeroize(skip)]
    pub auth_url: String,
    #[zeroize(skip)]
    pub data_url: String,
    #[zeroize(skip)]
    pub username: String,
    pub password: String,
    pub github_token: String,
    pub fdp_token: Option<String>,
    pub graphql_key: Option<String>,
}

// Custom Debug implementation that redacts sensitive fields
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_url", &self.auth_url)
            .field("data_url", &self.data_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("github_token", &"[REDACTED]")
            .field("fdp_token", &self.fdp_token.as_ref().map(|_| "[REDACTED]"))
            .field("graphql_key", &self.graphql_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Repository receiving pushed records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubTarget {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub github: GitHubTarget,
    pub fdp_url: Option<String>,
    pub graphql_url: String,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    /// Proactive expiry for cached registry tokens
    pub token_ttl: Option<Duration>,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let credentials = Credentials {
            auth_url: require_url("AUTH_URL", require("AUTH_URL")?)?,
            data_url: require_url("DATA_URL", require("DATA_URL")?)?,
            username: require("USERNAME")?,
            password: require("PASSWORD")?,
            github_token: require("GITHUB_TOKEN")?,
            fdp_token: get("FDP_TOKEN"),
            graphql_key: get("FAIRSHARING_GRAPHQL_KEY"),
        };

        let github = GitHubTarget {
            api_url: require_url(
                "GITHUB_API_URL",
                get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            )?
            .trim_end_matches('/')
            .to_string(),
            owner: get("GITHUB_OWNER").unwrap_or_else(|| DEFAULT_GITHUB_OWNER.to_string()),
            repo: get("GITHUB_REPO").unwrap_or_else(|| DEFAULT_GITHUB_REPO.to_string()),
            branch: get("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_GITHUB_BRANCH.to_string()),
        };

        let fdp_url = get("FDP_URL")
            .map(|url| require_url("FDP_URL", url))
            .transpose()?;

        let graphql_url = require_url(
            "FAIRSHARING_GRAPHQL_URL",
            get("FAIRSHARING_GRAPHQL_URL").unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string()),
        )?;

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_secs("REQUEST_TIMEOUT_SECS", &v)?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let token_ttl = get("TOKEN_TTL_SECS")
            .map(|v| parse_secs("TOKEN_TTL_SECS", &v).map(Duration::from_secs))
            .transpose()?;

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            credentials,
            github,
            fdp_url,
            graphql_url,
            bind_addr,
            request_timeout,
            token_ttl,
            cors_origins,
        })
    }
}

fn require_url(var: &'static str, value: String) -> Result<String, ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            var,
            reason: format!("expected an http(s) URL, got '{}'", value),
        })
    }
}

fn parse_secs(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("AUTH_URL", "https://api.fairsharing.org/users/sign_in".to_string()),
            ("DATA_URL", "https://api.fairsharing.org/fairsharing_records".to_string()),
            ("USERNAME", "curator".to_string()),
            ("PASSWORD", "hunter2".to_string()),
            ("GITHUB_TOKEN", "ghp_secret".to_string()),
        ])
    }

    pub(crate) fn load(env: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.github.owner, "OSTrails");
        assert_eq!(config.github.repo, "assessment-component-metadata-records");
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert!(config.fdp_url.is_none());
        assert!(config.token_ttl.is_none());
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_missing_github_token_is_fatal() {
        let mut env = base_env();
        env.remove("GITHUB_TOKEN");
        let err = load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GITHUB_TOKEN")));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut env = base_env();
        env.insert("PASSWORD", "   ".to_string());
        assert!(matches!(load(&env).unwrap_err(), ConfigError::Missing("PASSWORD")));
    }

    #[test]
    fn test_invalid_optional_values() {
        let mut env = base_env();
        env.insert("REQUEST_TIMEOUT_SECS", "soon".to_string());
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Invalid { var: "REQUEST_TIMEOUT_SECS", .. }
        ));

        let mut env = base_env();
        env.insert("FDP_URL", "fdp.example.org".to_string());
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Invalid { var: "FDP_URL", .. }
        ));

        let mut env = base_env();
        env.insert("BIND_ADDR", "localhost".to_string());
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Invalid { var: "BIND_ADDR", .. }
        ));
    }

    #[test]
    fn test_optional_values_parsed() {
        let mut env = base_env();
        env.insert("FDP_URL", "https://fdp.example.org/".to_string());
        env.insert("TOKEN_TTL_SECS", "3600".to_string());
        env.insert("CORS_ORIGINS", "http://localhost:5173, https://tool.example.org".to_string());
        env.insert("GITHUB_API_URL", "http://127.0.0.1:9000/".to_string());
        let config = load(&env).unwrap();
        assert_eq!(config.fdp_url.as_deref(), Some("https://fdp.example.org/"));
        assert_eq!(config.token_ttl, Some(Duration::from_secs(3600)));
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.github.api_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&base_env()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
