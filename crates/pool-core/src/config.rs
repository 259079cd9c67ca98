//! Configuration
//!
//! Loaded from TOML; every section and field is optional and defaults to the
//! values the public deployment uses.
//!
//! ```toml
//! [github]
//! owner = "ash-ketchum"
//! repo = "egglocke"
//! path = "eggs.json"
//!
//! [catalog]
//! cache_dir = "/var/cache/egg-pool"
//!
//! [append]
//! max_attempts = 3
//! backoff_base_ms = 500
//! ```

use crate::error::ConfigError;
use pool_append::{AppendPolicy, DEFAULT_BACKOFF_BASE, DEFAULT_MAX_ATTEMPTS};
use pool_catalog::REFERENCE_TTL;
use pool_store::GitHubContentsConfig;
use pool_ui::{DEFAULT_BLUR_GRACE, DEFAULT_MAX_RESULTS, DEFAULT_QUIET_INTERVAL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `github.token`
pub const TOKEN_ENV: &str = "EGG_POOL_GITHUB_TOKEN";

/// Default PokeAPI base URL
const POKEAPI_URL: &str = "https://pokeapi.co/api/v2";

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Shared document location
    pub github: GitHubContentsConfig,
    /// Reference data
    pub catalog: CatalogConfig,
    /// Append retry policy
    pub append: AppendConfig,
    /// Form field timing
    pub form: FormConfig,
}

/// Reference data settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// PokeAPI-compatible base URL
    pub api_base: String,
    /// Directory for cached lists; in-memory when unset
    pub cache_dir: Option<PathBuf>,
    /// Freshness window for cached lists, in seconds
    pub ttl_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: POKEAPI_URL.to_string(),
            cache_dir: None,
            ttl_secs: REFERENCE_TTL.as_secs(),
        }
    }
}

/// Append retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendConfig {
    /// Attempts per submission, including the first
    pub max_attempts: u32,
    /// Back-off unit in milliseconds
    pub backoff_base_ms: u64,
}

impl Default for AppendConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: millis(DEFAULT_BACKOFF_BASE),
        }
    }
}

/// Form field settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Quiet interval before a lookup fires, in milliseconds
    pub quiet_interval_ms: u64,
    /// Most search results shown at once
    pub max_results: usize,
    /// Delay before a blurred select closes, in milliseconds
    pub blur_grace_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            quiet_interval_ms: millis(DEFAULT_QUIET_INTERVAL),
            max_results: DEFAULT_MAX_RESULTS,
            blur_grace_ms: millis(DEFAULT_BLUR_GRACE),
        }
    }
}

impl PoolConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed TOML or mistyped fields
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, `ConfigError::Parse` if
    /// it is not valid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Render as TOML; the token is never written out
    ///
    /// # Errors
    /// `ConfigError::Render` if serialization fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.github.token = Some(token.trim().to_string());
        }
        self
    }

    /// With repository location
    #[must_use]
    pub fn with_github(mut self, github: GitHubContentsConfig) -> Self {
        self.github = github;
        self
    }

    /// With access token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.github.token = Some(token.into());
        self
    }

    /// With PokeAPI base URL
    #[must_use]
    pub fn with_catalog_api(mut self, api_base: impl Into<String>) -> Self {
        self.catalog.api_base = api_base.into();
        self
    }

    /// With on-disk list cache
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.catalog.cache_dir = Some(dir.into());
        self
    }

    /// With append retry policy
    #[must_use]
    pub fn with_append_policy(mut self, policy: AppendPolicy) -> Self {
        self.append = AppendConfig {
            max_attempts: policy.max_attempts,
            backoff_base_ms: millis(policy.backoff_base),
        };
        self
    }

    /// Check that the settings can be used
    ///
    /// # Errors
    /// `ConfigError::Missing` for an empty owner, repo, branch or path;
    /// `ConfigError::Invalid` for a zero attempt budget or result cap
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("github.owner", &self.github.owner),
            ("github.repo", &self.github.repo),
            ("github.branch", &self.github.branch),
            ("github.path", &self.github.path),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(field));
            }
        }
        if self.append.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "append.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.form.max_results == 0 {
            return Err(ConfigError::Invalid {
                field: "form.max_results",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Append retry policy
    #[must_use]
    pub fn append_policy(&self) -> AppendPolicy {
        AppendPolicy::new(
            self.append.max_attempts,
            Duration::from_millis(self.append.backoff_base_ms),
        )
    }

    /// Freshness window for reference lists
    #[inline]
    #[must_use]
    pub fn reference_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog.ttl_secs)
    }

    /// Quiet interval for entity lookups
    #[inline]
    #[must_use]
    pub fn quiet_interval(&self) -> Duration {
        Duration::from_millis(self.form.quiet_interval_ms)
    }

    /// Blur grace period for search selects
    #[inline]
    #[must_use]
    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.form.blur_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_deployment() {
        let config = PoolConfig::new();
        assert_eq!(config.append_policy(), AppendPolicy::default());
        assert_eq!(config.reference_ttl(), Duration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(config.quiet_interval(), Duration::from_millis(600));
        assert_eq!(config.blur_grace(), Duration::from_millis(150));
        assert_eq!(config.form.max_results, 150);
        assert_eq!(config.github.path, "eggs.json");
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.catalog.cache_dir, None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PoolConfig::from_toml_str(
            r#"
            [github]
            owner = "ash-ketchum"
            repo = "egglocke"

            [append]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.github.owner, "ash-ketchum");
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.append.max_attempts, 5);
        assert_eq!(config.append.backoff_base_ms, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn mistyped_field_is_parse_error() {
        let err = PoolConfig::from_toml_str("[append]\nmax_attempts = \"three\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_repository_is_reported() {
        let err = PoolConfig::new().validate().unwrap_err();
        assert_eq!(err.to_string(), "missing required setting: github.owner");
    }

    #[test]
    fn zero_attempts_is_invalid() {
        let mut config = PoolConfig::new().with_github(GitHubContentsConfig::new("o", "r"));
        config.append.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "append.max_attempts",
                ..
            })
        ));
    }

    #[test]
    fn env_token_overrides_file() {
        let config = PoolConfig::new()
            .with_token("from-file")
            .with_env_from(|name| (name == TOKEN_ENV).then(|| " from-env \n".to_string()));
        assert_eq!(config.github.token.as_deref(), Some("from-env"));

        let untouched = PoolConfig::new()
            .with_token("from-file")
            .with_env_from(|_| Some("   ".to_string()));
        assert_eq!(untouched.github.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn rendered_toml_omits_token() {
        let config = PoolConfig::new()
            .with_github(GitHubContentsConfig::new("o", "r"))
            .with_token("ghp_secret");
        let text = config.to_toml_string().unwrap();
        assert!(!text.contains("ghp_secret"));

        let reparsed = PoolConfig::from_toml_str(&text).unwrap();
        assert_eq!(reparsed.github.owner, "o");
        assert_eq!(reparsed.github.token, None);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("egg-pool.toml");
        std::fs::write(&path, "[catalog]\nttl_secs = 60\n").unwrap();

        let config = PoolConfig::load(&path).unwrap();
        assert_eq!(config.reference_ttl(), Duration::from_secs(60));

        let err = PoolConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
