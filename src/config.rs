//! Configuration for the navigation fetch and link rewriting.
//!
//! Defaults target the production API reference site and work without any
//! configuration file. A TOML file can override individual fields, and
//! `APILINK_*` environment variables override both.
//!
//! ## Example Configuration File
//!
//! ```toml
//! nav_url = "https://api.koog.ai/navigation.html"
//! base_url = "https://api.koog.ai/"
//! timeout_secs = 10
//! max_suggestions = 5
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

const DEFAULT_NAV_URL: &str = "https://api.koog.ai/navigation.html";
const DEFAULT_BASE_URL: &str = "https://api.koog.ai/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Settings for the navigation index builder and link resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL of the navigation document enumerating all API symbols.
    pub nav_url: String,

    /// Base URL of the API reference site.
    ///
    /// Resolved hrefs are joined against this to guarantee an absolute
    /// result even when the index stored a relative fallback.
    pub base_url: String,

    /// Timeout for the navigation document fetch, in seconds.
    pub timeout_secs: u64,

    /// User agent sent with the navigation fetch.
    pub user_agent: String,

    /// Maximum number of fuzzy "did you mean" suggestions per unresolved key.
    pub max_suggestions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nav_url: DEFAULT_NAV_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("apilink/", env!("CARGO_PKG_VERSION")).to_string(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields fall back to the defaults. The result is validated
    /// before being returned.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `APILINK_*` environment variable overrides on top of this config.
    ///
    /// Recognized variables: `APILINK_NAV_URL`, `APILINK_BASE_URL`,
    /// `APILINK_TIMEOUT_SECS`, `APILINK_MAX_SUGGESTIONS`. Unparsable numeric
    /// values are rejected as configuration errors.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("APILINK_NAV_URL") {
            self.nav_url = url;
        }
        if let Some(url) = lookup("APILINK_BASE_URL") {
            self.base_url = url;
        }
        if let Some(secs) = lookup("APILINK_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .parse()
                .map_err(|_| Error::Config(format!("invalid APILINK_TIMEOUT_SECS: '{secs}'")))?;
        }
        if let Some(n) = lookup("APILINK_MAX_SUGGESTIONS") {
            self.max_suggestions = n
                .parse()
                .map_err(|_| Error::Config(format!("invalid APILINK_MAX_SUGGESTIONS: '{n}'")))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the configured URLs are absolute and parsable.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.nav_url)
            .map_err(|e| Error::Config(format!("invalid nav_url '{}': {e}", self.nav_url)))?;
        Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base_url '{}': {e}", self.base_url)))?;
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be non-zero".to_string()));
        }
        Ok(())
    }

    /// The fetch timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
