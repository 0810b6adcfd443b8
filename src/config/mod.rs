//! Configuration management for the vendor list refresher
//!
//! [`RefreshConfig`] is the immutable scheduler configuration. [`Config`] is
//! the application configuration loaded from environment variables or a
//! TOML file, and converts into a [`RefreshConfig`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::Error;
use crate::models::Language;

/// Default interval between successful refreshes (1 hour)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Default interval before retrying after a failure (1 minute)
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(60);

// ============================================================================
// Refresh Configuration
// ============================================================================

/// Immutable configuration of a vendor list refresh scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Time between successful refreshes. Zero refreshes immediately.
    pub refresh_interval: Duration,

    /// Time before the next check after a failed refresh
    pub retry_interval: Duration,

    /// Language of the localized overlay, if any
    pub language: Option<Language>,

    /// Replacement source for the latest primary document
    pub override_url: Option<Url>,

    /// Explicit vendor list version, `None` for the latest
    pub version: Option<i64>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            language: None,
            override_url: None,
            version: None,
        }
    }
}

impl RefreshConfig {
    /// Create a new config builder
    pub fn builder() -> RefreshConfigBuilder {
        RefreshConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        match self.version {
            Some(version) if version < 1 => Err(Error::invalid_argument(format!(
                "vendor list version must be greater than 0, got {version}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Builder for RefreshConfig
#[derive(Debug, Default)]
pub struct RefreshConfigBuilder {
    refresh_interval: Option<Duration>,
    retry_interval: Option<Duration>,
    language: Option<String>,
    override_url: Option<String>,
    version: Option<i64>,
}

impl RefreshConfigBuilder {
    /// Set refresh interval
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Set retry interval
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = Some(interval);
        self
    }

    /// Set the localized overlay language (ISO 639-1)
    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.language = Some(code.into());
        self
    }

    /// Replace the latest primary document source
    pub fn override_url(mut self, url: impl Into<String>) -> Self {
        self.override_url = Some(url.into());
        self
    }

    /// Pin a vendor list version
    pub fn version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }

    /// Build the config
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an unknown language code, an
    /// unparsable override URL or a version below 1.
    pub fn build(self) -> crate::error::Result<RefreshConfig> {
        let language = self.language.as_deref().map(Language::new).transpose()?;
        let override_url = self
            .override_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|e| Error::invalid_argument(format!("invalid override URL '{raw}': {e}")))
            })
            .transpose()?;

        let config = RefreshConfig {
            refresh_interval: self.refresh_interval.unwrap_or(DEFAULT_REFRESH_INTERVAL),
            retry_interval: self.retry_interval.unwrap_or(DEFAULT_RETRY_INTERVAL),
            language,
            override_url,
            version: self.version,
        };
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vendor list refresh configuration
    pub vendor_list: VendorListConfig,

    /// HTTP client configuration
    pub http: HttpConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Vendor list refresh settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorListConfig {
    /// Interval between successful refreshes in milliseconds
    pub refresh_interval_ms: u64,

    /// Interval before retrying after a failure in milliseconds
    pub retry_interval_ms: u64,

    /// ISO 639-1 language of the localized overlay
    #[serde(default)]
    pub language: Option<String>,

    /// Replacement source for the latest vendor list
    #[serde(default)]
    pub override_url: Option<String>,

    /// Pinned vendor list version
    #[serde(default)]
    pub version: Option<i64>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

/// Read an unsigned number from `name`, falling back to `default` when unset
fn env_number(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{name} is not a non-negative number: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let refresh_interval_ms = env_number(
            "VENDORLIST_REFRESH_INTERVAL_MS",
            defaults.vendor_list.refresh_interval_ms,
        )?;
        let retry_interval_ms = env_number(
            "VENDORLIST_RETRY_INTERVAL_MS",
            defaults.vendor_list.retry_interval_ms,
        )?;

        let language = std::env::var("VENDORLIST_LANGUAGE").ok();
        let override_url = std::env::var("VENDORLIST_OVERRIDE_URL").ok();

        let version = match std::env::var("VENDORLIST_VERSION") {
            Ok(raw) => Some(
                raw.parse::<i64>()
                    .with_context(|| format!("VENDORLIST_VERSION is not a number: {raw}"))?,
            ),
            Err(_) => None,
        };

        let request_timeout_secs =
            env_number("VENDORLIST_REQUEST_TIMEOUT", defaults.http.request_timeout_secs)?;

        let user_agent =
            std::env::var("VENDORLIST_USER_AGENT").unwrap_or(defaults.http.user_agent);

        let log_level =
            std::env::var("VENDORLIST_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("VENDORLIST_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            vendor_list: VendorListConfig {
                refresh_interval_ms,
                retry_interval_ms,
                language,
                override_url,
                version,
            },
            http: HttpConfig {
                request_timeout_secs,
                user_agent,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.http.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be 'text' or 'json'");
        }

        self.refresh_config()
            .context("Invalid vendor_list configuration")?;

        Ok(())
    }

    /// Build the scheduler configuration from the `[vendor_list]` section
    pub fn refresh_config(&self) -> crate::error::Result<RefreshConfig> {
        let section = &self.vendor_list;
        let mut builder = RefreshConfig::builder()
            .refresh_interval(Duration::from_millis(section.refresh_interval_ms))
            .retry_interval(Duration::from_millis(section.retry_interval_ms));

        if let Some(language) = &section.language {
            builder = builder.language(language.clone());
        }
        if let Some(url) = &section.override_url {
            builder = builder.override_url(url.clone());
        }
        if let Some(version) = section.version {
            builder = builder.version(version);
        }

        builder.build()
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vendor_list: VendorListConfig {
                refresh_interval_ms: DEFAULT_REFRESH_INTERVAL.as_millis() as u64,
                retry_interval_ms: DEFAULT_RETRY_INTERVAL.as_millis() as u64,
                language: None,
                override_url: None,
                version: None,
            },
            http: HttpConfig {
                request_timeout_secs: 30,
                user_agent: format!("vendorlist/{}", env!("CARGO_PKG_VERSION")),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
