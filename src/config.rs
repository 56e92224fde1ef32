//! Configuration file parser for the feed cache.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields`
//! off), though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use url::Url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A configured URL could not be parsed.
    #[error("Invalid {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    /// A configured URL uses a scheme other than http or https.
    #[error("Unsupported scheme in {field}: {scheme} (only http/https allowed)")]
    UnsupportedScheme { field: &'static str, scheme: String },

    /// `page_size` must request at least one entry.
    #[error("page_size must be at least 1")]
    ZeroPageSize,
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Feed cache configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source feed requested through the proxy.
    pub feed_url: String,

    /// Maximum number of entries to request per fetch.
    pub page_size: u32,

    /// Base URL of the feed-aggregation proxy.
    pub proxy_url: String,

    /// Seconds before an in-flight fetch is treated as timed out.
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: "http://www.webspeaks.in/feed/atom".to_string(),
            page_size: 30,
            proxy_url: "https://ajax.googleapis.com/ajax/services/feed/load".to_string(),
            fetch_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    ///
    /// The loaded values are validated before they are returned, so a
    /// config that parses but carries an unusable URL or a zero page
    /// size is rejected here rather than at first use.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["feed_url", "page_size", "proxy_url", "fetch_timeout_secs"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), feed = %config.feed_url, "Loaded configuration");
        Ok(config)
    }

    /// Validate the configured values.
    ///
    /// Both URLs must parse and use http or https, and `page_size`
    /// must be at least 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_http_url("feed_url", &self.feed_url)?;
        parse_http_url("proxy_url", &self.proxy_url)?;
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }

    /// The parsed proxy base URL.
    pub fn proxy(&self) -> Result<Url, ConfigError> {
        parse_http_url("proxy_url", &self.proxy_url)
    }
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|source| ConfigError::InvalidUrl { field, source })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::UnsupportedScheme {
            field,
            scheme: scheme.to_owned(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
