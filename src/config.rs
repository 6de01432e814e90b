//! Configuration management for the CRM sync server.
//!
//! This module handles loading and validating configuration from environment variables.
//! It avoids polluting stdout (which MCP uses for communication) by loading the
//! .env file through `dotenvy`, which never prints.

use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Largest accepted refresh buffer or proactive threshold (30 days).
pub const MAX_REFRESH_WINDOW_SECS: u64 = 30 * 24 * 3600;

/// OAuth client settings for one CRM provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Token endpoint used for the refresh-token exchange
    pub token_url: String,

    /// REST API base URL (HubSpot only; Salesforce uses the credential's instance URL)
    pub api_base_url: String,
}

/// Configuration for the CRM sync server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Salesforce OAuth settings (None when not configured)
    pub salesforce: Option<ProviderConfig>,

    /// Salesforce REST API version segment, e.g. "v59.0"
    pub salesforce_api_version: String,

    /// HubSpot OAuth settings (None when not configured)
    pub hubspot: Option<ProviderConfig>,

    /// Gemini API key for the extraction service
    pub gemini_api_key: Option<String>,

    /// Gemini model name (default: "gemini-2.0-flash")
    pub gemini_model: String,

    /// Gemini API base URL
    pub gemini_api_url: String,

    /// Overall fan-in budget for multi-source search, in milliseconds (default: 5000)
    pub search_timeout_ms: u64,

    /// Lazy refresh buffer in seconds (default: 300)
    pub token_refresh_buffer_secs: u64,

    /// Proactive sweep threshold in seconds (default: 600)
    pub proactive_refresh_threshold_secs: u64,

    /// Proactive sweep interval in seconds (default: 300)
    pub proactive_refresh_interval_secs: u64,

    /// HTTP request timeout in seconds (default: 10)
    pub request_timeout: u64,

    /// JSON file holding stored credentials
    pub credentials_path: Option<PathBuf>,

    /// JSON file holding local contacts
    pub local_contacts_path: Option<PathBuf>,

    /// Log level (default: "error")
    pub log_level: String,
}

pub const DEFAULT_SALESFORCE_TOKEN_URL: &str = "https://login.salesforce.com/services/oauth2/token";
pub const DEFAULT_HUBSPOT_API_URL: &str = "https://api.hubapi.com";
pub const DEFAULT_HUBSPOT_TOKEN_URL: &str = "https://api.hubapi.com/oauth/v1/token";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Provider variables (each provider is enabled only when both are set):
    /// - `SALESFORCE_CLIENT_ID` / `SALESFORCE_CLIENT_SECRET`
    /// - `HUBSPOT_CLIENT_ID` / `HUBSPOT_CLIENT_SECRET`
    ///
    /// Optional environment variables:
    /// - `SALESFORCE_TOKEN_URL`, `SALESFORCE_API_VERSION` (default: v59.0)
    /// - `HUBSPOT_API_BASE_URL`, `HUBSPOT_TOKEN_URL`
    /// - `GEMINI_API_KEY`, `GEMINI_MODEL`, `GEMINI_API_BASE_URL`
    /// - `SEARCH_TIMEOUT_MS` (default: 5000)
    /// - `TOKEN_REFRESH_BUFFER_SECS` (default: 300)
    /// - `PROACTIVE_REFRESH_THRESHOLD_SECS` (default: 600)
    /// - `PROACTIVE_REFRESH_INTERVAL_SECS` (default: 300)
    /// - `REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 10)
    /// - `CREDENTIALS_PATH`, `LOCAL_CONTACTS_PATH`
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let salesforce = Self::provider_from_env(
            "SALESFORCE",
            DEFAULT_SALESFORCE_TOKEN_URL,
            // Salesforce calls go to the per-credential instance URL
            "",
        )?;
        let hubspot =
            Self::provider_from_env("HUBSPOT", DEFAULT_HUBSPOT_TOKEN_URL, DEFAULT_HUBSPOT_API_URL)?;

        let salesforce_api_version =
            env::var("SALESFORCE_API_VERSION").unwrap_or_else(|_| "v59.0".to_string());
        if !salesforce_api_version.starts_with('v') {
            return Err(ConfigError::InvalidValue {
                var: "SALESFORCE_API_VERSION".to_string(),
                reason: "Must look like v59.0".to_string(),
            });
        }

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
        let gemini_api_url = Self::parse_env_url("GEMINI_API_BASE_URL", DEFAULT_GEMINI_API_URL)?;

        let search_timeout_ms = Self::parse_env_u64("SEARCH_TIMEOUT_MS", 5000)?;
        if search_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                var: "SEARCH_TIMEOUT_MS".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        let token_refresh_buffer_secs =
            Self::parse_env_window("TOKEN_REFRESH_BUFFER_SECS", 300)?;
        let proactive_refresh_threshold_secs =
            Self::parse_env_window("PROACTIVE_REFRESH_THRESHOLD_SECS", 600)?;
        let proactive_refresh_interval_secs =
            Self::parse_env_u64("PROACTIVE_REFRESH_INTERVAL_SECS", 300)?;
        if proactive_refresh_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PROACTIVE_REFRESH_INTERVAL_SECS".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        let request_timeout = Self::parse_env_u64("REQUEST_TIMEOUT", 10)?;

        let credentials_path = env::var("CREDENTIALS_PATH").ok().map(PathBuf::from);
        let local_contacts_path = env::var("LOCAL_CONTACTS_PATH").ok().map(PathBuf::from);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        Ok(Config {
            salesforce,
            salesforce_api_version,
            hubspot,
            gemini_api_key,
            gemini_model,
            gemini_api_url,
            search_timeout_ms,
            token_refresh_buffer_secs,
            proactive_refresh_threshold_secs,
            proactive_refresh_interval_secs,
            request_timeout,
            credentials_path,
            local_contacts_path,
            log_level,
        })
    }

    /// The fan-in budget as a `Duration`.
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    /// Read one provider's OAuth settings; `None` unless both id and secret are set.
    fn provider_from_env(
        prefix: &str,
        default_token_url: &str,
        default_api_url: &str,
    ) -> ConfigResult<Option<ProviderConfig>> {
        let client_id = env::var(format!("{}_CLIENT_ID", prefix)).ok();
        let client_secret = env::var(format!("{}_CLIENT_SECRET", prefix)).ok();

        let (client_id, client_secret) = match (client_id, client_secret) {
            (Some(id), Some(secret)) => (id, secret),
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(ConfigError::MissingVar(format!("{}_CLIENT_SECRET", prefix)))
            }
            (None, Some(_)) => return Err(ConfigError::MissingVar(format!("{}_CLIENT_ID", prefix))),
        };

        if client_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: format!("{}_CLIENT_ID", prefix),
                reason: "Cannot be empty".to_string(),
            });
        }

        let token_url = Self::parse_env_url(&format!("{}_TOKEN_URL", prefix), default_token_url)?;
        let api_base_url = if default_api_url.is_empty() {
            String::new()
        } else {
            Self::parse_env_url(&format!("{}_API_BASE_URL", prefix), default_api_url)?
        };

        Ok(Some(ProviderConfig {
            client_id,
            client_secret,
            token_url,
            api_base_url,
        }))
    }

    /// Parse an environment variable as an http(s) URL with a default value.
    fn parse_env_url(var_name: &str, default: &str) -> ConfigResult<String> {
        let value = env::var(var_name).unwrap_or_else(|_| default.to_string());
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }
        Ok(value)
    }

    /// Parse a refresh window in seconds, at most [`MAX_REFRESH_WINDOW_SECS`].
    fn parse_env_window(var_name: &str, default: u64) -> ConfigResult<u64> {
        let value = Self::parse_env_u64(var_name, default)?;
        if value > MAX_REFRESH_WINDOW_SECS {
            return Err(ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be at most {} seconds", MAX_REFRESH_WINDOW_SECS),
            });
        }
        Ok(value)
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            salesforce: None,
            salesforce_api_version: "v59.0".to_string(),
            hubspot: None,
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".to_string(),
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            search_timeout_ms: 5000,
            token_refresh_buffer_secs: 300,
            proactive_refresh_threshold_secs: 600,
            proactive_refresh_interval_secs: 300,
            request_timeout: 10,
            credentials_path: None,
            local_contacts_path: None,
            log_level: "error".to_string(),
        }
    }
}
