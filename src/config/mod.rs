//! Configuration module for the callcheck server
//!
//! This module handles server configuration from two sources: YAML files and
//! environment variables. The configuration is split into logical submodules:
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! Missing Supabase or Twilio credentials are not a load error. They are
//! reported per request by the test-call handler, so a half-configured
//! deployment still starts and answers health checks.
//!
//! # Example
//! ```rust,no_run
//! use callcheck::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable fallbacks
//! let config = ServerConfig::from_file(&PathBuf::from("config.yaml"))?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_TWILIO_API_BASE_URL: &str = "https://api.twilio.com";
pub const DEFAULT_TWILIO_WEBHOOK_PATH: &str = "/functions/v1/twilio-webhook";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_HTTP_CONNECT_RETRIES: u32 = 2;

/// How handler errors are mapped onto HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorStatusMode {
    /// Every failure is reported as 500, whatever its cause.
    #[default]
    Uniform,
    /// Caller mistakes get 4xx, provider rejections 502, everything else 500.
    Typed,
}

impl FromStr for ErrorStatusMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uniform" => Ok(ErrorStatusMode::Uniform),
            "typed" => Ok(ErrorStatusMode::Typed),
            other => Err(format!(
                "Invalid error status mode '{other}'. Must be 'uniform' or 'typed'"
            )),
        }
    }
}

impl fmt::Display for ErrorStatusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStatusMode::Uniform => write!(f, "uniform"),
            ErrorStatusMode::Typed => write!(f, "typed"),
        }
    }
}

/// Server configuration
///
/// Contains all configuration needed to run the callcheck server:
/// - Server settings (host, port, error status mapping)
/// - Supabase data store endpoint and service-role key
/// - Twilio credentials and call settings
/// - Outbound HTTP settings (timeout, connect retries)
#[derive(Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    pub error_status_mode: ErrorStatusMode,

    // Supabase settings
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,

    // Twilio settings
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_api_base_url: String,
    /// Origin number used when the agent's profile has none.
    /// Left unset, such agents cannot place test calls.
    pub twilio_fallback_from_number: Option<String>,
    pub twilio_webhook_path: String,
    pub twilio_forward_errors: bool,

    // Outbound HTTP settings
    pub http_timeout_seconds: u64,
    pub http_connect_retries: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            error_status_mode: ErrorStatusMode::default(),
            supabase_url: None,
            supabase_service_role_key: None,
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_api_base_url: DEFAULT_TWILIO_API_BASE_URL.to_string(),
            twilio_fallback_from_number: None,
            twilio_webhook_path: DEFAULT_TWILIO_WEBHOOK_PATH.to_string(),
            twilio_forward_errors: false,
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            http_connect_retries: DEFAULT_HTTP_CONNECT_RETRIES,
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() { "<redacted>" } else { "<unset>" }
        }

        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("error_status_mode", &self.error_status_mode)
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_service_role_key",
                &redact(&self.supabase_service_role_key),
            )
            .field("twilio_account_sid", &self.twilio_account_sid)
            .field("twilio_auth_token", &redact(&self.twilio_auth_token))
            .field("twilio_api_base_url", &self.twilio_api_base_url)
            .field(
                "twilio_fallback_from_number",
                &self.twilio_fallback_from_number,
            )
            .field("twilio_webhook_path", &self.twilio_webhook_path)
            .field("twilio_forward_errors", &self.twilio_forward_errors)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("http_connect_retries", &self.http_connect_retries)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable fallbacks
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables
    /// 3. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // .env is deliberately not loaded here; the YAML file is the source of
        // truth and only real environment variables fill its gaps.
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let config = merge::merge_config(Some(yaml_config))?;

        validation::validate_config(&config)?;

        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeout applied to every outbound HTTP request
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Callback address Twilio fetches call instructions from.
    ///
    /// Derived from the Supabase URL so the webhook lives next to the data
    /// store. Returns `None` when the Supabase URL is not configured.
    pub fn twilio_webhook_url(&self) -> Option<String> {
        self.supabase_url.as_ref().map(|base| {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                self.twilio_webhook_path.trim_start_matches('/')
            )
        })
    }
}
