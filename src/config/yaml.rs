use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Anything left out
/// falls back to the matching environment variable, then to the default.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///   error_status_mode: "uniform"
///
/// store:
///   url: "https://project.supabase.co"
///   service_role_key: "service-role-key"
///
/// twilio:
///   account_sid: "AC..."
///   auth_token: "auth-token"
///   api_base_url: "https://api.twilio.com"
///   fallback_from_number: "+15005550006"
///   webhook_path: "/functions/v1/twilio-webhook"
///   forward_errors: false
///
/// http:
///   timeout_seconds: 10
///   connect_retries: 2
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub store: Option<StoreYaml>,
    pub twilio: Option<TwilioYaml>,
    pub http: Option<HttpYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub error_status_mode: Option<String>,
}

/// Supabase data store configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StoreYaml {
    pub url: Option<String>,
    pub service_role_key: Option<String>,
}

/// Twilio configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TwilioYaml {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub api_base_url: Option<String>,
    pub fallback_from_number: Option<String>,
    pub webhook_path: Option<String>,
    pub forward_errors: Option<bool>,
}

/// Outbound HTTP configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HttpYaml {
    pub timeout_seconds: Option<u64>,
    pub connect_retries: Option<u32>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
