use std::env;

use super::ServerConfig;
use super::merge::merge_config;
use super::validation::validate_config;

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads configuration from environment variables, with sensible defaults.
    /// Also loads from .env file if present using dotenvy.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Numeric or boolean environment variables are malformed
    /// - URLs or the fallback phone number are invalid
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = merge_config(None)?;
        validate_config(&config)?;

        tracing::debug!(
            supabase_configured = config.supabase_url.is_some(),
            twilio_configured = config.twilio_account_sid.is_some(),
            "Loaded configuration from environment"
        );

        Ok(config)
    }
}

/// Read an environment variable, treating blank values as unset
pub(super) fn var(name: &str) -> Option<String> {
    super::utils::non_empty(env::var(name).ok())
}
