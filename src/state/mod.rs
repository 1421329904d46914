use std::sync::Arc;

use reqwest::Client;

use crate::config::ServerConfig;
use crate::store::SupabaseClient;
use crate::telephony::{ConnectRetryPolicy, TwilioClient, TwilioCredentials};

/// Application state that can be shared across handlers
///
/// Immutable after construction. Clients for the data store and Twilio are
/// derived from `config` per request, so a request always sees exactly the
/// configuration the server was started with.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: ServerConfig,
    /// Pooled HTTP client with the configured timeout, shared by all outbound calls
    pub http_client: Client,
}

impl AppState {
    /// Build the shared state
    ///
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed (e.g. the TLS
    /// backend fails to initialize).
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(config.http_timeout())
            .pool_max_idle_per_host(10)
            .user_agent(concat!("callcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Arc::new(Self {
            config,
            http_client,
        }))
    }

    /// Data store client, if the Supabase URL and key are configured
    pub fn store(&self) -> Option<SupabaseClient> {
        SupabaseClient::from_config(&self.config, self.http_client.clone())
    }

    /// Twilio client, if the account SID and auth token are configured
    pub fn twilio(&self) -> Option<TwilioClient> {
        TwilioCredentials::from_config(&self.config).map(|credentials| {
            TwilioClient::new(
                self.http_client.clone(),
                self.config.twilio_api_base_url.clone(),
                credentials,
            )
            .with_retry_policy(ConnectRetryPolicy::new(self.config.http_connect_retries))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_absent_without_config() {
        let state = AppState::new(ServerConfig::default()).unwrap();
        assert!(state.store().is_none());
        assert!(state.twilio().is_none());
    }

    #[test]
    fn test_clients_present_with_config() {
        let state = AppState::new(ServerConfig {
            supabase_url: Some("https://project.supabase.co".to_string()),
            supabase_service_role_key: Some("service-role".to_string()),
            twilio_account_sid: Some("AC123".to_string()),
            twilio_auth_token: Some("token".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert!(state.store().is_some());
        assert!(state.twilio().is_some());
    }
}
