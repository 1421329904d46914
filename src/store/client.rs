use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::ServerConfig;
use crate::utils::cap_error_body;

const AGENTS_TABLE: &str = "agents";
const AGENT_WITH_PROFILE: &str = "id,profiles(twilio_phone_number)";
/// Postgres `invalid_text_representation`, raised when the id is not a valid uuid
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Errors raised while reading from the data store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Request could not be sent or the response could not be read
    #[error("Data store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Store answered with a non-success status
    #[error("Data store returned {0}: {1}")]
    Status(StatusCode, String),
}

/// PostgREST's JSON error body
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
}

/// Profile owning an agent; only the origin number is selected
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileRecord {
    pub twilio_phone_number: Option<String>,
}

/// Agent row joined with its owning profile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    #[serde(rename = "profiles")]
    pub profile: Option<ProfileRecord>,
}

impl AgentRecord {
    /// Origin number stored on the profile, ignoring blank values
    pub fn origin_number(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|p| p.twilio_phone_number.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Minimal PostgREST client authenticated with the Supabase service-role key
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_role_key: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .field("service_role_key", &"<redacted>")
            .finish()
    }
}

impl SupabaseClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_role_key: service_role_key.into(),
        }
    }

    /// Build a client from server configuration
    ///
    /// Returns `None` unless both the URL and the service-role key are set.
    pub fn from_config(config: &ServerConfig, client: Client) -> Option<Self> {
        match (&config.supabase_url, &config.supabase_service_role_key) {
            (Some(url), Some(key)) => Some(Self::new(client, url.clone(), key.clone())),
            _ => None,
        }
    }

    fn rest_endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Look up an agent by primary key, joined with its profile's origin number
    ///
    /// Returns `Ok(None)` when no such agent exists, including when the id
    /// cannot be a primary key at all.
    pub async fn find_agent(&self, agent_id: &str) -> Result<Option<AgentRecord>, StoreError> {
        let id_filter = format!("eq.{agent_id}");

        let response = self
            .client
            .get(self.rest_endpoint(AGENTS_TABLE))
            .query(&[
                ("select", AGENT_WITH_PROFILE),
                ("id", id_filter.as_str()),
                ("limit", "1"),
            ])
            .header("apikey", &self.service_role_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.service_role_key))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            if status == StatusCode::BAD_REQUEST && is_invalid_id(&body) {
                tracing::debug!(
                    agent_id = %agent_id,
                    "Agent id is not a valid key, treating as not found"
                );
                return Ok(None);
            }

            return Err(StoreError::Status(status, cap_error_body(body)));
        }

        let mut rows: Vec<AgentRecord> = response.json().await?;
        tracing::debug!(agent_id = %agent_id, rows = rows.len(), "Agent lookup completed");

        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }
}

fn is_invalid_id(body: &str) -> bool {
    serde_json::from_str::<PostgrestError>(body)
        .ok()
        .and_then(|e| e.code)
        .is_some_and(|code| code == INVALID_TEXT_REPRESENTATION)
}
