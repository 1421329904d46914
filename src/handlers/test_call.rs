//! Test call handler
//!
//! Places a real outbound call from an agent's configured number to a number
//! supplied by the caller, so the agent's voice setup can be tried end to end.
//! Every successful request rings a phone; nothing is deduplicated.

use axum::{
    body::Bytes,
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;
use crate::store::{AgentRecord, StoreError};
use crate::telephony::{OutboundCall, TwilioError};
use crate::utils::validate_phone_number;

pub const SUCCESS_MESSAGE: &str = "Test call initiated successfully";
pub const INITIATION_FAILED_MESSAGE: &str = "Failed to initiate test call";
pub const PREFLIGHT_BODY: &str = "ok";
pub const AGENT_LOOKUP_FAILED_MESSAGE: &str = "Failed to look up agent";

/// Request body for initiating a test call
///
/// # Example
/// ```json
/// {
///   "agentId": "5f0c1d2e-8a43-4c55-9d0e-3b1f6a7c8d90",
///   "testPhoneNumber": "+15551234567"
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCallRequest {
    pub agent_id: String,
    pub test_phone_number: String,
}

/// Response for a successfully initiated test call
///
/// `call_sid` and `status` are copied verbatim from Twilio's response.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestCallResponse {
    pub call_sid: String,
    pub status: String,
    pub message: String,
}

/// Handler for OPTIONS /test-call
///
/// CORS headers are attached by the router layer; the body is never read.
pub async fn test_call_preflight() -> impl IntoResponse {
    (StatusCode::OK, PREFLIGHT_BODY)
}

/// Handler for POST (and any other non-OPTIONS method on) /test-call
///
/// The body is taken as raw bytes so malformed JSON reaches the same
/// `{ "error": ... }` shape as every other failure.
///
/// # Flow
/// 1. Parse and validate `agentId` and `testPhoneNumber`
/// 2. Resolve the data store client from configuration
/// 3. Load the agent and its profile's origin number
/// 4. Resolve Twilio credentials from configuration
/// 5. Create the call through Twilio
/// 6. Return the call SID and status reported by Twilio
pub async fn initiate_test_call(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match place_test_call(&state, &body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response_with(state.config.error_status_mode),
    }
}

async fn place_test_call(state: &AppState, body: &[u8]) -> AppResult<TestCallResponse> {
    let (agent_id, to_number) = parse_request(body)?;

    info!(agent_id = %agent_id, to_phone_number = %to_number, "Test call request received");

    let store = state.store().ok_or_else(|| {
        AppError::Misconfigured("Supabase credentials not configured".to_string())
    })?;

    let agent = store
        .find_agent(&agent_id)
        .await
        .map_err(|e| store_error(&agent_id, e))?
        .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))?;

    let twilio = state.twilio().ok_or_else(|| {
        AppError::Misconfigured("Twilio credentials not configured".to_string())
    })?;

    let from_number = resolve_origin_number(&agent, &state.config)?;

    // Always Some here: the store client above requires the Supabase URL
    let webhook_url = state.config.twilio_webhook_url().ok_or_else(|| {
        AppError::Misconfigured("Supabase URL not configured".to_string())
    })?;

    info!(
        agent_id = %agent_id,
        from_phone_number = %from_number,
        to_phone_number = %to_number,
        webhook_url = %webhook_url,
        "Initiating Twilio test call"
    );

    let call = OutboundCall::new(from_number, to_number, webhook_url);
    let created = twilio
        .create_call(&call)
        .await
        .map_err(|e| twilio_error(&agent_id, e, state.config.twilio_forward_errors))?;

    info!(
        agent_id = %agent_id,
        call_sid = %created.sid,
        status = %created.status,
        "Test call initiated"
    );

    Ok(TestCallResponse {
        call_sid: created.sid,
        status: created.status,
        message: SUCCESS_MESSAGE.to_string(),
    })
}

/// Parse the request body into a trimmed agent id and a validated destination
fn parse_request(body: &[u8]) -> AppResult<(String, String)> {
    let request: TestCallRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;

    let agent_id = request.agent_id.trim();
    if agent_id.is_empty() {
        return Err(AppError::BadRequest("agentId cannot be empty".to_string()));
    }

    let to_number = validate_phone_number(&request.test_phone_number)
        .map_err(|reason| AppError::BadRequest(format!("Invalid testPhoneNumber: {reason}")))?;

    Ok((agent_id.to_string(), to_number))
}

/// Pick the origin number: the agent's profile number, else the configured fallback
fn resolve_origin_number(agent: &AgentRecord, config: &ServerConfig) -> AppResult<String> {
    if let Some(number) = agent.origin_number() {
        return Ok(number.to_string());
    }

    match &config.twilio_fallback_from_number {
        Some(fallback) => {
            warn!(
                agent_id = %agent.id,
                from_phone_number = %fallback,
                "Agent profile has no phone number, using configured fallback"
            );
            Ok(fallback.clone())
        }
        None => Err(AppError::Misconfigured(
            "Agent has no phone number configured".to_string(),
        )),
    }
}

fn store_error(agent_id: &str, err: StoreError) -> AppError {
    error!(agent_id = %agent_id, error = %err, "Agent lookup failed");
    AppError::InternalServerError(AGENT_LOOKUP_FAILED_MESSAGE.to_string())
}

fn twilio_error(agent_id: &str, err: TwilioError, forward_details: bool) -> AppError {
    match err {
        TwilioError::Rejected {
            status,
            code,
            message,
        } => {
            error!(
                agent_id = %agent_id,
                status = %status,
                twilio_code = ?code,
                twilio_message = ?message,
                "Twilio rejected test call"
            );
            match message {
                Some(detail) if forward_details => {
                    AppError::Upstream(format!("{INITIATION_FAILED_MESSAGE}: {detail}"))
                }
                _ => AppError::Upstream(INITIATION_FAILED_MESSAGE.to_string()),
            }
        }
        TwilioError::Http(e) => {
            error!(agent_id = %agent_id, error = %e, "Twilio request failed");
            AppError::InternalServerError(INITIATION_FAILED_MESSAGE.to_string())
        }
    }
}
