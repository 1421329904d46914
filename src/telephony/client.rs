use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::retry::ConnectRetryPolicy;
use crate::config::ServerConfig;
use crate::utils::cap_error_body;

const API_VERSION: &str = "2010-04-01";

/// Twilio account credentials used for HTTP Basic authentication
#[derive(Clone, PartialEq, Eq)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
}

impl std::fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

impl TwilioCredentials {
    /// Read credentials from server configuration
    ///
    /// Returns `None` if either the account SID or the auth token is missing.
    pub fn from_config(config: &ServerConfig) -> Option<Self> {
        match (&config.twilio_account_sid, &config.twilio_auth_token) {
            (Some(account_sid), Some(auth_token)) => Some(Self {
                account_sid: account_sid.clone(),
                auth_token: auth_token.clone(),
            }),
            _ => None,
        }
    }
}

/// Form body for Twilio's call-creation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundCall {
    /// Origin number, must be owned by the Twilio account
    pub from: String,
    /// Destination number
    pub to: String,
    /// Address Twilio fetches TwiML instructions from once the call connects
    pub url: String,
    /// HTTP method Twilio uses against `url`
    pub method: String,
}

impl OutboundCall {
    pub fn new(from: impl Into<String>, to: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            url: url.into(),
            method: "POST".to_string(),
        }
    }
}

/// Subset of Twilio's Call resource returned on creation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallResource {
    pub sid: String,
    pub status: String,
}

/// Twilio's JSON error body
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

/// Errors raised while creating a call
#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    /// Twilio answered with a non-success status
    #[error("Twilio rejected the call ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: StatusCode,
        code: Option<i64>,
        message: Option<String>,
    },

    /// Request could not be sent or the response could not be decoded
    #[error("Twilio request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Twilio REST client for creating outbound calls
#[derive(Clone)]
pub struct TwilioClient {
    client: Client,
    base_url: String,
    credentials: TwilioCredentials,
    retry_policy: ConnectRetryPolicy,
}

impl std::fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

impl TwilioClient {
    pub fn new(client: Client, base_url: impl Into<String>, credentials: TwilioCredentials) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            retry_policy: ConnectRetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: ConnectRetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn calls_endpoint(&self) -> String {
        format!(
            "{}/{}/Accounts/{}/Calls.json",
            self.base_url, API_VERSION, self.credentials.account_sid
        )
    }

    /// Create an outbound call
    ///
    /// Each successful invocation places a real call. The request is only
    /// re-sent when the previous attempt never connected.
    pub async fn create_call(&self, call: &OutboundCall) -> Result<CallResource, TwilioError> {
        let url = self.calls_endpoint();
        let mut retries = 0;

        let response = loop {
            let result = self
                .client
                .post(&url)
                .basic_auth(
                    &self.credentials.account_sid,
                    Some(&self.credentials.auth_token),
                )
                .form(call)
                .send()
                .await;

            match result {
                Ok(response) => break response,
                Err(e) if self.retry_policy.should_retry(&e, retries) => {
                    retries += 1;
                    let delay = self.retry_policy.delay_for(retries);
                    warn!(
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Could not connect to Twilio, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(TwilioError::Http(e)),
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<TwilioErrorBody>(&body).ok();
            let (code, message) = match parsed {
                Some(parsed) => (parsed.code, parsed.message.map(cap_error_body)),
                None if body.trim().is_empty() => (None, None),
                None => (None, Some(cap_error_body(body))),
            };
            return Err(TwilioError::Rejected {
                status,
                code,
                message,
            });
        }

        let resource: CallResource = response.json().await?;
        debug!(call_sid = %resource.sid, status = %resource.status, "Twilio call created");
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{basic_auth, body_string_contains, header, method, path},
    };

    fn credentials() -> TwilioCredentials {
        TwilioCredentials {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
        }
    }

    fn sample_call() -> OutboundCall {
        OutboundCall::new(
            "+15005550006",
            "+15551234567",
            "https://project.supabase.co/functions/v1/twilio-webhook",
        )
    }

    #[test]
    fn test_credentials_from_config() {
        let config = ServerConfig {
            twilio_account_sid: Some("AC123".to_string()),
            ..Default::default()
        };
        assert!(TwilioCredentials::from_config(&config).is_none());

        let config = ServerConfig {
            twilio_account_sid: Some("AC123".to_string()),
            twilio_auth_token: Some("token".to_string()),
            ..Default::default()
        };
        assert_eq!(TwilioCredentials::from_config(&config), Some(credentials()));
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("AC123"));
        assert!(!debug.contains("\"token\""));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_outbound_call_form_fields() {
        let encoded = serde_json::to_value(sample_call()).unwrap();
        assert_eq!(encoded["From"], "+15005550006");
        assert_eq!(encoded["To"], "+15551234567");
        assert_eq!(encoded["Method"], "POST");
        assert!(encoded["Url"].as_str().unwrap().ends_with("/twilio-webhook"));
    }

    #[tokio::test]
    async fn test_create_call_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Calls.json"))
            .and(basic_auth("AC123", "token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("From=%2B15005550006"))
            .and(body_string_contains("To=%2B15551234567"))
            .and(body_string_contains("Method=POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "sid": "CA123",
                "status": "queued",
                "direction": "outbound-api"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TwilioClient::new(Client::new(), server.uri(), credentials());
        let call = client.create_call(&sample_call()).await.unwrap();

        assert_eq!(
            call,
            CallResource {
                sid: "CA123".to_string(),
                status: "queued".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_create_call_rejected_with_twilio_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Calls.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 21211,
                "message": "The 'To' number +1555 is not a valid phone number.",
                "status": 400
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TwilioClient::new(Client::new(), server.uri(), credentials());
        let err = client.create_call(&sample_call()).await.unwrap_err();

        match err {
            TwilioError::Rejected {
                status,
                code,
                message,
            } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(code, Some(21211));
                assert!(message.unwrap().contains("not a valid phone number"));
            }
            other => panic!("Expected Rejected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_call_rejected_with_plain_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let client = TwilioClient::new(Client::new(), server.uri(), credentials());
        let err = client.create_call(&sample_call()).await.unwrap_err();

        match err {
            TwilioError::Rejected { status, message, .. } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(message.as_deref(), Some("upstream unavailable"));
            }
            other => panic!("Expected Rejected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_call_timeout_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "sid": "CA1", "status": "queued" }))
                    .set_delay(Duration::from_secs(5)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let http = Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let client = TwilioClient::new(http, server.uri(), credentials())
            .with_retry_policy(ConnectRetryPolicy::new(3));

        let err = client.create_call(&sample_call()).await.unwrap_err();
        match err {
            TwilioError::Http(e) => assert!(e.is_timeout()),
            other => panic!("Expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_call_connect_failure_exhausts_retries() {
        let client = TwilioClient::new(Client::new(), "http://127.0.0.1:1", credentials())
            .with_retry_policy(ConnectRetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(1),
            });

        let err = client.create_call(&sample_call()).await.unwrap_err();
        match err {
            TwilioError::Http(e) => assert!(e.is_connect()),
            other => panic!("Expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_call_malformed_success_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "status": "queued" })))
            .mount(&server)
            .await;

        let client = TwilioClient::new(Client::new(), server.uri(), credentials());
        let err = client.create_call(&sample_call()).await.unwrap_err();
        assert!(matches!(err, TwilioError::Http(_)));
    }
}
