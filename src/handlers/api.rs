use axum::{http::StatusCode, response::Json};
use serde_json::{Value, json};

/// Health check handler
/// Reports that the server is up; does not contact Supabase or Twilio
pub async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "OK",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
