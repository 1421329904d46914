//! Twilio integration for placing outbound calls
//!
//! Only call creation is implemented. Call progress is reported by Twilio to
//! the webhook configured via `twilio_webhook_path`, which lives outside this
//! service.

mod client;
pub mod retry;

pub use client::{CallResource, OutboundCall, TwilioClient, TwilioCredentials, TwilioError};
pub use retry::ConnectRetryPolicy;
