use url::Url;

use super::ServerConfig;
use crate::utils::validate_phone_number;

/// Validate a complete configuration
///
/// Credentials may be absent; the test-call handler reports that per request.
/// Values that are present must be usable, otherwise startup fails.
pub fn validate_config(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(supabase_url) = &config.supabase_url {
        validate_http_url("SUPABASE_URL", supabase_url)?;
    }
    validate_http_url("TWILIO_API_BASE_URL", &config.twilio_api_base_url)?;
    validate_fallback_number(&config.twilio_fallback_from_number)?;
    validate_webhook_path(&config.twilio_webhook_path)?;

    if config.http_timeout_seconds == 0 {
        return Err("HTTP_TIMEOUT_SECONDS must be greater than zero".into());
    }

    Ok(())
}

/// Validate that a value is an absolute http(s) URL
pub fn validate_http_url(name: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = Url::parse(value).map_err(|e| format!("{name} is not a valid URL: {e}"))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!("{name} must use http or https, got '{scheme}'").into());
        }
    }

    if url.host_str().is_none() {
        return Err(format!("{name} must include a host").into());
    }

    Ok(())
}

/// Validate the optional fallback origin number
pub fn validate_fallback_number(number: &Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(number) = number
        && let Err(reason) = validate_phone_number(number)
    {
        return Err(format!("TWILIO_FALLBACK_FROM_NUMBER is invalid: {reason}").into());
    }

    Ok(())
}

fn validate_webhook_path(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if path.trim().is_empty() {
        return Err("TWILIO_WEBHOOK_PATH cannot be empty".into());
    }
    if path.contains("://") {
        return Err("TWILIO_WEBHOOK_PATH must be a path, not a full URL".into());
    }
    Ok(())
}
