use super::env::var;
use super::utils::{non_empty, parse_bool};
use super::yaml::YamlConfig;
use super::{
    DEFAULT_HOST, DEFAULT_HTTP_CONNECT_RETRIES, DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_PORT,
    DEFAULT_TWILIO_API_BASE_URL, DEFAULT_TWILIO_WEBHOOK_PATH, ErrorStatusMode, ServerConfig,
};

/// Merge YAML configuration with environment variables
///
/// Priority order (highest to lowest):
/// 1. YAML configuration values
/// 2. Environment variables
/// 3. Default values
///
/// Passing `None` yields a pure environment configuration.
pub fn merge_config(
    yaml_config: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let yaml = yaml_config.unwrap_or_default();

    // Helper macro to get value with priority: YAML > ENV > Default
    macro_rules! get_value {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            non_empty($yaml_value)
                .or_else(|| var($env_var))
                .unwrap_or_else(|| $default.to_string())
        };
    }

    // Helper macro for optional values: YAML > ENV
    macro_rules! get_optional {
        ($env_var:expr, $yaml_value:expr) => {
            non_empty($yaml_value).or_else(|| var($env_var))
        };
    }

    // Helper macro for parsed values: YAML > ENV (parsed) > Default
    macro_rules! get_parsed {
        ($env_var:expr, $yaml_value:expr, $ty:ty, $default:expr) => {
            match $yaml_value {
                Some(value) => value,
                None => match var($env_var) {
                    Some(raw) => raw
                        .parse::<$ty>()
                        .map_err(|e| format!("Invalid {} environment variable: {e}", $env_var))?,
                    None => $default,
                },
            }
        };
    }

    let server = yaml.server.unwrap_or_default();
    let store = yaml.store.unwrap_or_default();
    let twilio = yaml.twilio.unwrap_or_default();
    let http = yaml.http.unwrap_or_default();

    // Server configuration
    let host = get_value!("HOST", server.host, DEFAULT_HOST);
    let port = get_parsed!("PORT", server.port, u16, DEFAULT_PORT);
    let error_status_mode = match get_optional!("ERROR_STATUS_MODE", server.error_status_mode) {
        Some(raw) => raw.parse::<ErrorStatusMode>()?,
        None => ErrorStatusMode::default(),
    };

    // Supabase configuration
    let supabase_url = get_optional!("SUPABASE_URL", store.url);
    let supabase_service_role_key =
        get_optional!("SUPABASE_SERVICE_ROLE_KEY", store.service_role_key);

    // Twilio configuration
    let twilio_account_sid = get_optional!("TWILIO_ACCOUNT_SID", twilio.account_sid);
    let twilio_auth_token = get_optional!("TWILIO_AUTH_TOKEN", twilio.auth_token);
    let twilio_api_base_url = get_value!(
        "TWILIO_API_BASE_URL",
        twilio.api_base_url,
        DEFAULT_TWILIO_API_BASE_URL
    );
    let twilio_fallback_from_number =
        get_optional!("TWILIO_FALLBACK_FROM_NUMBER", twilio.fallback_from_number);
    let twilio_webhook_path = get_value!(
        "TWILIO_WEBHOOK_PATH",
        twilio.webhook_path,
        DEFAULT_TWILIO_WEBHOOK_PATH
    );
    let twilio_forward_errors = match twilio.forward_errors {
        Some(value) => value,
        None => match var("TWILIO_FORWARD_ERRORS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                format!("Invalid TWILIO_FORWARD_ERRORS environment variable: '{raw}'")
            })?,
            None => false,
        },
    };

    // Outbound HTTP configuration
    let http_timeout_seconds = get_parsed!(
        "HTTP_TIMEOUT_SECONDS",
        http.timeout_seconds,
        u64,
        DEFAULT_HTTP_TIMEOUT_SECONDS
    );
    let http_connect_retries = get_parsed!(
        "HTTP_CONNECT_RETRIES",
        http.connect_retries,
        u32,
        DEFAULT_HTTP_CONNECT_RETRIES
    );

    Ok(ServerConfig {
        host,
        port,
        error_status_mode,
        supabase_url,
        supabase_service_role_key,
        twilio_account_sid,
        twilio_auth_token,
        twilio_api_base_url,
        twilio_fallback_from_number,
        twilio_webhook_path,
        twilio_forward_errors,
        http_timeout_seconds,
        http_connect_retries,
    })
}
