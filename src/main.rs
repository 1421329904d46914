use std::env;
use std::path::PathBuf;

use anyhow::anyhow;
use tokio::net::TcpListener;

use callcheck::{AppState, ServerConfig, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Handle CLI options
    let mut args = env::args();
    let _ = args.next();
    let mut config_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                config_path = Some(PathBuf::from(path));
            }
            other => {
                anyhow::bail!("Unknown option '{other}'. Supported options: --config <file>");
            }
        }
    }

    // Load configuration
    let config = match &config_path {
        Some(path) => ServerConfig::from_file(path),
        None => ServerConfig::from_env(),
    }
    .map_err(|e| anyhow!(e.to_string()))?;

    if config.supabase_url.is_none() || config.supabase_service_role_key.is_none() {
        tracing::warn!("Supabase is not configured; test calls will fail until it is");
    }
    if config.twilio_account_sid.is_none() || config.twilio_auth_token.is_none() {
        tracing::warn!("Twilio credentials are not configured; test calls will fail until they are");
    }

    let address = config.address();
    tracing::info!(
        address = %address,
        error_status_mode = %config.error_status_mode,
        "Starting server"
    );

    // Create application state
    let app_state = AppState::new(config)?;

    let app = routes::api::create_app(app_state);

    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Server listening on {address}");

    axum::serve(listener, app).await?;

    Ok(())
}
