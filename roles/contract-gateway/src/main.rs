use std::sync::Arc;
use tracing::info;

use contract_gateway::config::Config;
use contract_gateway::webhook::WebhookClient;
use contract_gateway::{AppState, BoxError};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_args()?;
    info!("Starting contract gateway ({} mode)", config.mode);
    info!("Webhook URL: {}", config.webhook.url);
    info!(
        "Webhook timeouts: fetch {:?}, submit {:?}",
        config.webhook.fetch_timeout, config.webhook.submit_timeout
    );
    if let Some(dir) = &config.static_dir {
        info!("Static bundle directory: {}", dir.display());
    }

    let state = Arc::new(AppState {
        webhook: WebhookClient::new(config.webhook.clone())?,
        mode: config.mode,
        static_dir: config.static_dir.clone(),
    });

    contract_gateway::web::run_http_server(config.listen_address, state).await
}
