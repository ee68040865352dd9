use std::sync::Arc;

use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use review_highlighter::api::{self, AppState};
use review_highlighter::config::Config;
use review_highlighter::flagging::FlagLog;
use review_highlighter::ml::PredictionClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let client = PredictionClient::from_config(&config)?;
    let flags = FlagLog::open(&config.flag_log_path).await?;

    tracing::info!(
        endpoint = client.endpoint(),
        timeout = ?config.request_timeout,
        "prediction client ready"
    );

    let state = Arc::new(AppState { client, flags });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
