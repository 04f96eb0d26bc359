use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wraith::config::Config;
use wraith::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wraith=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Starting Wraith server on {}:{}", config.host, config.port);
    info!(
        "Upstream: {} (api key: {}), fast venue: {}",
        config.coingecko_base_url,
        if config.coingecko_api_key.is_some() { "set" } else { "none" },
        config.binance_base_url
    );

    let addr = format!("{}:{}", config.host, config.port);
    let app = wraith::app(AppState::new(&config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Wraith server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
