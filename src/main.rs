use anyhow::Context;
use camp_booking::{app, config::Config, session_store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camp_booking=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    let state = AppState::from_config(&config);

    tokio::spawn(session_store::start_session_sweeper(state.sessions.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(
        "camp-booking listening on {} (bookings at {})",
        config.bind_addr,
        config.booking_api_url
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}
