use campus_assistant::{
    api::{start_server, ApiState},
    config::AssistantConfig,
    knowledge,
    selector::ResponseSelector,
    state::InMemorySessionStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = AssistantConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    // Fail fast on an inconsistent response table
    knowledge::ensure_valid()?;

    info!("🚀 Campus Assistant - API Server");
    info!("📍 Port: {}", config.port);
    info!("⏱️  Typing delay: {:?}", config.typing_delay);
    info!(
        "🗂️  Sessions: capacity {}, idle TTL {:?}",
        config.session_capacity, config.session_idle_ttl
    );

    let selector = ResponseSelector::default();
    let sessions = InMemorySessionStore::new(selector, config.typing_delay)
        .with_capacity(config.session_capacity)
        .with_idle_ttl(config.session_idle_ttl);

    let state = ApiState {
        sessions: Arc::new(sessions),
        selector,
    };

    info!("📡 Starting API server...");
    start_server(state, config.port).await?;

    Ok(())
}
