/// tg-whois - Telegram entity lookup service
///
/// Serves `/info?username=...` over HTTP, backed by one long-lived platform
/// session created at startup.
use tg_whois::{
    config::{LoggingConfig, ServerConfig},
    context::AppContext,
    server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (also reads .env)
    let config = ServerConfig::from_env()?;

    init_logging(&config.logging);
    tracing::info!("Starting tg-whois v{}", env!("CARGO_PKG_VERSION"));

    // Create application context (authenticates the platform session)
    let ctx = AppContext::new(config).await?;
    tracing::info!(backend = ?ctx.config.platform.backend, "Platform session started");

    // Start server
    server::serve(ctx).await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_new(&logging.level)
        .unwrap_or_else(|_| "tg_whois=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
