use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dispatch_audit::api::AuditApi;
use dispatch_audit::audit::AuditLogger;
use dispatch_audit::config::AppConfig;
use dispatch_audit::database::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dispatch_audit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting dispatch audit ledger");

    let config = AppConfig::load()?;
    info!("Configuration loaded");

    let database = Database::new(&config.database_url).await?;
    info!("Database connected");

    database.run_migrations().await?;
    info!("Database migrations completed");

    let logger = AuditLogger::new(database.pool.clone());
    let result = logger.verify_integrity().await;
    info!("Startup integrity check: {}", result.summary());

    let app = AuditApi::new(logger, config.audit.clone())
        .router()
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).into_inner());

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
