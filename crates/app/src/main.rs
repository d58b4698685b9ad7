use std::time::Duration;

use engine::{Notifier, NotifierConfig};
use migration::{Migrator, MigratorTrait};
use server::AuthConfig;
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "procurement={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;

    let notifier = Notifier::spawn(NotifierConfig {
        default_url: settings.webhook.url.clone(),
        timeout: Duration::from_secs(settings.webhook.timeout_secs),
        queue_capacity: settings.webhook.queue_capacity,
    })?;
    match &settings.webhook.url {
        Some(url) => tracing::info!("default webhook endpoint: {url}"),
        None => tracing::info!("no default webhook endpoint configured"),
    }

    let engine = engine::Engine::builder()
        .database(db)
        .notifier(notifier.clone())
        .build()
        .await?;

    let auth = AuthConfig {
        jwt_secret: settings.auth.jwt_secret.clone(),
        token_ttl: Duration::from_secs(settings.auth.token_ttl_hours.saturating_mul(3600)),
    };

    let bind = settings
        .server
        .bind
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if let Err(err) = server::run_with_listener(engine, auth, listener).await {
        tracing::error!("server failed: {err}");
    }

    notifier.shutdown().await;
    let stats = notifier.stats();
    tracing::info!(
        delivered = stats.delivered,
        failed = stats.failed,
        dropped = stats.dropped,
        skipped = stats.skipped,
        "webhook notifier stopped"
    );

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
