use std::{sync::Arc, time::Duration};

use migration::{Migrator, MigratorTrait};
use server::{RateSource, ServerState, TracingInvalidator};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "centa={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;
    let engine = engine::Engine::builder()
        .database(db)
        .invalidator(Arc::new(TracingInvalidator))
        .build()
        .await?;
    let rates = RateSource::new(
        settings.rates.url,
        Duration::from_secs(settings.rates.ttl_secs),
    );

    let state = ServerState {
        engine: Arc::new(engine),
        rates: Arc::new(rates),
    };
    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    server::run(state, &format!("{}:{}", bind, settings.server.port)).await;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
