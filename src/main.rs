use anyhow::Context;
use trikona_directory::{AppConfig, AppState, app, database, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init(&config.logging)?;

    let db = database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.auto_create_schema {
        database::create_tables(&db)
            .await
            .context("failed to create schema")?;
    }

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(%address, "directory service listening");

    axum::serve(listener, app(AppState::new(db, config))).await?;
    Ok(())
}
