use acompanar::core::{AppState, Config, Mailer};
use acompanar::services::bootstrap_admin;
use acompanar::{create_router, jobs};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Logging: RUST_LOG o "info" por defecto
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Configuración desde .env / entorno
    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    config.print_info();

    // 3. Pool de conexiones y migraciones
    let opciones = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
        .connect_with(opciones)
        .await?;
    info!("Connected to database");

    sqlx::migrate!().run(&pool).await?;
    info!("Migrations applied");

    // 4. Directorio de evidencias
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // 5. Estado compartido
    let mailer = Mailer::from_config(&config)?;
    let state = Arc::new(AppState::new(pool, &config, mailer)?);
    bootstrap_admin(&state, &config).await?;

    // 6. Barrido diario de recordatorios en segundo plano
    tokio::spawn(jobs::start_recordatorios(
        state.clone(),
        config.reminder_hour_utc,
    ));

    // 7. Servidor HTTP
    let app = create_router(state);
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
