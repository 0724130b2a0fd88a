use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use once_cell::sync::Lazy;
use std::env;
use tracing::info;

pub use configs::DatabaseConfig;

pub static DATABASE_URL: Lazy<String> = Lazy::new(|| {
    // Load .env if present
    let _ = dotenvy::dotenv();
    env::var("DATABASE_URL").unwrap_or_else(|_| configs::DEFAULT_DATABASE_URL.to_string())
});

/// Connect using `DATABASE_URL` (or in-memory SQLite) and default pool settings.
pub async fn connect() -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig { url: DATABASE_URL.clone(), ..DatabaseConfig::default() };
    connect_with_config(&cfg).await
}

/// Connect with explicit pool settings.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    cfg.validate()?;
    let mut opt = ConnectOptions::new(cfg.url.clone());
    if cfg.is_in_memory() {
        // every pooled connection would otherwise open its own empty database
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .idle_timeout(cfg.idle_timeout())
            .max_lifetime(cfg.max_lifetime());
    }
    opt.connect_timeout(cfg.connect_timeout())
        .acquire_timeout(cfg.acquire_timeout())
        .sqlx_logging(cfg.sqlx_logging);

    let db = Database::connect(opt).await?;
    info!(
        backend = ?db.get_database_backend(),
        in_memory = cfg.is_in_memory(),
        max_connections = cfg.max_connections,
        "database connected"
    );
    Ok(db)
}
