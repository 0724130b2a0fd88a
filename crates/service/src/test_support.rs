#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    let mut cfg = DatabaseConfig::from_file().unwrap_or_else(DatabaseConfig::from_env);
    cfg.max_connections = cfg.max_connections.max(10);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout_secs = 10;
    cfg
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    common::utils::logging::init_test_logging();
    let cfg = test_config();

    // An in-memory database lives and dies with its connection, so every test migrates its own
    if cfg.is_in_memory() {
        let db = connect_with_config(&cfg).await?;
        migration::Migrator::up(&db, None).await?;
        return Ok(db);
    }

    let migrate_cfg = &cfg;
    MIGRATED
        .get_or_init(|| async move {
            let db = connect_with_config(migrate_cfg).await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
            drop(db);
        })
        .await;

    // Return a fresh connection for the current test's runtime
    let db = connect_with_config(&cfg).await?;
    Ok(db)
}
