

use crate::db::connect;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// Setup test database with migrations
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
