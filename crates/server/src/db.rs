use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use thesis_migration::{Migrator, MigratorTrait};
use tracing::info;

pub async fn connect_and_migrate(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);

    // Every pooled connection to an in-memory SQLite database is a separate database.
    if database_url.starts_with("sqlite::memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;

    Migrator::up(&db, None).await?;
    info!("database migrations applied");

    Ok(db)
}
