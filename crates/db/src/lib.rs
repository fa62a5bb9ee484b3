use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::{ConnectionTrait, DbErr as DatabaseError, TransactionTrait};

#[derive(Clone)]
pub struct DBService {
    pub pool: DatabaseConnection,
}

impl DBService {
    /// Connect to `database_url` and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_string());
        options
            .connect_timeout(Duration::from_secs(30))
            .sqlx_logging(false);

        // A pooled in-memory sqlite would hand every connection its own
        // empty database.
        if database_url.contains(":memory:") {
            options.max_connections(1).min_connections(1);
        }

        let pool = Database::connect(options).await?;
        db_migration::Migrator::up(&pool, None).await?;
        Ok(DBService { pool })
    }
}
