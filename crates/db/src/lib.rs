//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The transactional [`SeaOrmOrderStore`] behind the approval service
//! - Read-side repositories for lists and reports
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;
mod store;

pub use repositories::{CustomerRepository, HistoryRepository, OrderRepository};
pub use store::{SeaOrmOrderStore, SeaOrmUnit};

use std::time::Duration;

use playdesk_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);
    Database::connect(options).await
}
