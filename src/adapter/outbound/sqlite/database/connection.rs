//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, migration support, and per-connection
//! pragma configuration for SQLite databases.

use std::time::Duration;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{Error, Result};
use crate::infrastructure::config::database::DatabaseConfig;

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Applies pragmas to every connection the pool opens.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        configure_sqlite_connection(conn, self.busy_timeout_ms)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a connection pool from the database configuration.
///
/// Callers block in `pool.get()` for up to `connection_timeout_secs` when
/// every connection is checked out.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(&config.url);
    Pool::builder()
        .max_size(config.pool_max_size)
        .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connection_customizer(Box::new(SqlitePragmas {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
        .build(manager)
        .map_err(|e| Error::Connection(e.to_string()))
}

/// Run all pending database migrations.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Connection(e.to_string()))?;
    Ok(())
}

/// Configure SQLite connection pragmas.
///
/// The busy timeout goes first so the WAL switch waits on a locked file
/// instead of failing.
///
/// # Errors
/// Returns an error if a pragma fails to apply.
pub fn configure_sqlite_connection(
    conn: &mut SqliteConnection,
    busy_timeout_ms: u32,
) -> QueryResult<()> {
    diesel::sql_query(format!("PRAGMA busy_timeout = {busy_timeout_ms}")).execute(conn)?;
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(conn)?;
    diesel::sql_query("PRAGMA journal_mode = WAL").execute(conn)?;
    Ok(())
}
