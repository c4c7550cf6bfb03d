//! Temporary SQLite databases.
//!
//! `:memory:` gives every pooled connection its own database, so tests use a
//! file under the temp dir instead.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::adapter::outbound::sqlite::{create_pool, run_migrations, DbPool, SqliteOrderStore};
use crate::infrastructure::config::database::DatabaseConfig;

/// Migrated file-backed database removed on drop.
pub struct TempDb {
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("ordercache-{name}-{}.db", Uuid::new_v4()));
        let config = DatabaseConfig {
            url: path.display().to_string(),
            pool_max_size: 4,
            connection_timeout_secs: 5,
            ..DatabaseConfig::default()
        };
        let pool = create_pool(&config).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");
        Self { path, pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Connection string for configs that open their own pool.
    pub fn url(&self) -> String {
        self.path.display().to_string()
    }

    /// A store sharing this database's pool.
    pub fn store(&self) -> SqliteOrderStore {
        SqliteOrderStore::new(self.pool.clone())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        for suffix in ["-wal", "-shm"] {
            let mut side = self.path.clone().into_os_string();
            side.push(suffix);
            let _ = std::fs::remove_file(side);
        }
    }
}
