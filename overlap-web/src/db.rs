//! SQLite pool and schema migrations.
//!
//! Every pooled connection enables foreign keys (membership rows cascade
//! with their index) and waits up to 5s on a locked database.

use crate::{DbPool, Error, Result};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

/// Build a connection pool over the sqlite database at `dburl`.
///
/// A `sqlite://` prefix is accepted and stripped.
pub fn build_pool(dburl: &str) -> Result<DbPool> {
    let path = dburl.trim_start_matches("sqlite://");
    let manager = ConnectionManager::<SqliteConnection>::new(path);
    let pool = r2d2::Pool::builder()
        .connection_timeout(Duration::from_secs(3))
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;
    Ok(pool)
}

/// Apply pending embedded migrations, returning how many ran.
pub fn run_migrations(pool: &DbPool) -> Result<usize> {
    let mut conn = pool.get()?;
    conn.batch_execute("PRAGMA journal_mode = WAL;")?;
    let applied = MigrationHarness::run_pending_migrations(&mut *conn, MIGRATIONS)
        .map_err(|e| Error::Migration(e.to_string()))?;
    for v in &applied {
        log::info!("applied migration {}", v);
    }
    Ok(applied.len())
}

/// Pool with migrations applied, as the server and tool expect it.
pub fn connect(dburl: &str) -> Result<DbPool> {
    let pool = build_pool(dburl)?;
    run_migrations(&pool)?;
    Ok(pool)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tempfile::TempDir;

    /// a migrated database in a temp dir, removed on drop
    pub struct TestDb {
        _dir: TempDir,
        pub pool: DbPool,
    }

    pub fn setup_db() -> TestDb {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("test.db");
        let pool = connect(&path.to_string_lossy()).expect("migrated pool");
        TestDb { _dir: dir, pool }
    }
}
