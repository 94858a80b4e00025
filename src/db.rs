use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, PoolError};
use diesel::sqlite::SqliteConnection;

pub type Pool = diesel::r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// Pragmas applied to every pooled connection. SQLite rejects interleaved
/// writers immediately unless a busy timeout is set, and WAL keeps readers
/// from blocking the writer.
#[derive(Debug)]
struct ConnectionPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA busy_timeout = 5000; \
             PRAGMA journal_mode = WAL; \
             PRAGMA foreign_keys = ON;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn build_pool(database_url: &str) -> Result<Pool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(ConnectionPragmas))
        .build(manager)
}

/// Create any missing tables. Runs on every server start against the
/// configured database file and is a no-op once the schema exists.
pub fn init_database(conn: &mut SqliteConnection) -> diesel::QueryResult<()> {
    conn.batch_execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            nickname TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS task_trees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            tree_date TEXT NOT NULL,
            tree_data TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(user_id, tree_date)
        );

        CREATE TABLE IF NOT EXISTS task_summaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            summary_date TEXT NOT NULL,
            summary_data TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(user_id, summary_date)
        );

        CREATE TABLE IF NOT EXISTS task_blueprints (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            root_id TEXT NOT NULL,
            blueprint_root TEXT NOT NULL,
            blueprint_tree TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users(id),
            UNIQUE(user_id, root_id)
        );

        CREATE TABLE IF NOT EXISTS work_times (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            work_date TEXT NOT NULL,
            total_time INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(user_id, work_date)
        );

        CREATE TABLE IF NOT EXISTS rest_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            rest_date TEXT NOT NULL,
            rest_data TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users(id),
            UNIQUE(user_id, rest_date)
        );

        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            note_date TEXT NOT NULL,
            note_content TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(user_id, note_date)
        );",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::prelude::*;

    #[test]
    fn test_init_database_is_idempotent() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("init_test.db");
        let mut conn = SqliteConnection::establish(db_path.to_str().expect("utf-8 path"))
            .expect("open database");

        init_database(&mut conn).expect("first init");
        init_database(&mut conn).expect("second init");
    }

    #[test]
    fn test_pool_applies_pragmas() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("pragma_test.db");
        let pool = build_pool(db_path.to_str().expect("utf-8 path")).expect("build pool");

        // If the customizer failed, checkout itself would error.
        let mut conn = pool.get().expect("checkout connection");
        init_database(&mut conn).expect("init schema");
    }
}
