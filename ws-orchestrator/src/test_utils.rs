use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// Helper to create an in-memory test database with migrations applied
///
/// Each SQLite `:memory:` connection is its own database, so the pool is
/// pinned to a single connection.
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    crate::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
