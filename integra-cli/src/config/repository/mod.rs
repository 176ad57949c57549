//! Repository layer for database operations

pub mod employees;
pub mod lists;
pub mod migrations;
pub mod uploads;

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    migrations::ensure_schema(&pool).await.unwrap();
    lists::seed_defaults(&pool).await.unwrap();
    pool
}
