//! Database connection management

use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

use crate::operations::StoreError;

pub type DbPool = Pool;

/// Create a PostgreSQL connection pool.
///
/// The pool is passed into the pipeline by reference; each job checks out
/// its own client and never shares it across jobs.
pub fn create_pool(
    host: &str,
    port: u16,
    database: &str,
    user: &str,
    password: &str,
    max_connections: u32,
) -> Result<DbPool, StoreError> {
    let mut cfg = Config::new();
    cfg.host = Some(host.to_string());
    cfg.port = Some(port);
    cfg.dbname = Some(database.to_string());
    cfg.user = Some(user.to_string());
    cfg.password = Some(password.to_string());
    cfg.pool = Some(PoolConfig::new(max_connections as usize));

    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    let pool = cfg
        .create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    Ok(pool)
}

/// Test database connection
pub async fn test_connection(pool: &DbPool) -> Result<(), StoreError> {
    let client = pool.get().await?;
    let row = client.query_one("SELECT 1 as test", &[]).await?;
    let test: i32 = row.get(0);

    if test == 1 {
        Ok(())
    } else {
        Err(StoreError::Connection(
            "database connection test failed".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_follows_max_connections() {
        let pool = create_pool("localhost", 5432, "landmark", "landmark_user", "landmark_pass", 3)
            .unwrap();
        assert_eq!(pool.status().max_size, 3);
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL to be running
    async fn test_create_pool() {
        let pool =
            create_pool("localhost", 5432, "landmark", "landmark_user", "landmark_pass", 10)
                .unwrap();
        assert!(test_connection(&pool).await.is_ok());
    }
}
