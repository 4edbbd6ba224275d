use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

/// Errors from the database layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("{0} {1} not found")]
    NotFound(&'static str, String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Lazily-initialized shared connection pool. The pool is created on first
/// use so a missing DATABASE_URL degrades to a typed error per request
/// instead of aborting startup.
pub struct Database {
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl Database {
    fn instance() -> &'static Database {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<Database> = OnceLock::new();
        INSTANCE.get_or_init(|| Database {
            pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the shared pool, creating it on first call.
    pub async fn pool() -> Result<PgPool, DbError> {
        let this = Self::instance();

        // Fast path: already connected
        {
            let guard = this.pool.read().await;
            if let Some(pool) = guard.as_ref() {
                return Ok(pool.clone());
            }
        }

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| DbError::ConfigMissing("DATABASE_URL"))?;

        let cfg = &crate::config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .connect(&url)
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        {
            let mut guard = this.pool.write().await;
            *guard = Some(pool.clone());
        }

        info!("Created database pool");
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity.
    pub async fn health_check() -> Result<(), DbError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown).
    pub async fn close() {
        let this = Self::instance();
        let mut guard = this.pool.write().await;
        if let Some(pool) = guard.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}

impl DbError {
    /// True when the store itself is unreachable, as opposed to a query that
    /// ran and failed. Drives the 503 mapping and the reference fallback.
    pub fn is_unavailable(&self) -> bool {
        match self {
            DbError::ConfigMissing(_) | DbError::ConnectionError(_) => true,
            DbError::Sqlx(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailability_classification() {
        assert!(DbError::ConfigMissing("DATABASE_URL").is_unavailable());
        assert!(DbError::ConnectionError("refused".into()).is_unavailable());
        assert!(DbError::Sqlx(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(!DbError::NotFound("employee", "1".into()).is_unavailable());
        assert!(!DbError::Sqlx(sqlx::Error::RowNotFound).is_unavailable());
    }
}
