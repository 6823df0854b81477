//! # metier-db
//!
//! PostgreSQL database layer for metier.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for occupations, tasks, automation scores
//!   and user simulations
//! - Schema migrations (behind the `migrations` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use metier_db::{Database, Horizon, TaskRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/metier").await?;
//!     db.migrate().await?;
//!
//!     let tasks = db.tasks.list_with_scores("M1805", Horizon::Now).await?;
//!     println!("{} tasks", tasks.len());
//!     Ok(())
//! }
//! ```
pub mod occupations;
pub mod pool;
pub mod scores;
pub mod simulations;
pub mod tasks;

// Test fixtures for integration tests
// Note: Compiled whenever migrations are, so integration tests (in tests/) can use them
#[cfg(feature = "migrations")]
pub mod test_fixtures;

// Re-export core types
pub use metier_core::*;

// Re-export repository implementations
pub use occupations::PgOccupationRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use scores::PgScoreRepository;
pub use simulations::PgSimulationRepository;
pub use tasks::PgTaskRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Occupation repository.
    pub occupations: PgOccupationRepository,
    /// Task repository (tasks joined with their scores).
    pub tasks: PgTaskRepository,
    /// Automation score repository.
    pub scores: PgScoreRepository,
    /// Saved simulation repository.
    pub simulations: PgSimulationRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            occupations: PgOccupationRepository::new(pool.clone()),
            tasks: PgTaskRepository::new(pool.clone()),
            scores: PgScoreRepository::new(pool.clone()),
            simulations: PgSimulationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
