//! # solvehub-db
//!
//! PostgreSQL persistence layer for SolveHub.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for all core entities
//! - Attachment storage backends (filesystem, HTTP object storage)
//! - Embedded SQL migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use solvehub_db::Database;
//! use solvehub_core::{NewUser, UserRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/solvehub").await?;
//!     db.migrate().await?;
//!
//!     let user = db.users.insert(NewUser {
//!         username: "ana".to_string(),
//!         email: "ana@example.com".to_string(),
//!         password_hash: "...".to_string(),
//!         display_name: None,
//!     }).await?;
//!
//!     println!("Created user: {}", user.id);
//!     Ok(())
//! }
//! ```

pub mod answers;
pub mod attachments;
pub mod exercises;
pub mod notifications;
pub mod pool;
pub mod preferences;
pub mod reports;
pub mod storage;
pub mod subjects;
pub mod tags;
pub mod users;
mod votes;

// Test fixtures for integration tests.
// Always compiled so integration tests (in tests/) can use them.
pub mod test_fixtures;

// Re-export core types
pub use solvehub_core::*;

// Re-export repository implementations
pub use answers::PgAnswerRepository;
pub use attachments::PgAttachmentRepository;
pub use exercises::{PgExerciseRepository, MAX_TAGS_PER_EXERCISE};
pub use notifications::PgNotificationRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use preferences::PgPreferenceRepository;
pub use reports::PgReportRepository;
pub use storage::{
    generate_storage_key, FilesystemBackend, HttpObjectStorage, StorageBackend, StoredObject,
};
pub use subjects::PgSubjectRepository;
pub use tags::PgTagRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User accounts and saved/completed collections.
    pub users: PgUserRepository,
    /// Per-user notification preference flags.
    pub preferences: PgPreferenceRepository,
    /// Canonical subjects.
    pub subjects: PgSubjectRepository,
    /// Free-form tags.
    pub tags: PgTagRepository,
    /// Exercises, their tags, and their vote sets.
    pub exercises: PgExerciseRepository,
    /// Answers and replies.
    pub answers: PgAnswerRepository,
    /// Persisted notification records.
    pub notifications: PgNotificationRepository,
    /// Moderation reports.
    pub reports: PgReportRepository,
    /// Attachment records.
    pub attachments: PgAttachmentRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            preferences: PgPreferenceRepository::new(pool.clone()),
            subjects: PgSubjectRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            exercises: PgExerciseRepository::new(pool.clone()),
            answers: PgAnswerRepository::new(pool.clone()),
            notifications: PgNotificationRepository::new(pool.clone()),
            reports: PgReportRepository::new(pool.clone()),
            attachments: PgAttachmentRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
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
