//! Backend platform: configuration, document store and object storage.
//!
//! A [`Platform`] is built once at startup and its handles are shared by
//! every service for the lifetime of the process.

pub mod config;
pub mod infra;
pub mod storage;
pub mod store;

use std::sync::Arc;

use tracing::info;

use common::{AppError, AppResult};

pub use config::PlatformConfig;
pub use infra::{Database, Migrator};
pub use storage::{LocalObjectStorage, MemoryObjectStorage, ObjectStorage, StoredObject};
pub use store::{DocumentStore, MemoryDocumentStore, Order, PgDocumentStore, Query};

/// Initialized backend handles.
#[derive(Clone)]
pub struct Platform {
    pub config: PlatformConfig,
    pub store: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Platform {
    /// Connect to PostgreSQL (applying migrations) and the local bucket.
    pub async fn connect(config: PlatformConfig) -> AppResult<Self> {
        let db = Database::connect(&config.database).await?;
        let storage = LocalObjectStorage::new(
            &config.storage.root,
            config.storage.bucket.clone(),
            &config.server.base_url(),
        );
        info!(
            project_id = %config.project_id,
            bucket = %config.storage.bucket,
            "Platform initialized"
        );

        Ok(Self {
            store: Arc::new(PgDocumentStore::new(db)),
            storage: Arc::new(storage),
            config,
        })
    }

    /// Memory-backed platform for tests and local development.
    pub fn in_memory(config: PlatformConfig) -> AppResult<Self> {
        if config.mode.is_production() {
            return Err(AppError::config(
                "the in-memory backend is not available in production",
            ));
        }
        info!(project_id = %config.project_id, "Platform initialized in memory");

        Ok(Self {
            store: Arc::new(MemoryDocumentStore::new()),
            storage: Arc::new(MemoryObjectStorage::new(config.storage.bucket.clone())),
            config,
        })
    }
}

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run a migration command against the configured database.
pub async fn run_migrations(config: &PlatformConfig, action: MigrateAction) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status().await? {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}
