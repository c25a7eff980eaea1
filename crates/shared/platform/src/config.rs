//! Platform configuration loaded from the environment.

use std::env;
use std::fmt;

use common::{AppError, AppResult, DatabaseConfig, DeploymentMode, ServerConfig, StorageConfig};

/// Default project identifier for local development
pub const DEFAULT_PROJECT_ID: &str = "imagefactory-dev";

/// Backend connection settings shared by every request handler.
#[derive(Clone)]
pub struct PlatformConfig {
    /// Backend project identifier
    pub project_id: String,
    /// Deployment mode
    pub mode: DeploymentMode,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    /// AI provider API key
    ai_api_key: Option<String>,
}

impl fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("project_id", &self.project_id)
            .field("mode", &self.mode)
            .field("server", &self.server)
            .field("database", &self.database)
            .field("storage", &self.storage)
            .field(
                "ai_api_key",
                &self.ai_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl PlatformConfig {
    /// Load configuration from environment variables (and `.env`).
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode: DeploymentMode = match var("APP_ENV") {
            Some(value) => value.parse::<DeploymentMode>().map_err(AppError::config)?,
            None => DeploymentMode::default(),
        };

        let project_id =
            var("IMAGEFACTORY_PROJECT_ID").unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());

        let database_url = match var("DATABASE_URL") {
            Some(url) => url,
            None if mode.is_production() => {
                return Err(AppError::config("DATABASE_URL must be set in production"));
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using local development database");
                DatabaseConfig::default().url
            }
        };

        let defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            url: database_url,
            max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            min_connections: defaults.min_connections,
        };

        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            host: var("SERVER_HOST").unwrap_or(server_defaults.host),
            port: var("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(server_defaults.port),
            public_url: var("IMAGEFACTORY_SERVER_URL"),
        };

        let storage = StorageConfig {
            bucket: var("IMAGEFACTORY_STORAGE_BUCKET")
                .unwrap_or_else(|| format!("{}.appspot.com", project_id)),
            root: var("STORAGE_ROOT").unwrap_or_else(|| StorageConfig::default().root),
        };

        Ok(Self {
            project_id,
            mode,
            server,
            database,
            storage,
            ai_api_key: var("AI_PROVIDER_API_KEY"),
        })
    }

    /// Whether an AI provider key is available
    pub fn ai_provider_configured(&self) -> bool {
        self.ai_api_key.is_some()
    }

    /// AI provider API key
    pub fn ai_api_key(&self) -> Option<&str> {
        self.ai_api_key.as_deref()
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            mode: DeploymentMode::Development,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            ai_api_key: None,
        }
    }
}
