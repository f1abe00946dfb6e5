use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{AppError, AppResult};
use crate::store::StoreBackendConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub tenants: Vec<TenantConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    #[serde(rename = "type")]
    pub backend_type: String,
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub db_type: String,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TenantConfig {
    pub id: u32,
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> AppResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AppError::Configuration(format!("Failed to read {}: {}", path, e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AppError::Configuration(format!("Failed to parse {}: {}", path, e)))
    }

    /// Default configuration: in-memory SQLite, single tenant. Suitable for
    /// development and testing.
    pub fn default_config() -> Self {
        Self {
            backend: BackendConfig {
                backend_type: "database".to_string(),
                database: Some(DatabaseConfig {
                    db_type: "sqlite".to_string(),
                    url: "sqlite::memory:".to_string(),
                    max_connections: 1,
                }),
            },
            tenants: vec![TenantConfig { id: 1 }],
        }
    }

    /// Translate the application-level backend section into a validated
    /// store configuration.
    pub fn store_config(&self) -> AppResult<StoreBackendConfig> {
        if self.backend.backend_type != "database" {
            return Err(AppError::Configuration(format!(
                "Unsupported backend type: {}",
                self.backend.backend_type
            )));
        }
        let database = self.backend.database.as_ref().ok_or_else(|| {
            AppError::Configuration(
                "Database configuration is required when backend type is 'database'".to_string(),
            )
        })?;
        if database.db_type != "sqlite" {
            return Err(AppError::Configuration(format!(
                "Unsupported database type: {}",
                database.db_type
            )));
        }

        let config = StoreBackendConfig::sqlite(database.url.clone())
            .with_max_connections(database.max_connections);
        config
            .validate()
            .map_err(AppError::Configuration)?;
        Ok(config)
    }
}
