/// Configuration for the storage backend.
///
/// Holds everything needed to connect to and operate the backing store.
/// Kept backend-agnostic so another engine can be slotted in behind the
/// store traits without touching callers.
#[derive(Debug, Clone)]
pub struct StoreBackendConfig {
    /// Connection URL, e.g. "sqlite:./org.db" or "sqlite::memory:"
    pub connection_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout: u64,
}

impl StoreBackendConfig {
    pub fn sqlite(connection_url: String) -> Self {
        Self {
            connection_url,
            max_connections: 10,
            connection_timeout: 30,
        }
    }

    /// In-memory SQLite configuration for testing. A single connection is
    /// forced so every statement sees the same in-memory database.
    pub fn memory_sqlite() -> Self {
        Self::sqlite("sqlite::memory:".to_string()).with_max_connections(1)
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_connection_timeout(mut self, timeout_seconds: u64) -> Self {
        self.connection_timeout = timeout_seconds;
        self
    }

    pub fn is_memory_database(&self) -> bool {
        self.connection_url == "sqlite::memory:" || self.connection_url == ":memory:"
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.connection_url.is_empty() {
            return Err("Connection URL cannot be empty".to_string());
        }

        if self.max_connections == 0 {
            return Err("Max connections must be greater than 0".to_string());
        }

        if !self.connection_url.starts_with("sqlite:")
            && self.connection_url != ":memory:"
            && !self.connection_url.ends_with(".db")
            && !self.connection_url.ends_with(".sqlite")
        {
            return Err(
                "SQLite connection URL must start with 'sqlite:', be ':memory:', or end with '.db' or '.sqlite'"
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for StoreBackendConfig {
    fn default() -> Self {
        Self::memory_sqlite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_config() {
        let config = StoreBackendConfig::sqlite("sqlite:./test.db".to_string());
        assert!(config.validate().is_ok());
        assert!(!config.is_memory_database());
    }

    #[test]
    fn test_memory_config() {
        let config = StoreBackendConfig::memory_sqlite();
        assert!(config.is_memory_database());
        assert_eq!(config.max_connections, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StoreBackendConfig::sqlite("".to_string());
        assert!(config.validate().is_err());

        config.connection_url = "invalid://url".to_string();
        assert!(config.validate().is_err());

        config.connection_url = "sqlite:./valid.db".to_string();
        assert!(config.validate().is_ok());

        config.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
