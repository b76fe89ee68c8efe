use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub assets: AssetConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Externally reachable base URL of this service, used to build file URLs
    pub public_url: String,
    /// Base URL of the generated storefront pages
    pub storefront_url: String,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub bootstrap_schema: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub root_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("KITCHEN_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SERVER_PUBLIC_URL") {
            self.server.public_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("SERVER_STOREFRONT_URL") {
            self.server.storefront_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Database overrides
        match env::var("DATABASE_BACKEND").as_deref() {
            Ok("memory") => self.database.backend = StoreBackend::Memory,
            Ok("postgres") => self.database.backend = StoreBackend::Postgres,
            _ => {}
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_BOOTSTRAP_SCHEMA") {
            self.database.bootstrap_schema = v.parse().unwrap_or(self.database.bootstrap_schema);
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_ROOT_DIR") {
            self.storage.root_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("STORAGE_MAX_UPLOAD_BYTES") {
            self.storage.max_upload_bytes = v.parse().unwrap_or(self.storage.max_upload_bytes);
        }

        // Asset overrides
        if let Ok(v) = env::var("ASSETS_MAX_DIMENSION") {
            self.assets.max_dimension = v.parse().unwrap_or(self.assets.max_dimension);
        }
        if let Ok(v) = env::var("ASSETS_JPEG_QUALITY") {
            self.assets.jpeg_quality = v.parse().unwrap_or(self.assets.jpeg_quality);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                public_url: "http://localhost:3000".to_string(),
                storefront_url: "http://localhost:3000".to_string(),
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                max_connections: 10,
                connection_timeout: 30,
                bootstrap_schema: true,
            },
            storage: StorageConfig {
                root_dir: PathBuf::from("./data/storage"),
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
            },
            assets: AssetConfig {
                max_dimension: 1200,
                jpeg_quality: 80,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret-change-me".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_cost: 4,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                public_url: "https://staging-api.example.com".to_string(),
                storefront_url: "https://staging.example.com".to_string(),
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                max_connections: 20,
                connection_timeout: 10,
                bootstrap_schema: true,
            },
            storage: StorageConfig {
                root_dir: PathBuf::from("/var/lib/cloud-kitchen/storage"),
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
            },
            assets: AssetConfig {
                max_dimension: 1200,
                jpeg_quality: 80,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                public_url: "https://api.example.com".to_string(),
                storefront_url: "https://kitchen.example.com".to_string(),
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                max_connections: 50,
                connection_timeout: 5,
                bootstrap_schema: false,
            },
            storage: StorageConfig {
                root_dir: PathBuf::from("/var/lib/cloud-kitchen/storage"),
                max_upload_bytes: 4 * 1024 * 1024, // 4MB
            },
            assets: AssetConfig {
                max_dimension: 1200,
                jpeg_quality: 80,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    /// Storefront page for an owner: `<base>/<user_id>/website`
    pub fn storefront_url(&self, user_id: &uuid::Uuid) -> String {
        format!("{}/{}/website", self.server.storefront_url, user_id)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.assets.max_dimension, 1200);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.database.backend, StoreBackend::Postgres);
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.database.bootstrap_schema);
    }

    #[test]
    fn storefront_url_uses_owner_id() {
        let config = AppConfig::development();
        let id = uuid::Uuid::nil();
        assert_eq!(
            config.storefront_url(&id),
            "http://localhost:3000/00000000-0000-0000-0000-000000000000/website"
        );
    }
}
