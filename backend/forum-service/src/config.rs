/// Configuration management for Forum Service
///
/// Loads configuration from environment variables. Malformed numeric values
/// are rejected instead of silently replaced by defaults.
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub grpc: GrpcConfig,
    pub storage: StorageConfig,
    pub forum: ForumConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port for health checks and metrics
    pub http_port: u16,
}

/// gRPC server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrpcConfig {
    pub port: u16,
    /// mTLS server certificate path
    pub server_cert_path: Option<String>,
    /// mTLS server key path
    pub server_key_path: Option<String>,
    /// mTLS CA certificate path
    pub ca_cert_path: Option<String>,
}

impl GrpcConfig {
    /// mTLS is enabled only when all three paths are configured.
    pub fn mtls_paths(&self) -> Option<(&str, &str, &str)> {
        match (
            self.server_cert_path.as_deref(),
            self.server_key_path.as_deref(),
            self.ca_cert_path.as_deref(),
        ) {
            (Some(cert), Some(key), Some(ca)) => Some((cert, key, ca)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(anyhow!("unknown STORAGE_BACKEND '{}'", other)),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Required for the postgres backend
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Request limits applied by the RPC layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumConfig {
    /// Larger requested counts are clamped to this value
    pub max_count: usize,
    pub max_expand_depth: usize,
    pub max_tree_nodes: usize,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            max_count: 100,
            max_expand_depth: 4,
            max_tree_nodes: 1000,
        }
    }
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

/// Parse an optional numeric variable, failing on malformed values.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_parse("HTTP_PORT", 8090)?,
        };

        let grpc = GrpcConfig {
            port: env_parse("GRPC_PORT", 50051)?,
            server_cert_path: std::env::var("GRPC_SERVER_CERT_PATH").ok(),
            server_key_path: std::env::var("GRPC_SERVER_KEY_PATH").ok(),
            ca_cert_path: std::env::var("GRPC_CA_CERT_PATH").ok(),
        };

        let backend = match std::env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::Memory,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if backend == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL environment variable not set (required for STORAGE_BACKEND=postgres)");
        }
        let storage = StorageConfig {
            backend,
            database_url,
            max_connections: env_parse("DB_MAX_CONNECTIONS", default_max_connections())?,
            min_connections: env_parse("DB_MIN_CONNECTIONS", default_min_connections())?,
        };

        let defaults = ForumConfig::default();
        let forum = ForumConfig {
            max_count: env_parse("FORUM_MAX_COUNT", defaults.max_count)?,
            max_expand_depth: env_parse("FORUM_MAX_EXPAND_DEPTH", defaults.max_expand_depth)?,
            max_tree_nodes: env_parse("FORUM_MAX_TREE_NODES", defaults.max_tree_nodes)?,
        };
        if forum.max_expand_depth == 0 {
            bail!("FORUM_MAX_EXPAND_DEPTH must be at least 1");
        }

        Ok(Config {
            app,
            grpc,
            storage,
            forum,
        })
    }
}
