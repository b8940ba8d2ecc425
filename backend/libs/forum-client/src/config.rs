/// Forum client configuration
///
/// Endpoint, timeouts and optional TLS/mTLS for connecting to forum-service.
use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::time::Duration;

use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumClientConfig {
    /// Forum Service endpoint
    pub url: String,

    /// gRPC connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// gRPC request timeout in seconds
    pub request_timeout_secs: u64,

    /// HTTP/2 keep-alive interval in seconds
    pub keepalive_interval_secs: u64,

    /// HTTP/2 keep-alive timeout in seconds
    pub keepalive_timeout_secs: u64,

    pub tls_enabled: bool,
    /// Optional custom domain name for TLS SNI/verification
    pub tls_domain_name: Option<String>,
    /// Path to CA certificate (PEM)
    pub tls_ca_cert_path: Option<String>,
    /// Path to client certificate (PEM) for mTLS
    pub tls_client_cert_path: Option<String>,
    /// Path to client private key (PEM) for mTLS
    pub tls_client_key_path: Option<String>,
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> ClientResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ClientError::Config(format!("{} must be a number, got '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

impl ForumClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ClientResult<Self> {
        Ok(Self {
            url: env::var("FORUM_SERVICE_URL")
                .unwrap_or_else(|_| "http://forum-service:50051".to_string()),
            connection_timeout_secs: parse_var("GRPC_CONNECTION_TIMEOUT_SECS", 10)?,
            request_timeout_secs: parse_var("GRPC_REQUEST_TIMEOUT_SECS", 30)?,
            keepalive_interval_secs: parse_var("GRPC_KEEPALIVE_INTERVAL_SECS", 30)?,
            keepalive_timeout_secs: parse_var("GRPC_KEEPALIVE_TIMEOUT_SECS", 10)?,

            // TLS/mTLS
            tls_enabled: env::var("GRPC_TLS_ENABLED")
                .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE"))
                .unwrap_or(false),
            tls_domain_name: env::var("GRPC_TLS_DOMAIN_NAME").ok(),
            tls_ca_cert_path: env::var("GRPC_TLS_CA_CERT_PATH").ok(),
            tls_client_cert_path: env::var("GRPC_TLS_CLIENT_CERT_PATH").ok(),
            tls_client_key_path: env::var("GRPC_TLS_CLIENT_KEY_PATH").ok(),
        })
    }

    /// Configuration for development/testing
    pub fn development() -> Self {
        Self::for_url("http://localhost:50051")
    }

    /// Plaintext defaults against an explicit endpoint.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connection_timeout_secs: 10,
            request_timeout_secs: 30,
            keepalive_interval_secs: 30,
            keepalive_timeout_secs: 10,
            tls_enabled: false,
            tls_domain_name: None,
            tls_ca_cert_path: None,
            tls_client_cert_path: None,
            tls_client_key_path: None,
        }
    }

    /// Build a tonic Endpoint with timeouts/keepalive and optional TLS/mTLS
    pub fn make_endpoint(&self) -> ClientResult<Endpoint> {
        let mut ep = Endpoint::from_shared(self.url.clone())?
            .connect_timeout(Duration::from_secs(self.connection_timeout_secs))
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .http2_keep_alive_interval(Duration::from_secs(self.keepalive_interval_secs))
            .keep_alive_timeout(Duration::from_secs(self.keepalive_timeout_secs))
            .tcp_nodelay(true);

        if self.tls_enabled {
            let mut tls = ClientTlsConfig::new();

            if let Some(ca_path) = &self.tls_ca_cert_path {
                tls = tls.ca_certificate(Certificate::from_pem(fs::read(ca_path)?));
            }

            if let Some(domain) = &self.tls_domain_name {
                tls = tls.domain_name(domain);
            }

            if let (Some(cert_path), Some(key_path)) =
                (&self.tls_client_cert_path, &self.tls_client_key_path)
            {
                let identity = Identity::from_pem(fs::read(cert_path)?, fs::read(key_path)?);
                tls = tls.identity(identity);
            }

            ep = ep.tls_config(tls)?;
        }

        Ok(ep)
    }

    pub async fn connect_channel(&self) -> ClientResult<Channel> {
        Ok(self.make_endpoint()?.connect().await?)
    }
}
