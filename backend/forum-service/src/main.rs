use actix_web::{App, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forum_service::config::{Config, StorageBackend, StorageConfig};
use forum_service::domain::UuidIdGenerator;
use forum_service::grpc::proto::forum_service_server::ForumServiceServer;
use forum_service::grpc::ForumServiceImpl;
use forum_service::repository::{ForumStore, InMemoryForumStore, PostgresForumStore};
use forum_service::{grpc_service, health, AppState};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forum_service=info,tower_http=info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

async fn build_store(storage: &StorageConfig) -> Result<Arc<dyn ForumStore>> {
    match storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory forum store");
            Ok(Arc::new(InMemoryForumStore::new()))
        }
        StorageBackend::Postgres => {
            let url = storage
                .database_url
                .as_deref()
                .context("DATABASE_URL environment variable not set")?;

            let pool = PgPoolOptions::new()
                .max_connections(storage.max_connections)
                .min_connections(storage.min_connections)
                .acquire_timeout(Duration::from_secs(10))
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(1800))
                .connect(url)
                .await
                .context("Failed to connect to database")?;

            sqlx::query("SELECT 1")
                .execute(&pool)
                .await
                .context("Failed to verify database connection")?;
            info!("Database pool created and verified");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!("Database migrations completed");

            Ok(Arc::new(PostgresForumStore::new(pool)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting forum-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env={}, http_port={}, grpc_port={}, storage={:?}",
        config.app.env, config.app.http_port, config.grpc.port, config.storage.backend
    );

    let store = build_store(&config.storage).await?;
    let app_state = Arc::new(AppState::new(
        store.clone(),
        Arc::new(UuidIdGenerator),
        config.forum.clone(),
    ));

    let grpc_addr = format!("{}:{}", config.app.host, config.grpc.port)
        .parse()
        .context("Invalid gRPC address")?;
    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);

    info!("Starting servers:");
    info!("  - HTTP health checks: http://{}", http_addr);
    info!("  - gRPC service: grpc://{}", grpc_addr);

    let mut join_set = JoinSet::new();

    let http_store = store.clone();
    let http_server = HttpServer::new(move || App::new().configure(health::configure(http_store.clone())))
        .bind(&http_addr)
        .context("Failed to bind HTTP server")?
        .shutdown_timeout(10)
        .run();

    join_set.spawn(async move {
        http_server
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))
    });

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<ForumServiceServer<ForumServiceImpl>>()
        .await;

    let grpc_config = config.grpc.clone();
    let forum_service = grpc_service(app_state.clone());

    join_set.spawn(async move {
        let mut server_builder = Server::builder();

        if let Some((cert_path, key_path, ca_path)) = grpc_config.mtls_paths() {
            info!("Configuring gRPC server with mTLS");

            let cert = tokio::fs::read(cert_path)
                .await
                .context("Failed to read server certificate")?;
            let key = tokio::fs::read(key_path)
                .await
                .context("Failed to read server key")?;
            let ca_cert = tokio::fs::read(ca_path)
                .await
                .context("Failed to read CA certificate")?;

            let tls_config = tonic::transport::ServerTlsConfig::new()
                .identity(tonic::transport::Identity::from_pem(cert, key))
                .client_ca_root(tonic::transport::Certificate::from_pem(ca_cert));

            server_builder = server_builder
                .tls_config(tls_config)
                .context("Failed to configure TLS")?;
        } else {
            info!("Running gRPC server without mTLS (development mode)");
        }

        server_builder
            .add_service(health_service)
            .add_service(forum_service)
            .serve_with_shutdown(grpc_addr, shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("gRPC server error: {}", e))
    });

    info!("forum-service is running");

    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(Ok(())) => {
                info!("Task completed successfully");
            }
            Ok(Err(e)) => {
                error!("Task failed: {:#}", e);
                return Err(e);
            }
            Err(e) => {
                error!("Task panicked: {:#}", e);
                return Err(anyhow::anyhow!("Task panicked: {}", e));
            }
        }
    }

    info!("forum-service shutting down");
    Ok(())
}
