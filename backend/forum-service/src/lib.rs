//! Forum service: posts, threaded comments, votes and score-ranked
//! comment trees served over gRPC.

pub mod config;
pub mod domain;
pub mod error;
pub mod grpc;
pub mod health;
pub mod metrics;
pub mod repository;
pub mod services;
pub mod state;

pub use error::{ServiceError, ServiceResult};
pub use state::AppState;

use std::sync::Arc;

use config::ForumConfig;
use domain::UuidIdGenerator;
use grpc::proto::forum_service_server::ForumServiceServer;
use grpc::ForumServiceImpl;
use repository::InMemoryForumStore;

/// Wrap shared state in the generated tonic service.
pub fn grpc_service(state: Arc<AppState>) -> ForumServiceServer<ForumServiceImpl> {
    ForumServiceServer::new(ForumServiceImpl::new(state))
}

/// State backed by a fresh in-memory store and UUID identifiers.
pub fn in_memory_state(limits: ForumConfig) -> AppState {
    AppState::new(
        Arc::new(InMemoryForumStore::new()),
        Arc::new(UuidIdGenerator),
        limits,
    )
}
