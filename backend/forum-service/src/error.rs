/// Error types for forum-service
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Identifier collision. Generated identifiers never repeat, so this is
    /// an internal fault rather than a user mistake.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn post_not_found(post_id: &str) -> Self {
        ServiceError::NotFound(format!("post {} not found", post_id))
    }

    pub fn comment_not_found(comment_id: &str) -> Self {
        ServiceError::NotFound(format!("comment {} not found", comment_id))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}

/// Convert ServiceError to tonic::Status for gRPC responses
impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => tonic::Status::not_found(msg),
            ServiceError::InvalidArgument(msg) => tonic::Status::invalid_argument(msg),
            ServiceError::AlreadyExists(msg) => tonic::Status::already_exists(msg),
            ServiceError::FailedPrecondition(msg) => tonic::Status::failed_precondition(msg),
            ServiceError::Database(e) => {
                tracing::error!(error = %e, "database operation failed");
                tonic::Status::internal("Database error")
            }
            ServiceError::Internal(msg) => tonic::Status::internal(msg),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
