use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("failed to read TLS material: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("rpc failed: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("malformed response: {0}")]
    MalformedResponse(&'static str),
}

impl ClientError {
    /// gRPC status code, if the failure came from the server.
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            ClientError::Rpc(status) => Some(status.code()),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
