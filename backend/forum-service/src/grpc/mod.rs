pub mod convert;
pub mod server;

// Generated protobuf code (from backend/proto/services/forum_service.proto)
pub mod proto {
    tonic::include_proto!("agora.forum_service.v1");
}

pub use server::ForumServiceImpl;
