mod memory_repository;
mod postgres_repository;
mod r#trait;

pub use memory_repository::InMemoryForumStore;
pub use postgres_repository::PostgresForumStore;
pub use r#trait::{ChildIndex, EntityStore, ForumStore};
