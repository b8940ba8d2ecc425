pub mod ids;
pub mod models;
pub mod validation;

pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use models::{
    Comment, CommentStatus, CommentTree, Media, NewComment, NewPost, NodeRef, Post, PostState,
};
