use crate::domain::{Comment, CommentStatus, NodeRef, Post, PostState};
use crate::error::ServiceResult;

/// Keyed storage of posts and comments.
///
/// Every read observes either the state before or after a mutation, never a
/// partially applied one. Mutations on the same entity serialize.
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a new post. Fails with `AlreadyExists` if the id is taken.
    /// A post with a community id is registered under that community
    /// before this returns.
    async fn insert_post(&self, post: Post) -> ServiceResult<()>;

    /// Insert a new comment and index it under its parent. Fails with
    /// `AlreadyExists` if the id is taken. The comment is visible through
    /// [`ChildIndex::children_of`] before this returns.
    async fn insert_comment(&self, comment: Comment) -> ServiceResult<()>;

    async fn get_post(&self, post_id: &str) -> ServiceResult<Post>;

    async fn get_comment(&self, comment_id: &str) -> ServiceResult<Comment>;

    /// Batch lookup; ids that do not resolve are skipped.
    async fn get_posts(&self, post_ids: &[String]) -> ServiceResult<Vec<Post>>;

    /// Batch lookup; ids that do not resolve are skipped.
    async fn get_comments(&self, comment_ids: &[String]) -> ServiceResult<Vec<Comment>>;

    /// Atomically add `delta` to the score and return the new value.
    async fn mutate_score(&self, target: &NodeRef, delta: i64) -> ServiceResult<i64>;

    /// Idempotent.
    async fn set_has_replies(&self, comment_id: &str) -> ServiceResult<()>;

    async fn set_post_state(&self, post_id: &str, state: PostState) -> ServiceResult<Post>;

    async fn set_comment_status(
        &self,
        comment_id: &str,
        status: CommentStatus,
    ) -> ServiceResult<Comment>;

    async fn health_check(&self) -> ServiceResult<()> {
        Ok(())
    }
}

/// Parent -> children lookups, maintained synchronously with inserts.
#[async_trait::async_trait]
pub trait ChildIndex: Send + Sync {
    /// Ids of the comments whose parent is `parent`. Unordered.
    async fn children_of(&self, parent: &NodeRef) -> ServiceResult<Vec<String>>;

    /// Ids of the posts created in a community. Unordered; empty for an
    /// unknown community.
    async fn posts_in(&self, subreddit_id: &str) -> ServiceResult<Vec<String>>;
}

/// The full store contract the engines depend on.
pub trait ForumStore: EntityStore + ChildIndex {}

impl<T: EntityStore + ChildIndex + ?Sized> ForumStore for T {}
