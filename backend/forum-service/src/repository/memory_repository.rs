//! Concurrent in-memory store backed by sharded maps.
//!
//! Each entity lives in a `DashMap` shard; score and flag updates take the
//! shard's write lock through `get_mut`, so concurrent votes on one entity
//! serialize and readers clone a consistent snapshot.

use super::{ChildIndex, EntityStore};
use crate::domain::{Comment, CommentStatus, NodeRef, Post, PostState};
use crate::error::{ServiceError, ServiceResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemoryForumStore {
    posts: DashMap<String, Post>,
    comments: DashMap<String, Comment>,
    children: DashMap<NodeRef, Vec<String>>,
    subreddit_posts: DashMap<String, Vec<String>>,
}

impl InMemoryForumStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

fn apply_delta(score: &mut i64, delta: i64, target: &NodeRef) -> ServiceResult<i64> {
    *score = score
        .checked_add(delta)
        .ok_or_else(|| ServiceError::Internal(format!("score overflow on {}", target)))?;
    Ok(*score)
}

#[async_trait::async_trait]
impl EntityStore for InMemoryForumStore {
    async fn insert_post(&self, post: Post) -> ServiceResult<()> {
        let post_id = post.id.clone();
        let subreddit_id = post.subreddit_id.clone();

        match self.posts.entry(post_id.clone()) {
            Entry::Occupied(_) => {
                return Err(ServiceError::AlreadyExists(format!("post {}", post_id)))
            }
            Entry::Vacant(slot) => {
                slot.insert(post);
            }
        }

        if let Some(subreddit_id) = subreddit_id {
            self.subreddit_posts
                .entry(subreddit_id)
                .or_default()
                .push(post_id.clone());
        }

        debug!(%post_id, "Inserted post");
        Ok(())
    }

    async fn insert_comment(&self, comment: Comment) -> ServiceResult<()> {
        let comment_id = comment.id.clone();
        let parent = comment.parent.clone();

        match self.comments.entry(comment_id.clone()) {
            Entry::Occupied(_) => {
                return Err(ServiceError::AlreadyExists(format!(
                    "comment {}",
                    comment_id
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(comment);
            }
        }

        self.children
            .entry(parent.clone())
            .or_default()
            .push(comment_id.clone());

        debug!(%comment_id, %parent, "Inserted comment");
        Ok(())
    }

    async fn get_post(&self, post_id: &str) -> ServiceResult<Post> {
        self.posts
            .get(post_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::post_not_found(post_id))
    }

    async fn get_comment(&self, comment_id: &str) -> ServiceResult<Comment> {
        self.comments
            .get(comment_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::comment_not_found(comment_id))
    }

    async fn get_posts(&self, post_ids: &[String]) -> ServiceResult<Vec<Post>> {
        Ok(post_ids
            .iter()
            .filter_map(|id| self.posts.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn get_comments(&self, comment_ids: &[String]) -> ServiceResult<Vec<Comment>> {
        Ok(comment_ids
            .iter()
            .filter_map(|id| self.comments.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn mutate_score(&self, target: &NodeRef, delta: i64) -> ServiceResult<i64> {
        match target {
            NodeRef::Post(post_id) => {
                let mut post = self
                    .posts
                    .get_mut(post_id)
                    .ok_or_else(|| ServiceError::post_not_found(post_id))?;
                apply_delta(&mut post.score, delta, target)
            }
            NodeRef::Comment(comment_id) => {
                let mut comment = self
                    .comments
                    .get_mut(comment_id)
                    .ok_or_else(|| ServiceError::comment_not_found(comment_id))?;
                apply_delta(&mut comment.score, delta, target)
            }
        }
    }

    async fn set_has_replies(&self, comment_id: &str) -> ServiceResult<()> {
        let mut comment = self
            .comments
            .get_mut(comment_id)
            .ok_or_else(|| ServiceError::comment_not_found(comment_id))?;
        comment.has_replies = true;
        Ok(())
    }

    async fn set_post_state(&self, post_id: &str, state: PostState) -> ServiceResult<Post> {
        let mut post = self
            .posts
            .get_mut(post_id)
            .ok_or_else(|| ServiceError::post_not_found(post_id))?;
        post.state = state;
        Ok(post.clone())
    }

    async fn set_comment_status(
        &self,
        comment_id: &str,
        status: CommentStatus,
    ) -> ServiceResult<Comment> {
        let mut comment = self
            .comments
            .get_mut(comment_id)
            .ok_or_else(|| ServiceError::comment_not_found(comment_id))?;
        comment.status = status;
        Ok(comment.clone())
    }
}

#[async_trait::async_trait]
impl ChildIndex for InMemoryForumStore {
    async fn children_of(&self, parent: &NodeRef) -> ServiceResult<Vec<String>> {
        Ok(self
            .children
            .get(parent)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn posts_in(&self, subreddit_id: &str) -> ServiceResult<Vec<String>> {
        Ok(self
            .subreddit_posts
            .get(subreddit_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
