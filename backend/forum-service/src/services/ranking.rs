//! Score ordering shared by comment and post retrieval.
//!
//! The order is total: score descending, then creation time ascending, then
//! identifier ascending. Two calls over unchanged data return the same
//! sequence no matter how the store enumerates children.

use crate::domain::{Comment, Post};
use crate::error::ServiceResult;
use crate::repository::ForumStore;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;

/// Anything ordered by the forum ranking.
pub trait Rankable {
    fn rank_id(&self) -> &str;
    fn rank_score(&self) -> i64;
    fn rank_created_at(&self) -> DateTime<Utc>;
}

impl Rankable for Comment {
    fn rank_id(&self) -> &str {
        &self.id
    }

    fn rank_score(&self) -> i64 {
        self.score
    }

    fn rank_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Rankable for Post {
    fn rank_id(&self) -> &str {
        &self.id
    }

    fn rank_score(&self) -> i64 {
        self.score
    }

    fn rank_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

pub fn compare<T: Rankable>(a: &T, b: &T) -> Ordering {
    b.rank_score()
        .cmp(&a.rank_score())
        .then_with(|| a.rank_created_at().cmp(&b.rank_created_at()))
        .then_with(|| a.rank_id().cmp(b.rank_id()))
}

/// Keep the `count` best items in ranking order.
///
/// Partitions around the cut first so only the survivors are fully sorted.
pub fn top_n<T: Rankable>(mut items: Vec<T>, count: usize) -> Vec<T> {
    if count == 0 {
        return Vec::new();
    }
    if count < items.len() {
        items.select_nth_unstable_by(count - 1, compare);
        items.truncate(count);
    }
    items.sort_unstable_by(compare);
    items
}

/// Resolves candidate ids against the store and ranks them by current score.
#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn ForumStore>,
}

impl RankingEngine {
    pub fn new(store: Arc<dyn ForumStore>) -> Self {
        Self { store }
    }

    /// Rank comment ids. Ids that no longer resolve are skipped.
    pub async fn rank(&self, comment_ids: &[String], count: usize) -> ServiceResult<Vec<Comment>> {
        if count == 0 || comment_ids.is_empty() {
            return Ok(Vec::new());
        }
        let comments = self.store.get_comments(comment_ids).await?;
        Ok(top_n(comments, count))
    }

    pub async fn rank_ids(&self, comment_ids: &[String], count: usize) -> ServiceResult<Vec<String>> {
        Ok(self
            .rank(comment_ids, count)
            .await?
            .into_iter()
            .map(|comment| comment.id)
            .collect())
    }

    pub async fn rank_posts(&self, post_ids: &[String], count: usize) -> ServiceResult<Vec<Post>> {
        if count == 0 || post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let posts = self.store.get_posts(post_ids).await?;
        Ok(top_n(posts, count))
    }
}
