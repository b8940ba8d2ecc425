/// Post service - creation, point reads, moderation and community listings
use super::creation_time;
use super::ranking::RankingEngine;
use crate::domain::validation::{exactly_one, present, require_id, OneOf};
use crate::domain::{IdGenerator, Media, NewPost, Post, PostState};
use crate::error::ServiceResult;
use crate::repository::ForumStore;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn ForumStore>,
    ids: Arc<dyn IdGenerator>,
    ranking: RankingEngine,
}

impl PostService {
    pub fn new(store: Arc<dyn ForumStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ranking: RankingEngine::new(store.clone()),
            store,
            ids,
        }
    }

    /// Create a post with score 0 and state NORMAL.
    ///
    /// Exactly one of image or video must be supplied; blank values count
    /// as absent.
    pub async fn create_post(&self, input: NewPost) -> ServiceResult<Post> {
        let media = match exactly_one(
            ("image_url", present(input.image_url)),
            ("video_url", present(input.video_url)),
        )? {
            OneOf::First(url) => Media::Image(url),
            OneOf::Second(url) => Media::Video(url),
        };

        let post = Post {
            id: self.ids.next_id(),
            title: input.title,
            text: input.text,
            author: input.author,
            media,
            score: 0,
            state: PostState::Normal,
            created_at: creation_time(),
            subreddit_id: present(input.subreddit_id),
            tags: input.tags,
        };

        self.store.insert_post(post.clone()).await?;
        info!(
            post_id = %post.id,
            author = %post.author,
            subreddit_id = ?post.subreddit_id,
            "Post created"
        );
        Ok(post)
    }

    pub async fn get_post(&self, post_id: &str) -> ServiceResult<Post> {
        let post_id = require_id("post_id", post_id)?;
        self.store.get_post(post_id).await
    }

    pub async fn moderate_post(&self, post_id: &str, state: PostState) -> ServiceResult<Post> {
        let post_id = require_id("post_id", post_id)?;
        let post = self.store.set_post_state(post_id, state).await?;
        info!(%post_id, %state, "Post moderated");
        Ok(post)
    }

    /// Highest ranked posts of a community. Unknown communities are empty.
    pub async fn list_subreddit_posts(
        &self,
        subreddit_id: &str,
        count: usize,
    ) -> ServiceResult<Vec<Post>> {
        let subreddit_id = require_id("subreddit_id", subreddit_id)?;
        let post_ids = self.store.posts_in(subreddit_id).await?;
        self.ranking.rank_posts(&post_ids, count).await
    }
}
