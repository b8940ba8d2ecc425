use crate::domain::NodeRef;
use crate::error::ServiceResult;
use crate::metrics::forum::record_vote;
use crate::repository::ForumStore;
use std::sync::Arc;
use tracing::info;

/// Applies +1/-1 votes. Serialization of concurrent votes is the store's job.
#[derive(Clone)]
pub struct VoteProcessor {
    store: Arc<dyn ForumStore>,
}

impl VoteProcessor {
    pub fn new(store: Arc<dyn ForumStore>) -> Self {
        Self { store }
    }

    /// Returns the score after this vote.
    pub async fn vote(&self, target: &NodeRef, upvote: bool) -> ServiceResult<i64> {
        let delta = if upvote { 1 } else { -1 };
        let score = self.store.mutate_score(target, delta).await?;
        record_vote(target, upvote);
        info!(%target, upvote, score, "Vote applied");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Media, Post, PostState};
    use crate::repository::{EntityStore, InMemoryForumStore};
    use chrono::Utc;

    async fn store_with_post() -> Arc<InMemoryForumStore> {
        let store = Arc::new(InMemoryForumStore::new());
        store
            .insert_post(Post {
                id: "p".into(),
                title: "t".into(),
                text: "b".into(),
                author: "a".into(),
                media: Media::Video("v".into()),
                score: 0,
                state: PostState::Normal,
                created_at: Utc::now(),
                subreddit_id: None,
                tags: vec![],
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn concurrent_votes_sum_exactly() {
        let store = store_with_post().await;
        let votes = VoteProcessor::new(store.clone());
        let target = NodeRef::Post("p".into());

        let mut handles = Vec::new();
        for i in 0..100 {
            let votes = votes.clone();
            let target = target.clone();
            // 70 up, 30 down
            let upvote = i % 10 >= 3;
            handles.push(tokio::spawn(async move { votes.vote(&target, upvote).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.get_post("p").await.unwrap().score, 40);
    }

    #[tokio::test]
    async fn vote_on_missing_entity_is_not_found() {
        let store = store_with_post().await;
        let votes = VoteProcessor::new(store);
        let err = votes
            .vote(&NodeRef::Comment("ghost".into()), true)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn vote_returns_new_score() {
        let store = store_with_post().await;
        let votes = VoteProcessor::new(store);
        let target = NodeRef::Post("p".into());
        assert_eq!(votes.vote(&target, true).await.unwrap(), 1);
        assert_eq!(votes.vote(&target, false).await.unwrap(), 0);
        assert_eq!(votes.vote(&target, false).await.unwrap(), -1);
    }
}
