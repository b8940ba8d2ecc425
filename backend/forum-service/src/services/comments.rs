/// Comment service - creation, point reads and moderation
use super::creation_time;
use crate::domain::validation::{exactly_one, present, require_id, OneOf};
use crate::domain::{Comment, CommentStatus, IdGenerator, NewComment, NodeRef, PostState};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::forum::record_has_replies_failure;
use crate::repository::ForumStore;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn ForumStore>,
    ids: Arc<dyn IdGenerator>,
}

impl CommentService {
    pub fn new(store: Arc<dyn ForumStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Create a comment under a post or under another comment.
    ///
    /// The parent must exist and its thread must not be locked. Flagging a
    /// parent comment's `has_replies` happens after the insert and does not
    /// fail the call.
    pub async fn create_comment(&self, input: NewComment) -> ServiceResult<Comment> {
        let parent = match exactly_one(
            ("parent_post_id", present(input.parent_post_id)),
            ("parent_comment_id", present(input.parent_comment_id)),
        )? {
            OneOf::First(post_id) => NodeRef::Post(post_id),
            OneOf::Second(comment_id) => NodeRef::Comment(comment_id),
        };

        let root_post_id = match &parent {
            NodeRef::Post(post_id) => post_id.clone(),
            NodeRef::Comment(comment_id) => self.store.get_comment(comment_id).await?.root_post_id,
        };
        let root_post = self.store.get_post(&root_post_id).await?;
        if root_post.state == PostState::Locked {
            return Err(ServiceError::FailedPrecondition(format!(
                "post {} is locked",
                root_post_id
            )));
        }

        let comment = Comment {
            id: self.ids.next_id(),
            text: input.text,
            author: input.author,
            score: 0,
            status: CommentStatus::Normal,
            created_at: creation_time(),
            parent,
            root_post_id,
            has_replies: false,
        };

        self.store.insert_comment(comment.clone()).await?;

        if let NodeRef::Comment(parent_id) = &comment.parent {
            if let Err(e) = self.store.set_has_replies(parent_id).await {
                record_has_replies_failure();
                warn!(
                    comment_id = %comment.id,
                    %parent_id,
                    error = %e,
                    "Failed to flag parent comment as having replies"
                );
            }
        }

        info!(
            comment_id = %comment.id,
            parent = %comment.parent,
            root_post_id = %comment.root_post_id,
            "Comment created"
        );
        Ok(comment)
    }

    pub async fn get_comment(&self, comment_id: &str) -> ServiceResult<Comment> {
        let comment_id = require_id("comment_id", comment_id)?;
        self.store.get_comment(comment_id).await
    }

    pub async fn moderate_comment(
        &self,
        comment_id: &str,
        status: CommentStatus,
    ) -> ServiceResult<Comment> {
        let comment_id = require_id("comment_id", comment_id)?;
        let comment = self.store.set_comment_status(comment_id, status).await?;
        info!(%comment_id, %status, "Comment moderated");
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Media, Post, SequentialIdGenerator};
    use crate::repository::{ChildIndex, EntityStore, InMemoryForumStore};
    use chrono::Utc;

    fn post(state: PostState) -> Post {
        Post {
            id: "p".into(),
            title: "t".into(),
            text: "b".into(),
            author: "a".into(),
            media: Media::Image("i".into()),
            score: 0,
            state,
            created_at: Utc::now(),
            subreddit_id: None,
            tags: vec![],
        }
    }

    async fn setup(state: PostState) -> (Arc<InMemoryForumStore>, CommentService) {
        let store = Arc::new(InMemoryForumStore::new());
        store.insert_post(post(state)).await.unwrap();
        let service = CommentService::new(store.clone(), Arc::new(SequentialIdGenerator::new("c")));
        (store, service)
    }

    fn under_post(post_id: &str) -> NewComment {
        NewComment {
            text: "hi".into(),
            author: "bob".into(),
            parent_post_id: Some(post_id.into()),
            parent_comment_id: None,
        }
    }

    fn under_comment(comment_id: &str) -> NewComment {
        NewComment {
            text: "re".into(),
            author: "carol".into(),
            parent_post_id: None,
            parent_comment_id: Some(comment_id.into()),
        }
    }

    #[tokio::test]
    async fn reply_flags_parent_and_inherits_root() {
        let (store, service) = setup(PostState::Normal).await;
        let top = service.create_comment(under_post("p")).await.unwrap();
        assert!(!top.has_replies);
        assert_eq!(top.root_post_id, "p");

        let reply = service.create_comment(under_comment(&top.id)).await.unwrap();
        assert_eq!(reply.root_post_id, "p");
        assert_eq!(reply.parent, NodeRef::Comment(top.id.clone()));

        assert!(service.get_comment(&top.id).await.unwrap().has_replies);
        assert_eq!(
            store
                .children_of(&NodeRef::Comment(top.id.clone()))
                .await
                .unwrap(),
            vec![reply.id]
        );
    }

    #[tokio::test]
    async fn both_parents_is_rejected_without_writes() {
        let (store, service) = setup(PostState::Normal).await;
        let top = service.create_comment(under_post("p")).await.unwrap();

        let input = NewComment {
            parent_post_id: Some("p".into()),
            parent_comment_id: Some(top.id.clone()),
            ..under_post("p")
        };
        let err = service.create_comment(input).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));

        assert_eq!(store.comment_count(), 1);
        assert_eq!(
            store.children_of(&NodeRef::Post("p".into())).await.unwrap(),
            vec![top.id.clone()]
        );
        assert!(store
            .children_of(&NodeRef::Comment(top.id))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn missing_parent_is_not_found() {
        let (store, service) = setup(PostState::Normal).await;
        assert!(service
            .create_comment(under_post("ghost"))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(service
            .create_comment(under_comment("ghost"))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(matches!(
            service.create_comment(NewComment::default()).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert_eq!(store.comment_count(), 0);
    }

    #[tokio::test]
    async fn locked_thread_rejects_comments_at_any_depth() {
        let (store, service) = setup(PostState::Normal).await;
        let top = service.create_comment(under_post("p")).await.unwrap();
        store.set_post_state("p", PostState::Locked).await.unwrap();

        for input in [under_post("p"), under_comment(&top.id)] {
            let err = service.create_comment(input).await.unwrap_err();
            assert!(matches!(err, ServiceError::FailedPrecondition(_)));
        }
        assert_eq!(store.comment_count(), 1);
    }

    #[tokio::test]
    async fn removed_comment_is_still_readable() {
        let (_, service) = setup(PostState::Normal).await;
        let top = service.create_comment(under_post("p")).await.unwrap();

        service
            .moderate_comment(&top.id, CommentStatus::Removed)
            .await
            .unwrap();
        assert_eq!(
            service.get_comment(&top.id).await.unwrap().status,
            CommentStatus::Removed
        );
        assert!(matches!(
            service.get_comment("").await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    /// Delegates to the in-memory store but refuses to flag replies.
    struct NoReplyFlagStore(InMemoryForumStore);

    #[async_trait::async_trait]
    impl EntityStore for NoReplyFlagStore {
        async fn insert_post(&self, post: Post) -> ServiceResult<()> {
            self.0.insert_post(post).await
        }
        async fn insert_comment(&self, comment: Comment) -> ServiceResult<()> {
            self.0.insert_comment(comment).await
        }
        async fn get_post(&self, post_id: &str) -> ServiceResult<Post> {
            self.0.get_post(post_id).await
        }
        async fn get_comment(&self, comment_id: &str) -> ServiceResult<Comment> {
            self.0.get_comment(comment_id).await
        }
        async fn get_posts(&self, post_ids: &[String]) -> ServiceResult<Vec<Post>> {
            self.0.get_posts(post_ids).await
        }
        async fn get_comments(&self, comment_ids: &[String]) -> ServiceResult<Vec<Comment>> {
            self.0.get_comments(comment_ids).await
        }
        async fn mutate_score(&self, target: &NodeRef, delta: i64) -> ServiceResult<i64> {
            self.0.mutate_score(target, delta).await
        }
        async fn set_has_replies(&self, _comment_id: &str) -> ServiceResult<()> {
            Err(ServiceError::Internal("write failed".into()))
        }
        async fn set_post_state(&self, post_id: &str, state: PostState) -> ServiceResult<Post> {
            self.0.set_post_state(post_id, state).await
        }
        async fn set_comment_status(
            &self,
            comment_id: &str,
            status: CommentStatus,
        ) -> ServiceResult<Comment> {
            self.0.set_comment_status(comment_id, status).await
        }
    }

    #[async_trait::async_trait]
    impl ChildIndex for NoReplyFlagStore {
        async fn children_of(&self, parent: &NodeRef) -> ServiceResult<Vec<String>> {
            self.0.children_of(parent).await
        }
        async fn posts_in(&self, subreddit_id: &str) -> ServiceResult<Vec<String>> {
            self.0.posts_in(subreddit_id).await
        }
    }

    #[tokio::test]
    async fn reply_survives_failed_parent_flag() {
        let store = Arc::new(NoReplyFlagStore(InMemoryForumStore::new()));
        store.insert_post(post(PostState::Normal)).await.unwrap();
        let service = CommentService::new(store.clone(), Arc::new(SequentialIdGenerator::new("c")));

        let top = service.create_comment(under_post("p")).await.unwrap();
        let reply = service.create_comment(under_comment(&top.id)).await.unwrap();

        assert_eq!(store.get_comment(&reply.id).await.unwrap(), reply);
        assert!(!store.get_comment(&top.id).await.unwrap().has_replies);
        assert_eq!(
            store
                .children_of(&NodeRef::Comment(top.id))
                .await
                .unwrap(),
            vec![reply.id]
        );
    }
}
