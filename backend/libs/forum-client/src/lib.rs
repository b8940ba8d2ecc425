//! Typed client for forum-service.
//!
//! One method per RPC, plus [`ForumClient::retrieve_and_expand_comments`],
//! which walks from a post to the best reply of its best comment.

pub mod config;
pub mod error;

// Generated protobuf code (from backend/proto/services/forum_service.proto)
pub mod proto {
    tonic::include_proto!("agora.forum_service.v1");
}

pub use config::ForumClientConfig;
pub use error::{ClientError, ClientResult};

use proto::forum_service_client::ForumServiceClient;
use proto::*;
use tonic::transport::Channel;
use tracing::debug;

/// Comments fetched per level by [`ForumClient::retrieve_and_expand_comments`].
const RETRIEVE_COUNT: i32 = 5;

#[derive(Clone)]
pub struct ForumClient {
    inner: ForumServiceClient<Channel>,
}

impl ForumClient {
    pub async fn connect(config: &ForumClientConfig) -> ClientResult<Self> {
        let channel = config.connect_channel().await?;
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: ForumServiceClient::new(channel),
        }
    }

    fn client(&self) -> ForumServiceClient<Channel> {
        self.inner.clone()
    }

    pub async fn create_post(&self, request: CreatePostRequest) -> ClientResult<Post> {
        self.client()
            .create_post(request)
            .await?
            .into_inner()
            .post
            .ok_or(ClientError::MalformedResponse("CreatePost returned no post"))
    }

    pub async fn get_post(&self, post_id: &str) -> ClientResult<Post> {
        self.client()
            .get_post(GetPostRequest {
                post_id: post_id.to_string(),
            })
            .await?
            .into_inner()
            .post
            .ok_or(ClientError::MalformedResponse("GetPost returned no post"))
    }

    /// Returns the score after the vote.
    pub async fn vote_post(&self, post_id: &str, upvote: bool) -> ClientResult<i64> {
        let resp = self
            .client()
            .vote_post(VotePostRequest {
                post_id: post_id.to_string(),
                upvote,
            })
            .await?
            .into_inner();
        Ok(resp.score)
    }

    pub async fn moderate_post(&self, post_id: &str, state: PostState) -> ClientResult<Post> {
        self.client()
            .moderate_post(ModeratePostRequest {
                post_id: post_id.to_string(),
                state: state as i32,
            })
            .await?
            .into_inner()
            .post
            .ok_or(ClientError::MalformedResponse("ModeratePost returned no post"))
    }

    pub async fn list_subreddit_posts(
        &self,
        subreddit_id: &str,
        count: i32,
    ) -> ClientResult<Vec<Post>> {
        Ok(self
            .client()
            .list_subreddit_posts(ListSubredditPostsRequest {
                subreddit_id: subreddit_id.to_string(),
                count,
            })
            .await?
            .into_inner()
            .posts)
    }

    pub async fn create_comment(&self, request: CreateCommentRequest) -> ClientResult<Comment> {
        self.client()
            .create_comment(request)
            .await?
            .into_inner()
            .comment
            .ok_or(ClientError::MalformedResponse("CreateComment returned no comment"))
    }

    pub async fn get_comment(&self, comment_id: &str) -> ClientResult<Comment> {
        self.client()
            .get_comment(GetCommentRequest {
                comment_id: comment_id.to_string(),
            })
            .await?
            .into_inner()
            .comment
            .ok_or(ClientError::MalformedResponse("GetComment returned no comment"))
    }

    /// Returns the score after the vote.
    pub async fn vote_comment(&self, comment_id: &str, upvote: bool) -> ClientResult<i64> {
        let resp = self
            .client()
            .vote_comment(VoteCommentRequest {
                comment_id: comment_id.to_string(),
                upvote,
            })
            .await?
            .into_inner();
        Ok(resp.score)
    }

    pub async fn moderate_comment(
        &self,
        comment_id: &str,
        status: CommentStatus,
    ) -> ClientResult<Comment> {
        self.client()
            .moderate_comment(ModerateCommentRequest {
                comment_id: comment_id.to_string(),
                status: status as i32,
            })
            .await?
            .into_inner()
            .comment
            .ok_or(ClientError::MalformedResponse("ModerateComment returned no comment"))
    }

    pub async fn get_top_comments_under_post(
        &self,
        post_id: &str,
        count: i32,
    ) -> ClientResult<Vec<Comment>> {
        Ok(self
            .client()
            .get_top_comments_under_post(GetTopCommentsUnderPostRequest {
                post_id: post_id.to_string(),
                count,
            })
            .await?
            .into_inner()
            .comments)
    }

    pub async fn expand_comment_branch(
        &self,
        comment_id: &str,
        count: i32,
    ) -> ClientResult<Vec<CommentNode>> {
        Ok(self
            .client()
            .expand_comment_branch(ExpandCommentBranchRequest {
                comment_id: comment_id.to_string(),
                count,
            })
            .await?
            .into_inner()
            .comment_nodes)
    }

    pub async fn expand_comment_tree(
        &self,
        comment_id: &str,
        count: i32,
        depth: i32,
    ) -> ClientResult<Vec<CommentTreeNode>> {
        Ok(self
            .client()
            .expand_comment_tree(ExpandCommentTreeRequest {
                comment_id: comment_id.to_string(),
                count,
                depth,
            })
            .await?
            .into_inner()
            .nodes)
    }

    /// Most upvoted reply to the most upvoted top-level comment of a post.
    ///
    /// `None` when the post does not exist, has no comments, or its best
    /// comment has no replies. Other failures are returned as errors.
    pub async fn retrieve_and_expand_comments(&self, post_id: &str) -> ClientResult<Option<Comment>> {
        match self.get_post(post_id).await {
            Ok(_) => {}
            Err(e) if e.code() == Some(tonic::Code::NotFound) => {
                debug!(%post_id, "Post not found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let top = self
            .get_top_comments_under_post(post_id, RETRIEVE_COUNT)
            .await?;
        let Some(best) = top.first() else {
            debug!(%post_id, "Post has no comments");
            return Ok(None);
        };

        let nodes = self
            .expand_comment_branch(&best.comment_id, RETRIEVE_COUNT)
            .await?;
        Ok(nodes.into_iter().next().and_then(|node| node.comment))
    }
}
