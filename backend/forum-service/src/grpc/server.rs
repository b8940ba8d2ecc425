use std::future::Future;
use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::info;

use super::convert::{comment_status_from_wire, post_state_from_wire};
use super::proto::forum_service_server::ForumService;
use super::proto::*;
use crate::domain::validation::{require_id, sanitize_count};
use crate::domain::NodeRef;
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::grpc::RequestGuard;
use crate::state::AppState;

pub struct ForumServiceImpl {
    state: Arc<AppState>,
}

impl ForumServiceImpl {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    fn count(&self, count: i32) -> ServiceResult<usize> {
        sanitize_count(i64::from(count), self.state.limits.max_count)
    }
}

/// Run a handler body, record its metrics and map the error.
async fn observe<T, F>(method: &'static str, body: F) -> Result<Response<T>, Status>
where
    F: Future<Output = ServiceResult<T>>,
{
    let guard = RequestGuard::new(method);
    let result = body.await.map(Response::new).map_err(Status::from);
    guard.finish(result)
}

fn require_post(post: &str) -> ServiceResult<NodeRef> {
    Ok(NodeRef::Post(require_id("post_id", post)?.to_string()))
}

fn require_comment(comment: &str) -> ServiceResult<NodeRef> {
    Ok(NodeRef::Comment(
        require_id("comment_id", comment)?.to_string(),
    ))
}

fn vote_message(target: &NodeRef, upvote: bool) -> String {
    let direction = if upvote { "Upvoted" } else { "Downvoted" };
    match target {
        NodeRef::Post(id) => format!("{} post {}", direction, id),
        NodeRef::Comment(id) => format!("{} comment {}", direction, id),
    }
}

#[tonic::async_trait]
impl ForumService for ForumServiceImpl {
    async fn create_post(
        &self,
        request: Request<CreatePostRequest>,
    ) -> Result<Response<CreatePostResponse>, Status> {
        observe("CreatePost", async {
            let post = self
                .state
                .posts
                .create_post(request.into_inner().into())
                .await?;
            Ok(CreatePostResponse {
                post: Some(post.into()),
            })
        })
        .await
    }

    async fn get_post(
        &self,
        request: Request<GetPostRequest>,
    ) -> Result<Response<GetPostResponse>, Status> {
        observe("GetPost", async {
            let req = request.into_inner();
            let post = self.state.posts.get_post(&req.post_id).await?;
            Ok(GetPostResponse {
                post: Some(post.into()),
            })
        })
        .await
    }

    async fn vote_post(
        &self,
        request: Request<VotePostRequest>,
    ) -> Result<Response<VotePostResponse>, Status> {
        observe("VotePost", async {
            let req = request.into_inner();
            let target = require_post(&req.post_id)?;
            let score = self.state.votes.vote(&target, req.upvote).await?;
            Ok(VotePostResponse {
                message: vote_message(&target, req.upvote),
                score,
            })
        })
        .await
    }

    async fn moderate_post(
        &self,
        request: Request<ModeratePostRequest>,
    ) -> Result<Response<ModeratePostResponse>, Status> {
        observe("ModeratePost", async {
            let req = request.into_inner();
            let state = post_state_from_wire(req.state)?;
            let post = self.state.posts.moderate_post(&req.post_id, state).await?;
            Ok(ModeratePostResponse {
                post: Some(post.into()),
            })
        })
        .await
    }

    async fn list_subreddit_posts(
        &self,
        request: Request<ListSubredditPostsRequest>,
    ) -> Result<Response<ListSubredditPostsResponse>, Status> {
        observe("ListSubredditPosts", async {
            let req = request.into_inner();
            let count = self.count(req.count)?;
            let posts = self
                .state
                .posts
                .list_subreddit_posts(&req.subreddit_id, count)
                .await?;
            info!(subreddit_id = %req.subreddit_id, count, returned = posts.len(), "Listed community posts");
            Ok(ListSubredditPostsResponse {
                posts: posts.into_iter().map(Into::into).collect(),
            })
        })
        .await
    }

    async fn create_comment(
        &self,
        request: Request<CreateCommentRequest>,
    ) -> Result<Response<CreateCommentResponse>, Status> {
        observe("CreateComment", async {
            let comment = self
                .state
                .comments
                .create_comment(request.into_inner().into())
                .await?;
            Ok(CreateCommentResponse {
                comment: Some(comment.into()),
            })
        })
        .await
    }

    async fn get_comment(
        &self,
        request: Request<GetCommentRequest>,
    ) -> Result<Response<GetCommentResponse>, Status> {
        observe("GetComment", async {
            let req = request.into_inner();
            let comment = self.state.comments.get_comment(&req.comment_id).await?;
            Ok(GetCommentResponse {
                comment: Some(comment.into()),
            })
        })
        .await
    }

    async fn vote_comment(
        &self,
        request: Request<VoteCommentRequest>,
    ) -> Result<Response<VoteCommentResponse>, Status> {
        observe("VoteComment", async {
            let req = request.into_inner();
            let target = require_comment(&req.comment_id)?;
            let score = self.state.votes.vote(&target, req.upvote).await?;
            Ok(VoteCommentResponse {
                message: vote_message(&target, req.upvote),
                score,
            })
        })
        .await
    }

    async fn moderate_comment(
        &self,
        request: Request<ModerateCommentRequest>,
    ) -> Result<Response<ModerateCommentResponse>, Status> {
        observe("ModerateComment", async {
            let req = request.into_inner();
            let status = comment_status_from_wire(req.status)?;
            let comment = self
                .state
                .comments
                .moderate_comment(&req.comment_id, status)
                .await?;
            Ok(ModerateCommentResponse {
                comment: Some(comment.into()),
            })
        })
        .await
    }

    async fn get_top_comments_under_post(
        &self,
        request: Request<GetTopCommentsUnderPostRequest>,
    ) -> Result<Response<GetTopCommentsUnderPostResponse>, Status> {
        observe("GetTopCommentsUnderPost", async {
            let req = request.into_inner();
            let root = require_post(&req.post_id)?;
            let count = self.count(req.count)?;
            let comments = self.state.expander.top_children(&root, count).await?;
            info!(post_id = %req.post_id, count, returned = comments.len(), "Fetched top comments");
            Ok(GetTopCommentsUnderPostResponse {
                comments: comments.into_iter().map(Into::into).collect(),
            })
        })
        .await
    }

    async fn expand_comment_branch(
        &self,
        request: Request<ExpandCommentBranchRequest>,
    ) -> Result<Response<ExpandCommentBranchResponse>, Status> {
        observe("ExpandCommentBranch", async {
            let req = request.into_inner();
            let root = require_comment(&req.comment_id)?;
            let count = self.count(req.count)?;
            let nodes = self.state.expander.expand_branch(&root, count).await?;
            info!(comment_id = %req.comment_id, count, returned = nodes.len(), "Expanded comment branch");
            Ok(ExpandCommentBranchResponse {
                comment_nodes: nodes.into_iter().map(Into::into).collect(),
            })
        })
        .await
    }

    async fn expand_comment_tree(
        &self,
        request: Request<ExpandCommentTreeRequest>,
    ) -> Result<Response<ExpandCommentTreeResponse>, Status> {
        observe("ExpandCommentTree", async {
            let req = request.into_inner();
            let root = require_comment(&req.comment_id)?;
            let count = self.count(req.count)?;
            if req.depth < 0 {
                return Err(ServiceError::InvalidArgument(format!(
                    "depth must be non-negative, got {}",
                    req.depth
                )));
            }
            let depth = usize::try_from(req.depth).unwrap_or(1);
            let nodes = self
                .state
                .expander
                .expand_tree(&root, count, depth)
                .await?;
            info!(comment_id = %req.comment_id, count, depth, returned = nodes.len(), "Expanded comment tree");
            Ok(ExpandCommentTreeResponse {
                nodes: nodes.into_iter().map(Into::into).collect(),
            })
        })
        .await
    }
}
