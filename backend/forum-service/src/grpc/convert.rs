//! Mapping between domain types and the generated protobuf messages.

use super::proto;
use crate::domain::{
    Comment, CommentStatus, CommentTree, Media, NewComment, NewPost, NodeRef, Post, PostState,
};
use crate::error::{ServiceError, ServiceResult};

impl From<PostState> for proto::PostState {
    fn from(state: PostState) -> Self {
        match state {
            PostState::Normal => proto::PostState::Normal,
            PostState::Removed => proto::PostState::Removed,
            PostState::Locked => proto::PostState::Locked,
        }
    }
}

impl From<CommentStatus> for proto::CommentStatus {
    fn from(status: CommentStatus) -> Self {
        match status {
            CommentStatus::Normal => proto::CommentStatus::Normal,
            CommentStatus::Removed => proto::CommentStatus::Removed,
        }
    }
}

pub fn post_state_from_wire(value: i32) -> ServiceResult<PostState> {
    match proto::PostState::try_from(value) {
        Ok(proto::PostState::Normal) => Ok(PostState::Normal),
        Ok(proto::PostState::Removed) => Ok(PostState::Removed),
        Ok(proto::PostState::Locked) => Ok(PostState::Locked),
        Ok(proto::PostState::Unspecified) | Err(_) => Err(ServiceError::InvalidArgument(format!(
            "invalid post state {}",
            value
        ))),
    }
}

pub fn comment_status_from_wire(value: i32) -> ServiceResult<CommentStatus> {
    match proto::CommentStatus::try_from(value) {
        Ok(proto::CommentStatus::Normal) => Ok(CommentStatus::Normal),
        Ok(proto::CommentStatus::Removed) => Ok(CommentStatus::Removed),
        Ok(proto::CommentStatus::Unspecified) | Err(_) => Err(ServiceError::InvalidArgument(
            format!("invalid comment status {}", value),
        )),
    }
}

impl From<Post> for proto::Post {
    fn from(post: Post) -> Self {
        let media = match post.media {
            Media::Image(url) => proto::post::Media::ImageUrl(url),
            Media::Video(url) => proto::post::Media::VideoUrl(url),
        };
        proto::Post {
            post_id: post.id,
            title: post.title,
            text: post.text,
            author: post.author,
            media: Some(media),
            score: post.score,
            state: proto::PostState::from(post.state) as i32,
            created_at: post.created_at.timestamp_millis(),
            subreddit_id: post.subreddit_id,
            tags: post.tags,
        }
    }
}

impl From<Comment> for proto::Comment {
    fn from(comment: Comment) -> Self {
        let parent = match comment.parent {
            NodeRef::Post(id) => proto::comment::Parent::ParentPostId(id),
            NodeRef::Comment(id) => proto::comment::Parent::ParentCommentId(id),
        };
        proto::Comment {
            comment_id: comment.id,
            text: comment.text,
            author: comment.author,
            score: comment.score,
            status: proto::CommentStatus::from(comment.status) as i32,
            created_at: comment.created_at.timestamp_millis(),
            parent: Some(parent),
            has_replies: comment.has_replies,
            root_post_id: comment.root_post_id,
        }
    }
}

impl From<CommentTree> for proto::CommentTreeNode {
    fn from(tree: CommentTree) -> Self {
        proto::CommentTreeNode {
            comment: Some(tree.comment.into()),
            replies: tree.replies.into_iter().map(Into::into).collect(),
        }
    }
}

/// Flatten a two-level tree into a comment and its direct children.
impl From<CommentTree> for proto::CommentNode {
    fn from(tree: CommentTree) -> Self {
        proto::CommentNode {
            comment: Some(tree.comment.into()),
            children: tree
                .replies
                .into_iter()
                .map(|reply| reply.comment.into())
                .collect(),
        }
    }
}

impl From<proto::CreatePostRequest> for NewPost {
    fn from(req: proto::CreatePostRequest) -> Self {
        NewPost {
            title: req.title,
            text: req.text,
            author: req.author,
            image_url: req.image_url,
            video_url: req.video_url,
            subreddit_id: req.subreddit_id,
            tags: req.tags,
        }
    }
}

impl From<proto::CreateCommentRequest> for NewComment {
    fn from(req: proto::CreateCommentRequest) -> Self {
        NewComment {
            text: req.text,
            author: req.author,
            parent_post_id: req.parent_post_id,
            parent_comment_id: req.parent_comment_id,
        }
    }
}
