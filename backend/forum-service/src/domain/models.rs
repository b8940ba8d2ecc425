use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Media attached to a post. Exactly one kind is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Media {
    Image(String),
    Video(String),
}

impl Media {
    pub fn image_url(&self) -> Option<&str> {
        match self {
            Media::Image(url) => Some(url),
            Media::Video(_) => None,
        }
    }

    pub fn video_url(&self) -> Option<&str> {
        match self {
            Media::Video(url) => Some(url),
            Media::Image(_) => None,
        }
    }
}

/// Post lifecycle state. `Locked` forbids new comments anywhere in the thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostState {
    Normal,
    Removed,
    Locked,
}

impl PostState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostState::Normal => "NORMAL",
            PostState::Removed => "REMOVED",
            PostState::Locked => "LOCKED",
        }
    }
}

impl fmt::Display for PostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(PostState::Normal),
            "REMOVED" => Ok(PostState::Removed),
            "LOCKED" => Ok(PostState::Locked),
            other => Err(format!("unknown post state '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentStatus {
    Normal,
    Removed,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Normal => "NORMAL",
            CommentStatus::Removed => "REMOVED",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(CommentStatus::Normal),
            "REMOVED" => Ok(CommentStatus::Removed),
            other => Err(format!("unknown comment status '{}'", other)),
        }
    }
}

/// A post or a comment. Used as a comment's single parent, as the key of the
/// children index and as a vote target.
///
/// Post and comment identifiers live in separate keyspaces, so the kind is
/// part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeRef {
    Post(String),
    Comment(String),
}

impl NodeRef {
    pub fn id(&self) -> &str {
        match self {
            NodeRef::Post(id) | NodeRef::Comment(id) => id,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Post(id) => write!(f, "post:{}", id),
            NodeRef::Comment(id) => write!(f, "comment:{}", id),
        }
    }
}

/// Post entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub text: String,
    pub author: String,
    pub media: Media,
    pub score: i64,
    pub state: PostState,
    pub created_at: DateTime<Utc>,
    pub subreddit_id: Option<String>,
    pub tags: Vec<String>,
}

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub score: i64,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub parent: NodeRef,
    /// Post at the top of this comment's parent chain.
    pub root_post_id: String,
    pub has_replies: bool,
}

/// Unvalidated post creation input, as decoded from the transport.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub author: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub subreddit_id: Option<String>,
    pub tags: Vec<String>,
}

/// Unvalidated comment creation input, as decoded from the transport.
#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub text: String,
    pub author: String,
    pub parent_post_id: Option<String>,
    pub parent_comment_id: Option<String>,
}

/// A comment with its ranked replies, bounded in depth and width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentTree {
    pub comment: Comment,
    pub replies: Vec<CommentTree>,
}

impl CommentTree {
    pub fn leaf(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }

    /// Number of comments in this tree, root included.
    pub fn node_count(&self) -> usize {
        1 + self.replies.iter().map(CommentTree::node_count).sum::<usize>()
    }
}
