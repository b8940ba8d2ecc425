use super::{ChildIndex, EntityStore};
use crate::domain::{Comment, CommentStatus, Media, NodeRef, Post, PostState};
use crate::error::{ServiceError, ServiceResult};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

const POST_COLUMNS: &str =
    "id, title, body, author, image_url, video_url, score, state, created_at, subreddit_id, tags";

const COMMENT_COLUMNS: &str = "id, body, author, score, status, created_at, parent_post_id, \
     parent_comment_id, root_post_id, has_replies";

/// PostgreSQL store. Score updates are single `UPDATE ... RETURNING`
/// statements, so concurrent votes are serialized by the row lock.
#[derive(Clone)]
pub struct PostgresForumStore {
    pool: PgPool,
}

impl PostgresForumStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: String,
    title: String,
    body: String,
    author: String,
    image_url: Option<String>,
    video_url: Option<String>,
    score: i64,
    state: String,
    created_at: DateTime<Utc>,
    subreddit_id: Option<String>,
    tags: Vec<String>,
}

impl TryFrom<PostRow> for Post {
    type Error = ServiceError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let media = match (row.image_url, row.video_url) {
            (Some(url), None) => Media::Image(url),
            (None, Some(url)) => Media::Video(url),
            _ => {
                return Err(ServiceError::Internal(format!(
                    "post {} has invalid media columns",
                    row.id
                )))
            }
        };
        let state = row.state.parse::<PostState>().map_err(ServiceError::Internal)?;

        Ok(Post {
            id: row.id,
            title: row.title,
            text: row.body,
            author: row.author,
            media,
            score: row.score,
            state,
            created_at: row.created_at,
            subreddit_id: row.subreddit_id,
            tags: row.tags,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: String,
    body: String,
    author: String,
    score: i64,
    status: String,
    created_at: DateTime<Utc>,
    parent_post_id: Option<String>,
    parent_comment_id: Option<String>,
    root_post_id: String,
    has_replies: bool,
}

impl TryFrom<CommentRow> for Comment {
    type Error = ServiceError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        let parent = match (row.parent_post_id, row.parent_comment_id) {
            (Some(id), None) => NodeRef::Post(id),
            (None, Some(id)) => NodeRef::Comment(id),
            _ => {
                return Err(ServiceError::Internal(format!(
                    "comment {} has invalid parent columns",
                    row.id
                )))
            }
        };
        let status = row
            .status
            .parse::<CommentStatus>()
            .map_err(ServiceError::Internal)?;

        Ok(Comment {
            id: row.id,
            text: row.body,
            author: row.author,
            score: row.score,
            status,
            created_at: row.created_at,
            parent,
            root_post_id: row.root_post_id,
            has_replies: row.has_replies,
        })
    }
}

#[async_trait::async_trait]
impl EntityStore for PostgresForumStore {
    async fn insert_post(&self, post: Post) -> ServiceResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (id, title, body, author, image_url, video_url, score, state, created_at, subreddit_id, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.text)
        .bind(&post.author)
        .bind(post.media.image_url())
        .bind(post.media.video_url())
        .bind(post.score)
        .bind(post.state.as_str())
        .bind(post.created_at)
        .bind(&post.subreddit_id)
        .bind(&post.tags)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::AlreadyExists(format!("post {}", post.id)));
        }

        debug!(post_id = %post.id, "Inserted post");
        Ok(())
    }

    async fn insert_comment(&self, comment: Comment) -> ServiceResult<()> {
        let (parent_post_id, parent_comment_id) = match &comment.parent {
            NodeRef::Post(id) => (Some(id.as_str()), None),
            NodeRef::Comment(id) => (None, Some(id.as_str())),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO comments (id, body, author, score, status, created_at, parent_post_id, parent_comment_id, root_post_id, has_replies)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.text)
        .bind(&comment.author)
        .bind(comment.score)
        .bind(comment.status.as_str())
        .bind(comment.created_at)
        .bind(parent_post_id)
        .bind(parent_comment_id)
        .bind(&comment.root_post_id)
        .bind(comment.has_replies)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::AlreadyExists(format!(
                "comment {}",
                comment.id
            )));
        }

        debug!(comment_id = %comment.id, parent = %comment.parent, "Inserted comment");
        Ok(())
    }

    async fn get_post(&self, post_id: &str) -> ServiceResult<Post> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::post_not_found(post_id))?;

        row.try_into()
    }

    async fn get_comment(&self, comment_id: &str) -> ServiceResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::comment_not_found(comment_id))?;

        row.try_into()
    }

    async fn get_posts(&self, post_ids: &[String]) -> ServiceResult<Vec<Post>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = ANY($1)",
            POST_COLUMNS
        ))
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Post::try_from).collect()
    }

    async fn get_comments(&self, comment_ids: &[String]) -> ServiceResult<Vec<Comment>> {
        if comment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {} FROM comments WHERE id = ANY($1)",
            COMMENT_COLUMNS
        ))
        .bind(comment_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    async fn mutate_score(&self, target: &NodeRef, delta: i64) -> ServiceResult<i64> {
        let sql = match target {
            NodeRef::Post(_) => "UPDATE posts SET score = score + $1 WHERE id = $2 RETURNING score",
            NodeRef::Comment(_) => {
                "UPDATE comments SET score = score + $1 WHERE id = $2 RETURNING score"
            }
        };

        let score: Option<i64> = sqlx::query_scalar(sql)
            .bind(delta)
            .bind(target.id())
            .fetch_optional(&self.pool)
            .await?;

        score.ok_or_else(|| match target {
            NodeRef::Post(id) => ServiceError::post_not_found(id),
            NodeRef::Comment(id) => ServiceError::comment_not_found(id),
        })
    }

    async fn set_has_replies(&self, comment_id: &str) -> ServiceResult<()> {
        let result = sqlx::query("UPDATE comments SET has_replies = TRUE WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::comment_not_found(comment_id));
        }
        Ok(())
    }

    async fn set_post_state(&self, post_id: &str, state: PostState) -> ServiceResult<Post> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts SET state = $1 WHERE id = $2 RETURNING {}",
            POST_COLUMNS
        ))
        .bind(state.as_str())
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::post_not_found(post_id))?;

        row.try_into()
    }

    async fn set_comment_status(
        &self,
        comment_id: &str,
        status: CommentStatus,
    ) -> ServiceResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "UPDATE comments SET status = $1 WHERE id = $2 RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(status.as_str())
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::comment_not_found(comment_id))?;

        row.try_into()
    }

    async fn health_check(&self) -> ServiceResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChildIndex for PostgresForumStore {
    async fn children_of(&self, parent: &NodeRef) -> ServiceResult<Vec<String>> {
        let sql = match parent {
            NodeRef::Post(_) => "SELECT id FROM comments WHERE parent_post_id = $1",
            NodeRef::Comment(_) => "SELECT id FROM comments WHERE parent_comment_id = $1",
        };

        let ids: Vec<String> = sqlx::query_scalar(sql)
            .bind(parent.id())
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn posts_in(&self, subreddit_id: &str) -> ServiceResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM posts WHERE subreddit_id = $1")
            .bind(subreddit_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_row() -> PostRow {
        PostRow {
            id: "p1".into(),
            title: "t".into(),
            body: "b".into(),
            author: "a".into(),
            image_url: Some("i.png".into()),
            video_url: None,
            score: 3,
            state: "LOCKED".into(),
            created_at: Utc::now(),
            subreddit_id: None,
            tags: vec!["rust".into()],
        }
    }

    #[test]
    fn post_row_maps_media_and_state() {
        let post = Post::try_from(post_row()).unwrap();
        assert_eq!(post.media, Media::Image("i.png".into()));
        assert_eq!(post.state, PostState::Locked);
        assert_eq!(post.text, "b");
    }

    #[test]
    fn corrupt_post_row_is_internal() {
        let mut row = post_row();
        row.video_url = Some("v.mp4".into());
        assert!(matches!(
            Post::try_from(row),
            Err(ServiceError::Internal(_))
        ));

        let mut row = post_row();
        row.state = "ARCHIVED".into();
        assert!(matches!(
            Post::try_from(row),
            Err(ServiceError::Internal(_))
        ));
    }

    #[test]
    fn comment_row_maps_parent() {
        let row = CommentRow {
            id: "c2".into(),
            body: "reply".into(),
            author: "a".into(),
            score: 0,
            status: "REMOVED".into(),
            created_at: Utc::now(),
            parent_post_id: None,
            parent_comment_id: Some("c1".into()),
            root_post_id: "p1".into(),
            has_replies: false,
        };
        let comment = Comment::try_from(row).unwrap();
        assert_eq!(comment.parent, NodeRef::Comment("c1".into()));
        assert_eq!(comment.status, CommentStatus::Removed);
    }
}
