//! Comment service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment by `author_id` to a post.
    ///
    /// The post must exist and the text must be non-empty.
    pub async fn add(&self, author_id: &str, post_id: &str, text: &str) -> AppResult<comment::Model> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "Comment text must not be empty".to_string(),
            ));
        }

        // 404 before insert when the post is gone
        let post = self.post_repo.get_by_id(post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id),
            author_id: Set(author_id.to_string()),
            text: Set(trimmed.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %comment.id, post_id = %post_id, "Added comment");
        Ok(comment)
    }

    /// Comments on a post, oldest first.
    pub async fn list_for_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_post(post_id).await
    }
}
