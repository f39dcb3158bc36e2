//! User service.
//!
//! Credential checks and session lifecycle belong to the external auth
//! collaborator; this service only resolves identities and runs the explicit
//! cascade when an account is removed.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::user,
    repositories::{CommentRepository, FollowRepository, PostRepository, UserRepository},
};
use sea_orm::Set;

/// User service for identity lookups and account deletion.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        follow_repo: FollowRepository,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
            comment_repo,
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Fetch a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }

    /// Resolve a bearer token to a user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Register a user with a fresh API token.
    pub async fn register(&self, username: &str, name: Option<String>) -> AppResult<user::Model> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("Username must not be empty".to_string()));
        }
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username already taken: {username}"
            )));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            name: Set(name),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.user_repo.create(model).await
    }

    /// Delete a user and everything they own.
    ///
    /// The cascade is executed explicitly, dependents first: comments by the
    /// user, comments on the user's posts, the posts themselves, follow rows
    /// on both sides, then the user row.
    pub async fn delete(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        self.comment_repo.delete_by_author(&user.id).await?;

        let post_ids = self.post_repo.ids_by_author(&user.id).await?;
        self.comment_repo.delete_by_posts(&post_ids).await?;
        let removed_posts = self.post_repo.delete_by_author(&user.id).await?;

        self.follow_repo.delete_by_user(&user.id).await?;
        self.user_repo.delete(&user.id).await?;

        tracing::info!(user_id = %user.id, removed_posts = removed_posts, "Deleted user");
        Ok(())
    }
}
