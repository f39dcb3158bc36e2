//! Follow service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{entities::follow, repositories::FollowRepository};
use sea_orm::Set;

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository) -> Self {
        Self {
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow an author. Get-or-create semantics:
    ///
    /// - self-follow is a silent no-op, no row is created;
    /// - an existing pair is left untouched, no error;
    /// - a lost unique-index race on insert (concurrent identical request)
    ///   is swallowed, so the operation never duplicates the pair.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if follower_id == followee_id {
            tracing::debug!(user_id = %follower_id, "Self-follow ignored");
            return Ok(());
        }

        if self
            .follow_repo
            .find_by_pair(follower_id, followee_id)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.follow_repo.create(model).await {
            Ok(_) => Ok(()),
            // A concurrent identical request won the insert; the pair exists,
            // which is all this operation guarantees.
            Err(AppError::Database(msg)) if msg.contains("duplicate key") => {
                tracing::debug!(follower_id = %follower_id, followee_id = %followee_id, "Follow already created concurrently");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Unfollow an author. A missing pair is a silent no-op.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        self.follow_repo
            .delete_by_pair(follower_id, followee_id)
            .await
    }

    /// Check if a user is following an author.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, followee_id).await
    }

    /// IDs of the authors a user follows.
    pub async fn followee_ids(&self, follower_id: &str) -> AppResult<Vec<String>> {
        self.follow_repo.followee_ids(follower_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_follow(id: &str, follower_id: &str, followee_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> FollowService {
        FollowService::new(FollowRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_self_follow_is_noop() {
        // No query results appended: any database access would fail the test.
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.follow("user1", "user1").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_follow_existing_pair_is_noop() {
        let existing = create_test_follow("f1", "user1", "user2");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        // Only the pair lookup runs; no insert is attempted.
        let result = service.follow("user1", "user2").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_follow_creates_missing_pair() {
        let created = create_test_follow("f1", "user1", "user2");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()])
                .append_query_results([[created]]),
        );

        let result = service.follow("user1", "user2").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unfollow_missing_pair_is_noop() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()]),
        );

        let result = service.unfollow("user1", "user2").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_is_following() {
        let existing = create_test_follow("f1", "user1", "user2");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        assert!(service.is_following("user1", "user2").await.unwrap());
    }
}
