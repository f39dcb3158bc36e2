//! Group service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::group,
    repositories::{GroupRepository, PostRepository},
};
use sea_orm::Set;

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub fn new(group_repo: GroupRepository, post_repo: PostRepository) -> Self {
        Self {
            group_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Fetch a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }

    /// Create a group. The slug must not be taken.
    pub async fn create(
        &self,
        title: &str,
        slug: &str,
        description: Option<String>,
    ) -> AppResult<group::Model> {
        if title.trim().is_empty() || slug.trim().is_empty() {
            return Err(AppError::Validation(
                "Group title and slug must not be empty".to_string(),
            ));
        }

        if self.group_repo.find_by_slug(slug).await?.is_some() {
            return Err(AppError::Conflict(format!("Slug already taken: {slug}")));
        }

        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(title.to_string()),
            slug: Set(slug.to_string()),
            description: Set(description),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.group_repo.create(model).await
    }

    /// Delete a group. Member posts survive with their group reference
    /// cleared (null-on-delete, executed explicitly before the row goes).
    pub async fn delete(&self, group_id: &str) -> AppResult<()> {
        let group = self.group_repo.get_by_id(group_id).await?;

        let detached = self.post_repo.clear_group(&group.id).await?;
        self.group_repo.delete(&group.id).await?;

        tracing::info!(group_id = %group.id, detached_posts = detached, "Deleted group");
        Ok(())
    }
}
