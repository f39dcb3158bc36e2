//! Post service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::post,
    repositories::{GroupRepository, PostRepository},
};
use sea_orm::Set;

/// File extensions accepted for post image references.
const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Outcome of an edit attempt.
#[derive(Debug)]
pub enum EditOutcome {
    /// The edit was applied and persisted.
    Updated(post::Model),
    /// The actor is not the author. Nothing was changed; the caller must
    /// answer exactly as it would after a successful edit (redirect to the
    /// post detail view) so the two cases are indistinguishable.
    NotOwner(post::Model),
}

impl EditOutcome {
    /// The post after the attempt, changed or not.
    #[must_use]
    pub fn into_post(self) -> post::Model {
        match self {
            Self::Updated(post) | Self::NotOwner(post) => post,
        }
    }
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(post_repo: PostRepository, group_repo: GroupRepository) -> Self {
        Self {
            post_repo,
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    fn validate_text(text: &str) -> AppResult<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("Post text must not be empty".to_string()));
        }
        Ok(trimmed.to_string())
    }

    fn validate_image(image: Option<&str>) -> AppResult<()> {
        let Some(image) = image else {
            return Ok(());
        };
        let extension = image.rsplit('.').next().unwrap_or_default().to_lowercase();
        if ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Unsupported image type: {image}"
            )))
        }
    }

    /// Fetch a post by ID.
    pub async fn get(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(post_id).await
    }

    /// Create a post owned by `author_id`.
    ///
    /// Text must be non-empty; an optional group must exist; an optional
    /// image reference must carry an allowed extension.
    pub async fn create(
        &self,
        author_id: &str,
        text: &str,
        group_id: Option<String>,
        image: Option<String>,
    ) -> AppResult<post::Model> {
        let text = Self::validate_text(text)?;
        Self::validate_image(image.as_deref())?;

        if let Some(ref gid) = group_id {
            self.group_repo.get_by_id(gid).await?;
        }

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            group_id: Set(group_id),
            text: Set(text),
            image: Set(image),
            created_at: Set(chrono::Utc::now().into()),
        };

        let post = self.post_repo.create(model).await?;
        tracing::debug!(post_id = %post.id, author_id = %author_id, "Created post");
        Ok(post)
    }

    /// Edit a post.
    ///
    /// Loads the post (`PostNotFound` if absent). A non-author actor gets
    /// `EditOutcome::NotOwner` with the untouched post; only the author's
    /// edit is validated and persisted. `created_at` is never modified.
    pub async fn update(
        &self,
        actor_id: &str,
        post_id: &str,
        text: &str,
        group_id: Option<String>,
        image: Option<String>,
    ) -> AppResult<EditOutcome> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.author_id != actor_id {
            tracing::debug!(post_id = %post_id, actor_id = %actor_id, "Edit skipped: not the author");
            return Ok(EditOutcome::NotOwner(post));
        }

        let text = Self::validate_text(text)?;
        Self::validate_image(image.as_deref())?;

        if let Some(ref gid) = group_id {
            self.group_repo.get_by_id(gid).await?;
        }

        let mut active: post::ActiveModel = post.into();
        active.text = Set(text);
        active.group_id = Set(group_id);
        if let Some(img) = image {
            active.image = Set(Some(img));
        }

        let updated = self.post_repo.update(active).await?;
        Ok(EditOutcome::Updated(updated))
    }
}
