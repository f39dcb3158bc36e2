//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use crate::pagination::{Page, fetch_page};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, sea_query::Expr,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Newest-first base query shared by all feeds.
    fn newest_first() -> Select<Post> {
        Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
    }

    /// Page of all posts (index feed).
    pub async fn paginate_all(&self, page: u64, page_size: u64) -> AppResult<Page<post::Model>> {
        fetch_page(Self::newest_first(), self.db.as_ref(), page, page_size).await
    }

    /// Page of posts in one group.
    pub async fn paginate_by_group(
        &self,
        group_id: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<Page<post::Model>> {
        let query = Self::newest_first().filter(post::Column::GroupId.eq(group_id));
        fetch_page(query, self.db.as_ref(), page, page_size).await
    }

    /// Page of posts by one author.
    pub async fn paginate_by_author(
        &self,
        author_id: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<Page<post::Model>> {
        let query = Self::newest_first().filter(post::Column::AuthorId.eq(author_id));
        fetch_page(query, self.db.as_ref(), page, page_size).await
    }

    /// Page of posts by a set of authors (follow feed).
    ///
    /// An empty author set short-circuits to an empty page without touching
    /// the database.
    pub async fn paginate_by_authors(
        &self,
        author_ids: &[String],
        page: u64,
        page_size: u64,
    ) -> AppResult<Page<post::Model>> {
        if author_ids.is_empty() {
            return Ok(Page {
                items: vec![],
                number: 1,
                page_size,
                total_items: 0,
                total_pages: 1,
            });
        }

        let query = Self::newest_first().filter(post::Column::AuthorId.is_in(author_ids.to_vec()));
        fetch_page(query, self.db.as_ref(), page, page_size).await
    }

    /// Clear the group reference on all posts of a group (null-on-delete).
    pub async fn clear_group(&self, group_id: &str) -> AppResult<u64> {
        let result = Post::update_many()
            .col_expr(post::Column::GroupId, Expr::value::<Option<String>>(None))
            .filter(post::Column::GroupId.eq(group_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// IDs of all posts by an author (for cascading their comments).
    pub async fn ids_by_author(&self, author_id: &str) -> AppResult<Vec<String>> {
        use sea_orm::QuerySelect;

        Post::find()
            .select_only()
            .column(post::Column::Id)
            .filter(post::Column::AuthorId.eq(author_id))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete all posts by an author (cascade on user deletion).
    pub async fn delete_by_author(&self, author_id: &str) -> AppResult<u64> {
        let result = Post::delete_many()
            .filter(post::Column::AuthorId.eq(author_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
