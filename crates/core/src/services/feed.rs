//! Feed assembly service.
//!
//! Every feed is a newest-first page of posts. The index feed goes through a
//! process-wide TTL cache; the other feeds always hit the database.

use crate::cache::FeedCache;
use quill_common::AppResult;
use quill_db::{
    entities::post,
    pagination::Page,
    repositories::{FollowRepository, PostRepository},
};

/// Feed service for assembling paginated post listings.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    follow_repo: FollowRepository,
    cache: FeedCache,
    page_size: u64,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        follow_repo: FollowRepository,
        cache: FeedCache,
        page_size: u64,
    ) -> Self {
        Self {
            post_repo,
            follow_repo,
            cache,
            page_size,
        }
    }

    /// Index feed: all posts. Served through the TTL cache; staleness up to
    /// the configured TTL is expected behavior.
    pub async fn index(&self, page: u64) -> AppResult<Page<post::Model>> {
        if let Some(cached) = self.cache.get(page) {
            tracing::debug!(page = page, "Index feed served from cache");
            return Ok(cached);
        }

        let fetched = self.post_repo.paginate_all(page, self.page_size).await?;
        self.cache.insert(page, fetched.clone());
        Ok(fetched)
    }

    /// Group feed: posts in one group.
    pub async fn group(&self, group_id: &str, page: u64) -> AppResult<Page<post::Model>> {
        self.post_repo
            .paginate_by_group(group_id, page, self.page_size)
            .await
    }

    /// Profile feed: posts by one author.
    pub async fn profile(&self, author_id: &str, page: u64) -> AppResult<Page<post::Model>> {
        self.post_repo
            .paginate_by_author(author_id, page, self.page_size)
            .await
    }

    /// Follow feed: posts by the authors the user follows. The user's own
    /// posts are not included.
    pub async fn following(&self, user_id: &str, page: u64) -> AppResult<Page<post::Model>> {
        let followee_ids = self.follow_repo.followee_ids(user_id).await?;
        self.post_repo
            .paginate_by_authors(&followee_ids, page, self.page_size)
            .await
    }
}
