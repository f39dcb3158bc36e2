//! Page-number pagination over sea-orm selects.
//!
//! Feed pages are addressed by a 1-based page number taken from the query
//! string. Out-of-range numbers clamp to the nearest valid page instead of
//! erroring, so `?page=9999` renders the last page and `?page=0` the first.

use quill_common::{AppError, AppResult};
use sea_orm::{ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, Select};
use serde::Serialize;

/// A bounded slice of an ordered result set plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based, after clamping).
    pub number: u64,
    /// Configured page size.
    pub page_size: u64,
    /// Total items across all pages.
    pub total_items: u64,
    /// Total pages (at least 1, even when empty).
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Map the items to another type, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Clamp a requested 1-based page number into `[1, max(total_pages, 1)]`.
#[must_use]
pub const fn clamp_page_number(requested: u64, total_pages: u64) -> u64 {
    let last = if total_pages == 0 { 1 } else { total_pages };
    if requested == 0 {
        1
    } else if requested > last {
        last
    } else {
        requested
    }
}

/// Fetch one page of a select, newest-first ordering supplied by the caller.
pub async fn fetch_page<C, E>(
    query: Select<E>,
    db: &C,
    requested: u64,
    page_size: u64,
) -> AppResult<Page<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let paginator = query.paginate(db, page_size);
    let totals = paginator
        .num_items_and_pages()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let number = clamp_page_number(requested, totals.number_of_pages);

    // PaginatorTrait pages are 0-based
    let items = paginator
        .fetch_page(number - 1)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Page {
        items,
        number,
        page_size,
        total_items: totals.number_of_items,
        total_pages: totals.number_of_pages.max(1),
    })
}
