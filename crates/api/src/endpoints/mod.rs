//! API endpoints.

mod feeds;
mod groups;
mod posts;
mod profiles;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{middleware::AppState, response};

/// `?page=` query parameter. Absent or unparsable values mean page 1; the
/// pagination layer clamps everything else.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    page: Option<String>,
}

impl PageQuery {
    /// The requested page number, defaulting to 1.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(1)
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feeds::index))
        .route("/follow", get(feeds::following))
        .route("/group/{slug}", get(groups::show))
        .route("/profile/{username}", get(profiles::show))
        .route("/profile/{username}/follow", post(profiles::follow))
        .route("/profile/{username}/unfollow", post(profiles::unfollow))
        .route("/create", get(posts::create_form).post(posts::create))
        .route("/posts/{post_id}", get(posts::detail))
        .route("/posts/{post_id}/edit", get(posts::edit_form).post(posts::edit))
        .route("/posts/{post_id}/comment", post(posts::comment))
        .fallback(response::fallback)
}
