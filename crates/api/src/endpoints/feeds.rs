//! Feed endpoints: the index feed and the follow feed.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use quill_common::AppResult;
use serde::Serialize;

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{PageDto, PostDto, login_redirect},
};

use super::PageQuery;

/// Index feed response.
#[derive(Serialize)]
pub struct FeedResponse {
    pub page_obj: PageDto<PostDto>,
}

/// All posts, newest first. Served through the index feed cache.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let page = state.feed_service.index(query.number()).await?;

    Ok(Json(FeedResponse {
        page_obj: PageDto::from_page(page),
    })
    .into_response())
}

/// Posts by the authors the requester follows. Requires identity.
pub async fn following(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let Some(user) = user else {
        return Ok(login_redirect("/follow"));
    };

    let page = state.feed_service.following(&user.id, query.number()).await?;

    Ok(Json(FeedResponse {
        page_obj: PageDto::from_page(page),
    })
    .into_response())
}
