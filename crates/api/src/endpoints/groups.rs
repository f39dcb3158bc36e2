//! Group feed endpoint.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use quill_common::AppResult;
use serde::Serialize;

use crate::{
    middleware::AppState,
    response::{GroupDto, PageDto, PostDto},
};

use super::PageQuery;

/// Group feed response.
#[derive(Serialize)]
pub struct GroupFeedResponse {
    pub group: GroupDto,
    pub page_obj: PageDto<PostDto>,
}

/// Posts in one group, newest first, with the group context.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let group = state.group_service.get_by_slug(&slug).await?;
    let page = state.feed_service.group(&group.id, query.number()).await?;

    Ok(Json(GroupFeedResponse {
        group: group.into(),
        page_obj: PageDto::from_page(page),
    })
    .into_response())
}
