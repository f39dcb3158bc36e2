//! API response types.
//!
//! Each read endpoint answers with a typed context DTO; write endpoints
//! answer with a `303 See Other` redirect. Validation failures redisplay the
//! submitted form with per-field errors instead of redirecting.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, FixedOffset};
use quill_db::{
    entities::{comment, group, post, user},
    pagination::Page,
};
use serde::Serialize;

/// A page of items plus the navigation facts a client needs to render a
/// pager.
#[derive(Debug, Serialize)]
pub struct PageDto<T: Serialize> {
    pub items: Vec<T>,
    pub number: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T: Serialize> PageDto<T> {
    /// Build a page DTO, converting each item.
    pub fn from_page<M: Into<T>>(page: Page<M>) -> Self {
        let has_next = page.has_next();
        let has_previous = page.has_previous();
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            number: page.number,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
            has_next,
            has_previous,
        }
    }
}

/// Post representation shared by every feed and detail endpoint.
#[derive(Debug, Serialize)]
pub struct PostDto {
    pub id: String,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: String,
}

impl From<post::Model> for PostDto {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            author_id: p.author_id,
            group_id: p.group_id,
            text: p.text,
            image: p.image,
            created_at: rfc3339(p.created_at),
        }
    }
}

/// Group representation.
#[derive(Debug, Serialize)]
pub struct GroupDto {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<group::Model> for GroupDto {
    fn from(g: group::Model) -> Self {
        Self {
            id: g.id,
            title: g.title,
            slug: g.slug,
            description: g.description,
        }
    }
}

/// Author representation for profile pages.
#[derive(Debug, Serialize)]
pub struct AuthorDto {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<user::Model> for AuthorDto {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
        }
    }
}

/// Comment representation.
#[derive(Debug, Serialize)]
pub struct CommentDto {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentDto {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            author_id: c.author_id,
            text: c.text,
            created_at: rfc3339(c.created_at),
        }
    }
}

/// Per-field validation errors, field name to messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Collect one message under a field name.
#[must_use]
pub fn field_error(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    errors
}

fn rfc3339(ts: DateTime<FixedOffset>) -> String {
    ts.to_rfc3339()
}

/// `303 See Other` to a location on this service.
pub fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

/// `303 See Other` to the login page, carrying the original path so the
/// caller can come back after authenticating.
#[must_use]
pub fn login_redirect(next: &str) -> Response {
    let target = format!("/auth/login?next={}", urlencoding::encode(next));
    Redirect::to(&target).into_response()
}

/// Fallback for unknown paths: a 404 body distinguishable from any endpoint
/// answering 404 for a missing record.
pub async fn fallback() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": {
                "code": "unknown_path",
                "message": "No such endpoint",
            }
        })),
    )
        .into_response()
}
