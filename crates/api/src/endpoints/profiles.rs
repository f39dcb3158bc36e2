//! Profile endpoints: author pages and the follow graph.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use quill_common::AppResult;
use serde::Serialize;

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{AuthorDto, PageDto, PostDto, login_redirect, see_other},
};

use super::PageQuery;

/// Profile page response.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub author: AuthorDto,
    pub page_obj: PageDto<PostDto>,
    /// Whether the requester follows this author. Always `false` for
    /// anonymous requests.
    pub following: bool,
}

/// An author's posts, newest first, with the follow flag for the requester.
pub async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let author = state.user_service.get_by_username(&username).await?;
    let page = state.feed_service.profile(&author.id, query.number()).await?;

    let following = match &viewer {
        Some(viewer) => {
            state
                .follow_service
                .is_following(&viewer.id, &author.id)
                .await?
        }
        None => false,
    };

    Ok(Json(ProfileResponse {
        author: author.into(),
        page_obj: PageDto::from_page(page),
        following,
    })
    .into_response())
}

/// Follow an author, then return to their profile.
pub async fn follow(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let Some(viewer) = viewer else {
        return Ok(login_redirect(&format!("/profile/{username}/follow")));
    };

    let author = state.user_service.get_by_username(&username).await?;
    state.follow_service.follow(&viewer.id, &author.id).await?;

    Ok(see_other(&format!("/profile/{username}")))
}

/// Unfollow an author, then return to their profile.
pub async fn unfollow(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let Some(viewer) = viewer else {
        return Ok(login_redirect(&format!("/profile/{username}/unfollow")));
    };

    let author = state.user_service.get_by_username(&username).await?;
    state
        .follow_service
        .unfollow(&viewer.id, &author.id)
        .await?;

    Ok(see_other(&format!("/profile/{username}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use maplit::btreemap;
    use quill_db::entities::{follow, user};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use tower::ServiceExt;

    use crate::endpoints::testing::{StateBuilder, app};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            name: None,
            token: Some("tok".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_anonymous_profile_has_following_false() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]]);
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![btreemap! { "num_items" => Value::BigInt(Some(0)) }]])
            .append_query_results([Vec::<quill_db::entities::post::Model>::new()]);
        let app = app(StateBuilder::new().user_db(user_db).post_db(post_db).build());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/profile/alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["author"]["username"], "alice");
        assert_eq!(json["following"], false);
    }

    #[tokio::test]
    async fn test_authenticated_profile_reports_follow_state() {
        // Token resolution, then the author lookup.
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("viewer", "bob")]])
            .append_query_results([[create_test_user("u1", "alice")]]);
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![btreemap! { "num_items" => Value::BigInt(Some(0)) }]])
            .append_query_results([Vec::<quill_db::entities::post::Model>::new()]);
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[follow::Model {
                id: "f1".to_string(),
                follower_id: "viewer".to_string(),
                followee_id: "u1".to_string(),
                created_at: Utc::now().into(),
            }]]);
        let app = app(
            StateBuilder::new()
                .user_db(user_db)
                .post_db(post_db)
                .follow_db(follow_db)
                .build(),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/profile/alice")
                    .header("Authorization", "Bearer tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["following"], true);
    }

    #[tokio::test]
    async fn test_anonymous_follow_redirects_to_login() {
        let app = app(StateBuilder::new().build());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/profile/alice/follow")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/auth/login?next=%2Fprofile%2Falice%2Ffollow"
        );
    }

    #[tokio::test]
    async fn test_follow_redirects_back_to_profile() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("viewer", "bob")]])
            .append_query_results([[create_test_user("u1", "alice")]]);
        // Pair lookup finds nothing, then the insert returns the row.
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<follow::Model>::new()])
            .append_query_results([[follow::Model {
                id: "f1".to_string(),
                follower_id: "viewer".to_string(),
                followee_id: "u1".to_string(),
                created_at: Utc::now().into(),
            }]]);
        let app = app(StateBuilder::new().user_db(user_db).follow_db(follow_db).build());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/profile/alice/follow")
                    .header("Authorization", "Bearer tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/profile/alice");
    }

    #[tokio::test]
    async fn test_unfollow_missing_pair_still_redirects() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("viewer", "bob")]])
            .append_query_results([[create_test_user("u1", "alice")]]);
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<follow::Model>::new()]);
        let app = app(StateBuilder::new().user_db(user_db).follow_db(follow_db).build());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/profile/alice/unfollow")
                    .header("Authorization", "Bearer tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/profile/alice");
    }
}
