//! Post endpoints: detail view, authoring, editing, commenting.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use quill_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{CommentDto, FieldErrors, PostDto, field_error, login_redirect, see_other},
};

/// Post authoring form payload.
#[derive(Debug, Deserialize, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, message = "Post text must not be empty"))]
    pub text: String,
    pub group_id: Option<String>,
    pub image: Option<String>,
}

/// Comment form payload.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, message = "Comment text must not be empty"))]
    pub text: String,
}

/// The post form as redisplayed to the client, carrying the submitted
/// values and any per-field errors.
#[derive(Debug, Serialize)]
pub struct PostFormDto {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub errors: FieldErrors,
}

impl PostFormDto {
    fn empty() -> Self {
        Self {
            text: String::new(),
            group_id: None,
            image: None,
            errors: FieldErrors::new(),
        }
    }

    fn redisplay(form: &PostForm, errors: FieldErrors) -> Self {
        Self {
            text: form.text.clone(),
            group_id: form.group_id.clone(),
            image: form.image.clone(),
            errors,
        }
    }

    fn prefilled(post: &quill_db::entities::post::Model) -> Self {
        Self {
            text: post.text.clone(),
            group_id: post.group_id.clone(),
            image: post.image.clone(),
            errors: FieldErrors::new(),
        }
    }
}

/// The comment form as redisplayed to the client.
#[derive(Debug, Serialize)]
pub struct CommentFormDto {
    pub text: String,
    pub errors: FieldErrors,
}

impl CommentFormDto {
    fn empty() -> Self {
        Self {
            text: String::new(),
            errors: FieldErrors::new(),
        }
    }
}

/// Post detail response.
#[derive(Serialize)]
pub struct PostDetailResponse {
    pub post: PostDto,
    pub form: CommentFormDto,
    pub comments: Vec<CommentDto>,
}

/// Post form response, for both the blank form and redisplays.
#[derive(Serialize)]
pub struct PostFormResponse {
    pub form: PostFormDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostDto>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_edit: bool,
}

/// Comment form redisplay response.
#[derive(Serialize)]
pub struct CommentFormResponse {
    pub form: CommentFormDto,
}

fn collect_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| e.code.to_string(), ToString::to_string)
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Map a service-level validation message onto the form field it concerns.
fn service_error_field(message: &str) -> &'static str {
    if message.contains("image") {
        "image"
    } else {
        "text"
    }
}

/// A post with its comments (oldest first) and a blank comment form.
pub async fn detail(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post = state.post_service.get(&post_id).await?;
    let comments = state.comment_service.list_for_post(&post.id).await?;

    Ok(Json(PostDetailResponse {
        post: post.into(),
        form: CommentFormDto::empty(),
        comments: comments.into_iter().map(Into::into).collect(),
    })
    .into_response())
}

/// The blank authoring form. Requires identity.
pub async fn create_form(MaybeAuthUser(user): MaybeAuthUser) -> Response {
    if user.is_none() {
        return login_redirect("/create");
    }

    Json(PostFormResponse {
        form: PostFormDto::empty(),
        post: None,
        is_edit: false,
    })
    .into_response()
}

/// Create a post, then redirect to the author's profile. A validation
/// failure redisplays the form with field errors and no redirect.
pub async fn create(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(form): Json<PostForm>,
) -> AppResult<Response> {
    let Some(user) = user else {
        return Ok(login_redirect("/create"));
    };

    if let Err(errors) = form.validate() {
        return Ok(Json(PostFormResponse {
            form: PostFormDto::redisplay(&form, collect_errors(&errors)),
            post: None,
            is_edit: false,
        })
        .into_response());
    }

    match state
        .post_service
        .create(&user.id, &form.text, form.group_id.clone(), form.image.clone())
        .await
    {
        Ok(_) => Ok(see_other(&format!("/profile/{}", user.username))),
        Err(AppError::Validation(message)) => Ok(Json(PostFormResponse {
            form: PostFormDto::redisplay(
                &form,
                field_error(service_error_field(&message), message.clone()),
            ),
            post: None,
            is_edit: false,
        })
        .into_response()),
        Err(e) => Err(e),
    }
}

/// The edit form, prefilled for the author. A non-author is sent back to
/// the post detail view.
pub async fn edit_form(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let Some(user) = user else {
        return Ok(login_redirect(&format!("/posts/{post_id}/edit")));
    };

    let post = state.post_service.get(&post_id).await?;
    if post.author_id != user.id {
        return Ok(see_other(&format!("/posts/{post_id}")));
    }

    Ok(Json(PostFormResponse {
        form: PostFormDto::prefilled(&post),
        post: Some(post.into()),
        is_edit: true,
    })
    .into_response())
}

/// Apply an edit, then redirect to the post detail view. The non-author
/// case answers with the same redirect and no mutation.
pub async fn edit(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(form): Json<PostForm>,
) -> AppResult<Response> {
    let Some(user) = user else {
        return Ok(login_redirect(&format!("/posts/{post_id}/edit")));
    };

    if let Err(errors) = form.validate() {
        return Ok(Json(PostFormResponse {
            form: PostFormDto::redisplay(&form, collect_errors(&errors)),
            post: None,
            is_edit: true,
        })
        .into_response());
    }

    match state
        .post_service
        .update(
            &user.id,
            &post_id,
            &form.text,
            form.group_id.clone(),
            form.image.clone(),
        )
        .await
    {
        Ok(_) => Ok(see_other(&format!("/posts/{post_id}"))),
        Err(AppError::Validation(message)) => Ok(Json(PostFormResponse {
            form: PostFormDto::redisplay(
                &form,
                field_error(service_error_field(&message), message.clone()),
            ),
            post: None,
            is_edit: true,
        })
        .into_response()),
        Err(e) => Err(e),
    }
}

/// Add a comment, then redirect to the post detail view.
pub async fn comment(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(form): Json<CommentForm>,
) -> AppResult<Response> {
    let Some(user) = user else {
        return Ok(login_redirect(&format!("/posts/{post_id}/comment")));
    };

    if let Err(errors) = form.validate() {
        return Ok(Json(CommentFormResponse {
            form: CommentFormDto {
                text: form.text,
                errors: collect_errors(&errors),
            },
        })
        .into_response());
    }

    match state.comment_service.add(&user.id, &post_id, &form.text).await {
        Ok(_) => Ok(see_other(&format!("/posts/{post_id}"))),
        Err(AppError::Validation(message)) => Ok(Json(CommentFormResponse {
            form: CommentFormDto {
                text: form.text,
                errors: field_error("text", message),
            },
        })
        .into_response()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use quill_db::entities::{comment, post, user};
    use sea_orm::{DatabaseBackend, MockDatabase};
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

    fn create_test_post(id: &str, author_id: &str, text: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            group_id: None,
            text: text.to_string(),
            image: None,
            created_at: Utc::now().into(),
        }
    }

    fn json_post(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_create_redirects_to_login_with_next() {
        // No mock results: the handler must not reach the database.
        let app = app(StateBuilder::new().build());

        let response = app
            .oneshot(json_post(
                "/create",
                None,
                serde_json::json!({ "text": "hello" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/auth/login?next=%2Fcreate"
        );
    }

    #[tokio::test]
    async fn test_create_redirects_to_profile() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]]);
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "u1", "hello")]]);
        let app = app(StateBuilder::new().user_db(user_db).post_db(post_db).build());

        let response = app
            .oneshot(json_post(
                "/create",
                Some("tok"),
                serde_json::json!({ "text": "hello" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/profile/alice");
    }

    #[tokio::test]
    async fn test_create_empty_text_redisplays_form() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]]);
        // No post results: a rejected form must not insert.
        let app = app(StateBuilder::new().user_db(user_db).build());

        let response = app
            .oneshot(json_post(
                "/create",
                Some("tok"),
                serde_json::json!({ "text": "" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["form"]["errors"]["text"][0]
            .as_str()
            .unwrap()
            .contains("must not be empty"));
    }

    #[tokio::test]
    async fn test_create_bad_image_extension_redisplays_form() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]]);
        let app = app(StateBuilder::new().user_db(user_db).build());

        let response = app
            .oneshot(json_post(
                "/create",
                Some("tok"),
                serde_json::json!({ "text": "hello", "image": "payload.exe" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["form"]["errors"]["image"][0].is_string());
    }

    #[tokio::test]
    async fn test_edit_by_non_author_redirects_to_detail() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("intruder", "mallory")]]);
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "author", "original")]]);
        let app = app(StateBuilder::new().user_db(user_db).post_db(post_db).build());

        let response = app
            .oneshot(json_post(
                "/posts/p1/edit",
                Some("tok"),
                serde_json::json!({ "text": "overwritten" }),
            ))
            .await
            .unwrap();

        // Indistinguishable from a successful edit.
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/posts/p1");
    }

    #[tokio::test]
    async fn test_edit_form_for_non_author_redirects_to_detail() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("intruder", "mallory")]]);
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "author", "original")]]);
        let app = app(StateBuilder::new().user_db(user_db).post_db(post_db).build());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/posts/p1/edit")
                    .header(header::AUTHORIZATION, "Bearer tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/posts/p1");
    }

    #[tokio::test]
    async fn test_edit_form_for_author_is_prefilled() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]]);
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "u1", "original")]]);
        let app = app(StateBuilder::new().user_db(user_db).post_db(post_db).build());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/posts/p1/edit")
                    .header(header::AUTHORIZATION, "Bearer tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["is_edit"], true);
        assert_eq!(json["form"]["text"], "original");
    }

    #[tokio::test]
    async fn test_detail_lists_comments_with_blank_form() {
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "u1", "a post")]]);
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[comment::Model {
                id: "c1".to_string(),
                post_id: "p1".to_string(),
                author_id: "u2".to_string(),
                text: "first".to_string(),
                created_at: Utc::now().into(),
            }]]);
        let app = app(
            StateBuilder::new()
                .post_db(post_db)
                .comment_db(comment_db)
                .build(),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/posts/p1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["post"]["id"], "p1");
        assert_eq!(json["comments"][0]["text"], "first");
        assert_eq!(json["form"]["text"], "");
    }

    #[tokio::test]
    async fn test_comment_redirects_to_detail() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]]);
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "author", "a post")]]);
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[comment::Model {
                id: "c1".to_string(),
                post_id: "p1".to_string(),
                author_id: "u1".to_string(),
                text: "nice".to_string(),
                created_at: Utc::now().into(),
            }]]);
        let app = app(
            StateBuilder::new()
                .user_db(user_db)
                .post_db(post_db)
                .comment_db(comment_db)
                .build(),
        );

        let response = app
            .oneshot(json_post(
                "/posts/p1/comment",
                Some("tok"),
                serde_json::json!({ "text": "nice" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/posts/p1");
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_is_not_found() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]]);
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()]);
        let app = app(StateBuilder::new().user_db(user_db).post_db(post_db).build());

        let response = app
            .oneshot(json_post(
                "/posts/missing/comment",
                Some("tok"),
                serde_json::json!({ "text": "nice" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
