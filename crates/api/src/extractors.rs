//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use quill_db::entities::user;

/// Optional authenticated user extractor.
///
/// Carries `None` for anonymous requests; write handlers turn that into a
/// login redirect rather than an error body.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware when a bearer token resolves
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}
