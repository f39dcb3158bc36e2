//! HTTP layer for quill.
//!
//! This crate maps the logical endpoints onto axum handlers:
//!
//! - **Endpoints**: feeds, post authoring, comments, follow graph
//! - **Extractors**: optional authenticated user from request extensions
//! - **Middleware**: bearer-token authentication
//! - **Responses**: typed context DTOs per endpoint plus redirects
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
