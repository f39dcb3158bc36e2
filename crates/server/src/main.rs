//! Quill server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use quill_api::{middleware::AppState, router as api_router};
use quill_common::Config;
use quill_core::{
    CommentService, FeedCache, FeedService, FollowService, GroupService, PostService, UserService,
};
use quill_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting quill server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = Arc::new(quill_db::init(&config).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    quill_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let user_repo = UserRepository::new(db.clone());
    let post_repo = PostRepository::new(db.clone());
    let comment_repo = CommentRepository::new(db.clone());
    let follow_repo = FollowRepository::new(db.clone());
    let group_repo = GroupRepository::new(db);

    // Initialize services
    let user_service = UserService::new(
        user_repo,
        post_repo.clone(),
        comment_repo.clone(),
        follow_repo.clone(),
    );
    let post_service = PostService::new(post_repo.clone(), group_repo.clone());
    let comment_service = CommentService::new(comment_repo, post_repo.clone());
    let follow_service = FollowService::new(follow_repo.clone());
    let feed_cache = FeedCache::new(Duration::from_secs(config.cache.feed_ttl_secs));
    let feed_service = FeedService::new(
        post_repo.clone(),
        follow_repo,
        feed_cache,
        config.pagination.page_size,
    );
    let group_service = GroupService::new(group_repo, post_repo);

    // Create app state
    let state = AppState {
        user_service,
        post_service,
        comment_service,
        follow_service,
        feed_service,
        group_service,
    };

    // Build router
    let app = api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            quill_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}
