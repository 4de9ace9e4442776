use axum::{middleware, routing::get, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::auth_middleware;
use crate::comments::CommentRepository;
use crate::handlers::comments as comment_handlers;
use crate::Config;

#[derive(Clone)]
pub struct AppState {
    pub comments: CommentRepository,
    pub config: Config,
}

pub fn create_router(comments: CommentRepository, config: Config) -> Router {
    let state = AppState { comments, config };

    // Comment routes (nested under accounts/tasks)
    let comment_routes = Router::new()
        .route(
            "/",
            get(comment_handlers::list_comments).post(comment_handlers::create_comment),
        )
        .route(
            "/:comment_id",
            get(comment_handlers::get_comment)
                .patch(comment_handlers::update_comment)
                .delete(comment_handlers::delete_comment),
        );

    // Protected routes with auth middleware
    let protected_routes = Router::new()
        .nest("/accounts/:account_id/tasks/:task_id/comments", comment_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
