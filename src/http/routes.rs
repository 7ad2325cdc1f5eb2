use axum::{routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn moderation() -> Router<AppState> {
    Router::new()
        .route("/moderate", post(handlers::moderate_content))
        .route("/moderation/audit", get(handlers::list_moderation_audit))
        .route("/moderation/:id", get(handlers::get_moderation_record))
}

pub fn review() -> Router<AppState> {
    Router::new()
        .route("/review-queue", get(handlers::list_review_queue))
        .route(
            "/review-queue/:id/resolve",
            post(handlers::resolve_review_entry),
        )
}

pub fn users() -> Router<AppState> {
    Router::new()
        .route("/users/:id/strikes", get(handlers::list_user_strikes))
        .route("/users/:id/standing", get(handlers::get_user_standing))
}
