pub mod health;

use axum::{
    http::Uri,
    routing::{delete, get, post},
    Router,
};

use crate::errors::AppError;
use crate::feedback::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Public
        .route("/api/stats", get(handlers::handle_get_stats))
        .route("/api/comments", post(handlers::handle_submit_comment))
        // Admin (x-admin-password)
        .route("/api/admin/comments", get(handlers::handle_list_recent))
        .route(
            "/api/admin/comments/:id",
            delete(handlers::handle_delete_comment),
        )
        .route("/api/admin/export.csv", get(handlers::handle_export_csv))
        .fallback(not_found)
        .with_state(state)
}
