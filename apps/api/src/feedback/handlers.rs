use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::feedback::stats::{LabelShare, Stats};
use crate::models::comment::CommentRecord;
use crate::state::AppState;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

const DEFAULT_RECENT: usize = 10;
const MAX_RECENT: usize = 500;

#[derive(Deserialize)]
pub struct SubmitCommentRequest {
    pub comment: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: Stats,
    pub distribution: Vec<LabelShare>,
}

#[derive(Serialize)]
pub struct RecentResponse {
    pub comments: Vec<CommentRecord>,
}

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let supplied = headers
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    if supplied != state.config.admin_password {
        tracing::warn!("Rejected admin request with wrong password");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// GET /api/stats
pub async fn handle_get_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.feedback.get_stats().await?;
    Ok(Json(StatsResponse {
        distribution: stats.distribution(),
        stats,
    }))
}

/// POST /api/comments
pub async fn handle_submit_comment(
    State(state): State<AppState>,
    Json(req): Json<SubmitCommentRequest>,
) -> Result<(StatusCode, Json<CommentRecord>), AppError> {
    let record = state
        .feedback
        .submit_comment(
            &req.comment,
            req.name.as_deref().unwrap_or_default(),
            req.email.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/admin/comments
pub async fn handle_list_recent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RecentQuery>,
) -> Result<Json<RecentResponse>, AppError> {
    require_admin(&state, &headers)?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT);
    if limit > MAX_RECENT {
        return Err(AppError::Validation(format!(
            "limit must be at most {MAX_RECENT}"
        )));
    }
    Ok(Json(RecentResponse {
        comments: state.feedback.list_recent(limit).await?,
    }))
}

/// DELETE /api/admin/comments/:id
pub async fn handle_delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    require_admin(&state, &headers)?;
    state.feedback.delete_comment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/export.csv
pub async fn handle_export_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &headers)?;
    let body = state.feedback.export_csv().await?;
    let disposition = format!(
        "attachment; filename=\"comments_{}.csv\"",
        Local::now().format("%Y%m%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
