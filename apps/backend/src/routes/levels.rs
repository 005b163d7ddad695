//! Level catalogue endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// GET /api/levels
pub async fn list(State(state): State<AppState>) -> Result<Json<LevelListResponse>> {
    let levels = state.db.get_active_levels().await?;

    Ok(Json(LevelListResponse {
        levels: levels.iter().map(|l| l.to_api_level()).collect(),
    }))
}

/// GET /api/levels/{level_id}
pub async fn get_one(
    State(state): State<AppState>,
    Path(level_id): Path<i64>,
) -> Result<Json<LevelResponse>> {
    let level = state
        .db
        .get_level(level_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Level not found".to_string()))?;

    Ok(Json(LevelResponse {
        level: level.to_api_level(),
    }))
}

/// GET /api/levels/{level_id}/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    Path(level_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<LevelLeaderboardResponse>> {
    let limit = query.limit.unwrap_or(100);
    let leaderboard = state.db.get_level_leaderboard(level_id, limit).await?;

    Ok(Json(LevelLeaderboardResponse { leaderboard }))
}

/// GET /api/levels/user/progress
pub async fn user_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<UserProgressResponse>> {
    let progress = state.db.get_user_progress(auth.user_id).await?;
    let mut progress_by_level: HashMap<i64, DbUserLevelProgress> =
        progress.into_iter().map(|p| (p.level_id, p)).collect();

    let levels = state.db.get_active_levels().await?;

    let levels = levels
        .iter()
        .map(|level| UserProgressLevel {
            level: level.to_api_level(),
            progress: progress_by_level.remove(&level.id),
        })
        .collect();

    Ok(Json(UserProgressResponse { levels }))
}
