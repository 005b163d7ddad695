//! Leaderboard endpoints

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Extension, Json,
};
use chrono::{Datelike, Duration, Utc};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::routes::client_ip;
use crate::AppState;

/// GET /api/leaderboard
///
/// Global leaderboard by total score, optionally filtered by city.
/// Snapshots are memoized for 60 seconds.
pub async fn global(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let key = format!("{}:leaderboard", client_ip(&headers));
    if !state.cache.check_rate_limit(&key, 60, 60).await {
        return Err(ApiError::RateLimited);
    }

    let limit = query.limit.unwrap_or(100);
    let city = query
        .city
        .filter(|c| c == "moscow" || c == "region");

    let cache_key = format!("global:{}:{}", limit, city.as_deref().unwrap_or("all"));
    if let Some(cached) = state
        .cache
        .get_cached_leaderboard::<Vec<LeaderboardEntry>>(&cache_key)
        .await
    {
        return Ok(Json(LeaderboardResponse {
            leaderboard: cached,
            cached: Some(true),
        }));
    }

    let leaderboard = state
        .db
        .get_global_leaderboard(limit, city.as_deref())
        .await?;
    state.cache.cache_leaderboard(&cache_key, &leaderboard, 60).await;

    Ok(Json(LeaderboardResponse {
        leaderboard,
        cached: None,
    }))
}

/// GET /api/leaderboard/weekly
///
/// Scores earned in won sessions since Monday 00:00 UTC, memoized for two
/// minutes.
pub async fn weekly(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<WeeklyLeaderboardResponse>> {
    let key = format!("{}:leaderboard", client_ip(&headers));
    if !state.cache.check_rate_limit(&key, 60, 60).await {
        return Err(ApiError::RateLimited);
    }

    let limit = query.limit.unwrap_or(100);

    let cache_key = format!("weekly:{}", limit);
    if let Some(cached) = state
        .cache
        .get_cached_leaderboard::<Vec<WeeklyLeaderboardEntry>>(&cache_key)
        .await
    {
        return Ok(Json(WeeklyLeaderboardResponse {
            leaderboard: cached,
            cached: Some(true),
        }));
    }

    let now = Utc::now();
    let week_start = (now - Duration::days(now.weekday().num_days_from_monday() as i64))
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc();

    let leaderboard = state.db.get_weekly_leaderboard(week_start, limit).await?;
    state
        .cache
        .cache_leaderboard(&cache_key, &leaderboard, 120)
        .await;

    Ok(Json(WeeklyLeaderboardResponse {
        leaderboard,
        cached: None,
    }))
}

/// GET /api/leaderboard/my-rank
pub async fn my_rank(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<MyRankResponse>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(state.db.get_user_rank(&user).await?))
}
