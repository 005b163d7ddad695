//! Game session endpoints

use axum::{extract::State, Extension, Json};
use serde_json::json;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;
use crispy_core::scoring::evaluate;

/// POST /api/game/start
pub async fn start(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<StartGameRequest>,
) -> Result<Json<StartGameResponse>> {
    let level = state
        .db
        .get_level(payload.level_id)
        .await?
        .filter(|l| l.is_active)
        .ok_or_else(|| ApiError::NotFound("Level not found".to_string()))?;

    let session = state.db.create_session(auth.user_id, level.id).await?;

    // Ephemeral marker for anti-cheat checks; the session row is the
    // system of record.
    state
        .cache
        .store_session_marker(session.id, auth.user_id, level.id)
        .await;

    state
        .db
        .log_activity(
            auth.user_id,
            "start_game",
            json!({ "level_id": level.id, "session_id": session.id }),
        )
        .await;

    Ok(Json(StartGameResponse {
        session_id: session.id,
        level: level.to_api_level(),
    }))
}

/// POST /api/game/complete
///
/// Evaluates the reported result against the level targets and finalizes
/// the session. A session completes at most once; repeats get a conflict.
pub async fn complete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<CompleteGameRequest>,
) -> Result<Json<CompleteGameResponse>> {
    let key = format!("complete:{}", auth.user_id);
    if !state.cache.check_rate_limit(&key, 60, 3600).await {
        return Err(ApiError::RateLimited);
    }

    let session = state
        .db
        .get_session(payload.session_id)
        .await?
        .filter(|s| s.user_id == auth.user_id)
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    if session.is_completed {
        return Err(ApiError::Conflict("Session already completed".to_string()));
    }

    state
        .cache
        .validate_session_marker(session.id, auth.user_id)
        .await
        .map_err(ApiError::BadRequest)?;

    let level = state
        .db
        .get_level(session.level_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Level not found".to_string()))?;

    let result = evaluate(
        &level.targets.0,
        &payload.targets_met,
        payload.score,
        payload.moves_used,
        level.max_moves,
    );

    let session = state
        .db
        .complete_session(
            session.id,
            auth.user_id,
            level.id,
            result.final_score,
            payload.moves_used,
            &payload.targets_met,
            payload.duration_seconds,
            result.is_won,
            result.stars,
        )
        .await?;

    state.cache.delete_session_marker(session.id).await;

    state
        .db
        .log_activity(
            auth.user_id,
            "complete_game",
            json!({
                "level_id": level.id,
                "session_id": session.id,
                "score": result.final_score,
                "is_won": result.is_won,
                "stars": result.stars,
            }),
        )
        .await;

    Ok(Json(CompleteGameResponse {
        is_won: result.is_won,
        stars: result.stars,
        score: result.final_score,
        moves_bonus: result.moves_bonus,
        completion: result.completion,
        session: session.to_api_session(),
    }))
}
