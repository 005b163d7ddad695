//! Museum quest endpoints
//!
//! The quest is a fixed linear sequence of QR-gated riddle pages. Scans
//! must arrive in order; each page is answered exactly once (scanned or
//! skipped); the cumulative score unlocks a promo tier.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::json;
use std::collections::HashSet;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;
use crispy_core::quest::{current_step, next_step, validate_scan};

/// GET /api/quest/pages
pub async fn pages(State(state): State<AppState>) -> Result<Json<QuestPagesResponse>> {
    let pages = state.db.get_active_quest_pages().await?;

    Ok(Json(QuestPagesResponse {
        pages: pages.iter().map(|p| p.to_api_page()).collect(),
    }))
}

/// GET /api/quest/pages/{slug}
pub async fn page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<QuestPageResponse>> {
    let page = state
        .db
        .get_quest_page_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Page not found".to_string()))?;

    Ok(Json(QuestPageResponse {
        page: page.to_api_page(),
    }))
}

/// POST /api/quest/scan
///
/// Validates a QR scan against the user's current step. Scanning a later
/// page is rejected even though its token is valid somewhere in the venue.
pub async fn scan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ScanResponse>> {
    let qr_token = payload.qr_token.trim();
    if qr_token.is_empty() {
        return Err(ApiError::BadRequest("qr_token is required".to_string()));
    }

    let scanned_page = state
        .db
        .get_quest_page_by_token(qr_token)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid QR code".to_string()))?;

    let pages = state.db.get_active_quest_pages().await?;
    let steps: Vec<QuestStep> = pages.iter().map(|p| p.to_step()).collect();
    let answered: HashSet<i64> = state
        .db
        .get_quest_progress(auth.user_id)
        .await?
        .iter()
        .map(|p| p.quest_page_id)
        .collect();

    validate_scan(&steps, &answered, scanned_page.id)?;

    let points = if scanned_page.points > 0 {
        scanned_page.points
    } else {
        10
    };

    let total_quest_score = state
        .db
        .record_quest_answer(auth.user_id, scanned_page.id, true, false, points)
        .await?;

    state
        .db
        .log_activity(
            auth.user_id,
            "quest_scan",
            json!({ "page_slug": scanned_page.slug, "points": points }),
        )
        .await;

    let next = next_step(&steps, &answered, scanned_page.id);

    Ok(Json(ScanResponse {
        is_correct: true,
        points_earned: points,
        total_quest_score,
        fact_text: scanned_page.fact_text.clone(),
        page: scanned_page.to_api_page(),
        next_page_slug: next.map(|p| p.slug.clone()),
        quest_completed: next.is_none(),
    }))
}

/// POST /api/quest/skip
///
/// Records the current step as skipped for zero points. The page is never
/// offered again.
pub async fn skip(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<SkipResponse>> {
    let pages = state.db.get_active_quest_pages().await?;
    let steps: Vec<QuestStep> = pages.iter().map(|p| p.to_step()).collect();
    let answered: HashSet<i64> = state
        .db
        .get_quest_progress(auth.user_id)
        .await?
        .iter()
        .map(|p| p.quest_page_id)
        .collect();

    let current = current_step(&steps, &answered)
        .ok_or_else(|| ApiError::Conflict("Quest already completed".to_string()))?;

    let total_quest_score = state
        .db
        .record_quest_answer(auth.user_id, current.id, false, true, 0)
        .await?;

    state
        .db
        .log_activity(
            auth.user_id,
            "quest_skip",
            json!({ "page_slug": current.slug }),
        )
        .await;

    let next = next_step(&steps, &answered, current.id);

    Ok(Json(SkipResponse {
        skipped_page: current.slug.clone(),
        next_page_slug: next.map(|p| p.slug.clone()),
        quest_completed: next.is_none(),
        total_quest_score,
    }))
}

/// GET /api/quest/progress
pub async fn progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<QuestProgressResponse>> {
    let pages = state.db.get_active_quest_pages().await?;
    let entries = state.db.get_quest_progress(auth.user_id).await?;
    let by_page: std::collections::HashMap<i64, &DbQuestProgress> =
        entries.iter().map(|p| (p.quest_page_id, p)).collect();

    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let pages_progress: Vec<QuestPageProgress> = pages
        .iter()
        .map(|page| {
            let entry = by_page.get(&page.id);
            QuestPageProgress {
                page_slug: page.slug.clone(),
                page_order: page.sort_order,
                page_title: page.title.clone(),
                is_answered: entry.is_some(),
                is_correct: entry.map(|e| e.is_correct).unwrap_or(false),
                is_skipped: entry.map(|e| e.is_skipped).unwrap_or(false),
                points_earned: entry.map(|e| e.points_earned).unwrap_or(0),
            }
        })
        .collect();

    let current_page_slug = pages_progress
        .iter()
        .find(|p| !p.is_answered)
        .map(|p| p.page_slug.clone());

    Ok(Json(QuestProgressResponse {
        quest_completed: current_page_slug.is_none(),
        current_page_slug,
        total_score: user.quest_score,
        total_pages: pages.len(),
        answered_pages: entries.len(),
        progress: pages_progress,
    }))
}

/// GET /api/quest/result
pub async fn result(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<QuestResultResponse>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let entries = state.db.get_quest_progress(auth.user_id).await?;
    let total_pages = state.db.get_active_quest_pages().await?.len();
    let correct_answers = entries.iter().filter(|p| p.is_correct).count();
    let skipped_answers = entries.iter().filter(|p| p.is_skipped).count();

    let eligible_pool = state.db.get_eligible_pool(user.quest_score).await?;
    let existing_claim = state.db.get_claim_for_user(auth.user_id).await?;

    Ok(Json(QuestResultResponse {
        total_score: user.quest_score,
        total_pages,
        correct_answers,
        skipped_answers,
        answered_pages: entries.len(),
        eligible_tier: eligible_pool.as_ref().map(|p| p.tier.clone()),
        eligible_discount: eligible_pool.and_then(|p| p.discount_label),
        already_claimed: existing_claim.is_some(),
        claimed_code: existing_claim.as_ref().map(|(c, _)| c.code.clone()),
        claimed_tier: existing_claim.map(|(_, p)| p.tier),
    }))
}

/// POST /api/quest/claim-promo
///
/// One claim per user, ever. A repeat request echoes the original code
/// instead of erroring.
pub async fn claim_promo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ClaimPromoResponse>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if let Some((code, pool)) = state.db.get_claim_for_user(auth.user_id).await? {
        return Ok(Json(ClaimPromoResponse {
            code: code.code,
            tier: pool.tier,
            discount_label: pool.discount_label,
            already_claimed: true,
        }));
    }

    let (code, pool) = state
        .db
        .claim_promo_code(auth.user_id, user.quest_score)
        .await?;

    state
        .db
        .log_activity(
            auth.user_id,
            "quest_claim_promo",
            json!({
                "code": code.code,
                "tier": pool.tier,
                "score": user.quest_score,
            }),
        )
        .await;

    Ok(Json(ClaimPromoResponse {
        code: code.code,
        tier: pool.tier,
        discount_label: pool.discount_label,
        already_claimed: false,
    }))
}
