//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

// Re-export shared types from crispy-core
pub use crispy_core::types::{CompletionBreakdown, LevelTargets, QuestStep, TargetsMet};

// === Database Entity Types ===

/// Registered player account
#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub username: Option<String>,
    pub city: String,
    pub city_name: Option<String>,
    pub is_verified: bool,
    pub verification_code: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
    pub auth_token: Option<String>,
    pub total_score: i64,
    pub registration_source: String,
    pub quest_score: i64,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl DbUser {
    /// Convert to the public API representation (no credentials).
    pub fn to_api_user(&self) -> UserDto {
        UserDto {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            city: self.city.clone(),
            city_name: self.city_name.clone(),
            is_verified: self.is_verified,
            total_score: self.total_score,
            registration_source: self.registration_source.clone(),
            quest_score: self.quest_score,
            created_at: self.created_at,
        }
    }
}

/// Blocked cell on a level grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub row: i32,
    pub col: i32,
}

/// Match-three board configuration
#[derive(Debug, Clone, FromRow)]
pub struct DbLevel {
    pub id: i64,
    pub name: String,
    pub sort_order: i32,
    pub grid_width: i32,
    pub grid_height: i32,
    pub max_moves: i32,
    pub item_types: Json<Vec<String>>,
    pub targets: Json<LevelTargets>,
    pub obstacles: Json<Vec<Obstacle>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl DbLevel {
    pub fn to_api_level(&self) -> LevelDto {
        LevelDto {
            id: self.id,
            name: self.name.clone(),
            order: self.sort_order,
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            max_moves: self.max_moves,
            item_types: self.item_types.0.clone(),
            targets: self.targets.0.clone(),
            obstacles: self.obstacles.0.clone(),
            is_active: self.is_active,
        }
    }
}

/// One played attempt at a level
#[derive(Debug, Clone, FromRow)]
pub struct DbGameSession {
    pub id: i64,
    pub user_id: i64,
    pub level_id: i64,
    pub score: i64,
    pub moves_used: i32,
    pub targets_met: Option<Json<TargetsMet>>,
    pub duration_seconds: Option<i32>,
    pub is_completed: bool,
    pub is_won: bool,
    pub created_at: DateTime<Utc>,
}

impl DbGameSession {
    pub fn to_api_session(&self) -> GameSessionDto {
        GameSessionDto {
            id: self.id,
            user_id: self.user_id,
            level_id: self.level_id,
            score: self.score,
            moves_used: self.moves_used,
            targets_met: self.targets_met.as_ref().map(|t| t.0.clone()),
            duration_seconds: self.duration_seconds,
            is_completed: self.is_completed,
            is_won: self.is_won,
            created_at: self.created_at,
        }
    }
}

/// Best-ever record for a (user, level) pair
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUserLevelProgress {
    pub id: i64,
    pub user_id: i64,
    pub level_id: i64,
    pub best_score: i64,
    pub stars: i32,
    pub completed_at: Option<DateTime<Utc>>,
    pub attempts_count: i32,
}

/// One riddle step in the museum quest
#[derive(Debug, Clone, FromRow)]
pub struct DbQuestPage {
    pub id: i64,
    pub slug: String,
    pub sort_order: i32,
    pub title: String,
    pub riddle_text: String,
    pub fact_text: Option<String>,
    pub image_url: Option<String>,
    pub qr_token: String,
    pub points: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbQuestPage {
    /// Public representation; the QR token is never exposed.
    pub fn to_api_page(&self) -> QuestPageDto {
        QuestPageDto {
            id: self.id,
            slug: self.slug.clone(),
            order: self.sort_order,
            title: self.title.clone(),
            riddle_text: self.riddle_text.clone(),
            fact_text: self.fact_text.clone(),
            image_url: self.image_url.clone(),
            points: self.points,
            is_active: self.is_active,
        }
    }

    /// View consumed by the progression tracker.
    pub fn to_step(&self) -> QuestStep {
        QuestStep {
            id: self.id,
            order: self.sort_order,
            slug: self.slug.clone(),
        }
    }
}

/// Recorded outcome for a (user, quest page) pair
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbQuestProgress {
    pub id: i64,
    pub user_id: i64,
    pub quest_page_id: i64,
    pub is_correct: bool,
    pub is_skipped: bool,
    pub points_earned: i32,
    pub scanned_at: DateTime<Utc>,
}

/// Reward tier holding a batch of promo codes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPromoCodePool {
    pub id: i64,
    pub name: String,
    pub tier: String,
    pub min_score: i64,
    pub discount_label: Option<String>,
    pub total_codes: i32,
    pub used_codes: i32,
    pub alert_threshold: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl DbPromoCodePool {
    pub fn remaining_codes(&self) -> i32 {
        self.total_codes - self.used_codes
    }

    pub fn is_low(&self) -> bool {
        self.remaining_codes() < self.alert_threshold
    }
}

/// Individual promo code belonging to one pool
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPromoCode {
    pub id: i64,
    pub pool_id: i64,
    pub code: String,
    pub is_used: bool,
    pub used_by_user_id: Option<i64>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// === API Request/Response Types ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub city: String,
    pub city_name: Option<String>,
    pub is_verified: bool,
    pub total_score: i64,
    pub registration_source: String,
    pub quest_score: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDto {
    pub id: i64,
    pub name: String,
    pub order: i32,
    pub grid_width: i32,
    pub grid_height: i32,
    pub max_moves: i32,
    pub item_types: Vec<String>,
    pub targets: LevelTargets,
    pub obstacles: Vec<Obstacle>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSessionDto {
    pub id: i64,
    pub user_id: i64,
    pub level_id: i64,
    pub score: i64,
    pub moves_used: i32,
    pub targets_met: Option<TargetsMet>,
    pub duration_seconds: Option<i32>,
    pub is_completed: bool,
    pub is_won: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestPageDto {
    pub id: i64,
    pub slug: String,
    pub order: i32,
    pub title: String,
    pub riddle_text: String,
    pub fact_text: Option<String>,
    pub image_url: Option<String>,
    pub points: i32,
    pub is_active: bool,
}

// Auth types

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyEmailResponse {
    pub message: String,
    pub access_token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResendCodeRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserDto,
}

// Game types

#[derive(Debug, Serialize, Deserialize)]
pub struct StartGameRequest {
    pub level_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartGameResponse {
    pub session_id: i64,
    pub level: LevelDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteGameRequest {
    pub session_id: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub moves_used: i32,
    #[serde(default)]
    pub targets_met: TargetsMet,
    #[serde(default)]
    pub duration_seconds: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteGameResponse {
    pub is_won: bool,
    pub stars: u8,
    pub score: i64,
    pub moves_bonus: i64,
    pub completion: CompletionBreakdown,
    pub session: GameSessionDto,
}

// Level types

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelListResponse {
    pub levels: Vec<LevelDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelResponse {
    pub level: LevelDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelLeaderboardEntry {
    pub rank: usize,
    pub user_id: i64,
    pub username: Option<String>,
    pub score: i64,
    pub stars: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelLeaderboardResponse {
    pub leaderboard: Vec<LevelLeaderboardEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserProgressLevel {
    #[serde(flatten)]
    pub level: LevelDto,
    pub progress: Option<DbUserLevelProgress>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserProgressResponse {
    pub levels: Vec<UserProgressLevel>,
}

// Quest types

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestPagesResponse {
    pub pages: Vec<QuestPageDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestPageResponse {
    pub page: QuestPageDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanRequest {
    pub qr_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
    pub is_correct: bool,
    pub points_earned: i32,
    pub total_quest_score: i64,
    pub fact_text: Option<String>,
    pub page: QuestPageDto,
    pub next_page_slug: Option<String>,
    pub quest_completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkipResponse {
    pub skipped_page: String,
    pub next_page_slug: Option<String>,
    pub quest_completed: bool,
    pub total_quest_score: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestPageProgress {
    pub page_slug: String,
    pub page_order: i32,
    pub page_title: String,
    pub is_answered: bool,
    pub is_correct: bool,
    pub is_skipped: bool,
    pub points_earned: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestProgressResponse {
    pub progress: Vec<QuestPageProgress>,
    pub total_score: i64,
    pub total_pages: usize,
    pub answered_pages: usize,
    pub current_page_slug: Option<String>,
    pub quest_completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestResultResponse {
    pub total_score: i64,
    pub total_pages: usize,
    pub correct_answers: usize,
    pub skipped_answers: usize,
    pub answered_pages: usize,
    pub eligible_tier: Option<String>,
    pub eligible_discount: Option<String>,
    pub already_claimed: bool,
    pub claimed_code: Option<String>,
    pub claimed_tier: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimPromoResponse {
    pub code: String,
    pub tier: String,
    pub discount_label: Option<String>,
    pub already_claimed: bool,
}

// Leaderboard types

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: i64,
    pub username: Option<String>,
    pub total_score: i64,
    pub completed_levels: i64,
    pub total_stars: i64,
    pub city: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyLeaderboardEntry {
    pub rank: usize,
    pub user_id: i64,
    pub username: Option<String>,
    pub weekly_score: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeeklyLeaderboardResponse {
    pub leaderboard: Vec<WeeklyLeaderboardEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MyRankResponse {
    pub rank: i64,
    pub total_score: i64,
    pub total_players: i64,
    pub city: String,
    pub regional_rank: i64,
    pub regional_total_players: i64,
}
