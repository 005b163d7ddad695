//! PostgreSQL database operations

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{is_unique_violation, ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Database(e.into()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Create a new unverified user
    #[allow(clippy::too_many_arguments)]
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        username: &str,
        city: &str,
        city_name: Option<&str>,
        registration_source: &str,
        verification_code: &str,
        verification_expires_at: DateTime<Utc>,
    ) -> Result<DbUser> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            INSERT INTO users (email, password_hash, username, city, city_name,
                              registration_source, verification_code, verification_expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, email, password_hash, username, city, city_name, is_verified,
                      verification_code, verification_expires_at, auth_token, total_score,
                      registration_source, quest_score, created_at, last_login_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(username)
        .bind(city)
        .bind(city_name)
        .bind(registration_source)
        .bind(verification_code)
        .bind(verification_expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Email already registered".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        Ok(user)
    }

    /// Get user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, email, password_hash, username, city, city_name, is_verified,
                   verification_code, verification_expires_at, auth_token, total_score,
                   registration_source, quest_score, created_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, email, password_hash, username, city, city_name, is_verified,
                   verification_code, verification_expires_at, auth_token, total_score,
                   registration_source, quest_score, created_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by bearer token
    pub async fn get_user_by_auth_token(&self, token: &str) -> Result<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, email, password_hash, username, city, city_name, is_verified,
                   verification_code, verification_expires_at, auth_token, total_score,
                   registration_source, quest_score, created_at, last_login_at
            FROM users
            WHERE auth_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Store a fresh verification code with its expiry (DB fallback copy)
    pub async fn set_verification_code(
        &self,
        user_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET verification_code = $2, verification_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Mark user verified and clear the stored code
    pub async fn mark_verified(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_verified = TRUE, verification_code = NULL, verification_expires_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Issue a new bearer token for the user
    pub async fn issue_auth_token(&self, user_id: i64) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            UPDATE users
            SET auth_token = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&token)
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    /// Invalidate the user's bearer token
    pub async fn clear_auth_token(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET auth_token = NULL
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Update user last_login_at timestamp
    pub async fn update_last_login(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Level Repository ===

    /// Get all active levels in play order
    pub async fn get_active_levels(&self) -> Result<Vec<DbLevel>> {
        let levels = sqlx::query_as::<_, DbLevel>(
            r#"
            SELECT id, name, sort_order, grid_width, grid_height, max_moves,
                   item_types, targets, obstacles, is_active, created_at
            FROM levels
            WHERE is_active = TRUE
            ORDER BY sort_order
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Get level by ID
    pub async fn get_level(&self, level_id: i64) -> Result<Option<DbLevel>> {
        let level = sqlx::query_as::<_, DbLevel>(
            r#"
            SELECT id, name, sort_order, grid_width, grid_height, max_moves,
                   item_types, targets, obstacles, is_active, created_at
            FROM levels
            WHERE id = $1
            "#,
        )
        .bind(level_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    /// Get per-level leaderboard (verified users with a recorded best)
    pub async fn get_level_leaderboard(
        &self,
        level_id: i64,
        limit: i64,
    ) -> Result<Vec<LevelLeaderboardEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT p.user_id, u.username, p.best_score, p.stars
            FROM user_level_progress p
            JOIN users u ON u.id = p.user_id
            WHERE p.level_id = $1 AND p.best_score > 0 AND u.is_verified = TRUE
            ORDER BY p.best_score DESC
            LIMIT $2
            "#,
        )
        .bind(level_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let leaderboard = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| LevelLeaderboardEntry {
                rank: idx + 1,
                user_id: row.get("user_id"),
                username: row.get("username"),
                score: row.get("best_score"),
                stars: row.get("stars"),
            })
            .collect();

        Ok(leaderboard)
    }

    /// Get all level progress rows for a user
    pub async fn get_user_progress(&self, user_id: i64) -> Result<Vec<DbUserLevelProgress>> {
        let progress = sqlx::query_as::<_, DbUserLevelProgress>(
            r#"
            SELECT id, user_id, level_id, best_score, stars, completed_at, attempts_count
            FROM user_level_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(progress)
    }

    // === Game Session Repository ===

    /// Create a new game session for a level attempt
    pub async fn create_session(&self, user_id: i64, level_id: i64) -> Result<DbGameSession> {
        let session = sqlx::query_as::<_, DbGameSession>(
            r#"
            INSERT INTO game_sessions (user_id, level_id)
            VALUES ($1, $2)
            RETURNING id, user_id, level_id, score, moves_used, targets_met,
                      duration_seconds, is_completed, is_won, created_at
            "#,
        )
        .bind(user_id)
        .bind(level_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Get game session by ID
    pub async fn get_session(&self, session_id: i64) -> Result<Option<DbGameSession>> {
        let session = sqlx::query_as::<_, DbGameSession>(
            r#"
            SELECT id, user_id, level_id, score, moves_used, targets_met,
                   duration_seconds, is_completed, is_won, created_at
            FROM game_sessions
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Finalize a session and, on a win, fold the result into the user's
    /// per-level progress and total score. All-or-nothing: runs in one
    /// transaction.
    ///
    /// The conditional UPDATE makes completion terminal even under a
    /// concurrent double submit: the loser of the race matches no row and
    /// gets a conflict.
    #[allow(clippy::too_many_arguments)]
    pub async fn complete_session(
        &self,
        session_id: i64,
        user_id: i64,
        level_id: i64,
        score: i64,
        moves_used: i32,
        targets_met: &TargetsMet,
        duration_seconds: i32,
        is_won: bool,
        stars: u8,
    ) -> Result<DbGameSession> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, DbGameSession>(
            r#"
            UPDATE game_sessions
            SET score = $2, moves_used = $3, targets_met = $4,
                duration_seconds = $5, is_completed = TRUE, is_won = $6
            WHERE id = $1 AND is_completed = FALSE
            RETURNING id, user_id, level_id, score, moves_used, targets_met,
                      duration_seconds, is_completed, is_won, created_at
            "#,
        )
        .bind(session_id)
        .bind(score)
        .bind(moves_used)
        .bind(Json(targets_met))
        .bind(duration_seconds)
        .bind(is_won)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::Conflict("Session already completed".to_string()))?;

        if is_won {
            // Raise-only upsert: best_score and stars never decrease,
            // completed_at is set exactly once.
            sqlx::query(
                r#"
                INSERT INTO user_level_progress (user_id, level_id, best_score, stars,
                                                completed_at, attempts_count)
                VALUES ($1, $2, $3, $4, NOW(), 1)
                ON CONFLICT (user_id, level_id) DO UPDATE SET
                    attempts_count = user_level_progress.attempts_count + 1,
                    best_score = GREATEST(user_level_progress.best_score, EXCLUDED.best_score),
                    stars = GREATEST(user_level_progress.stars, EXCLUDED.stars),
                    completed_at = COALESCE(user_level_progress.completed_at, EXCLUDED.completed_at)
                "#,
            )
            .bind(user_id)
            .bind(level_id)
            .bind(score)
            .bind(stars as i32)
            .execute(&mut *tx)
            .await?;

            // Full re-sum rather than an incremental add: per-level bests can
            // change through more than one path, the sum is the authority.
            sqlx::query(
                r#"
                UPDATE users
                SET total_score = (
                    SELECT COALESCE(SUM(best_score), 0)
                    FROM user_level_progress
                    WHERE user_id = $1
                )
                WHERE id = $1
                "#,
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(session)
    }

    // === Quest Repository ===

    /// Get all active quest pages in sequence order
    pub async fn get_active_quest_pages(&self) -> Result<Vec<DbQuestPage>> {
        let pages = sqlx::query_as::<_, DbQuestPage>(
            r#"
            SELECT id, slug, sort_order, title, riddle_text, fact_text, image_url,
                   qr_token, points, is_active, created_at, updated_at
            FROM quest_pages
            WHERE is_active = TRUE
            ORDER BY sort_order
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(pages)
    }

    /// Get an active quest page by slug
    pub async fn get_quest_page_by_slug(&self, slug: &str) -> Result<Option<DbQuestPage>> {
        let page = sqlx::query_as::<_, DbQuestPage>(
            r#"
            SELECT id, slug, sort_order, title, riddle_text, fact_text, image_url,
                   qr_token, points, is_active, created_at, updated_at
            FROM quest_pages
            WHERE slug = $1 AND is_active = TRUE
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(page)
    }

    /// Resolve a scanned QR token to its active page
    pub async fn get_quest_page_by_token(&self, qr_token: &str) -> Result<Option<DbQuestPage>> {
        let page = sqlx::query_as::<_, DbQuestPage>(
            r#"
            SELECT id, slug, sort_order, title, riddle_text, fact_text, image_url,
                   qr_token, points, is_active, created_at, updated_at
            FROM quest_pages
            WHERE qr_token = $1 AND is_active = TRUE
            "#,
        )
        .bind(qr_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(page)
    }

    /// Get all quest progress entries for a user
    pub async fn get_quest_progress(&self, user_id: i64) -> Result<Vec<DbQuestProgress>> {
        let progress = sqlx::query_as::<_, DbQuestProgress>(
            r#"
            SELECT id, user_id, quest_page_id, is_correct, is_skipped,
                   points_earned, scanned_at
            FROM quest_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(progress)
    }

    /// Record a quest answer (scan or skip), award its points, and flip a
    /// game-sourced registration to `transferred`. Returns the new
    /// cumulative quest score.
    ///
    /// The (user, page) uniqueness constraint backstops duplicate
    /// submissions; the violation surfaces as a conflict.
    pub async fn record_quest_answer(
        &self,
        user_id: i64,
        quest_page_id: i64,
        is_correct: bool,
        is_skipped: bool,
        points_earned: i32,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quest_progress (user_id, quest_page_id, is_correct,
                                       is_skipped, points_earned)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(quest_page_id)
        .bind(is_correct)
        .bind(is_skipped)
        .bind(points_earned)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Page already scanned".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        let quest_score: i64 = sqlx::query_scalar(
            r#"
            UPDATE users
            SET quest_score = quest_score + $2,
                registration_source = CASE
                    WHEN registration_source = 'game' THEN 'transferred'
                    ELSE registration_source
                END
            WHERE id = $1
            RETURNING quest_score
            "#,
        )
        .bind(user_id)
        .bind(points_earned as i64)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(quest_score)
    }

    // === Promo Repository ===

    /// Get the code a user has already claimed, with its pool
    pub async fn get_claim_for_user(
        &self,
        user_id: i64,
    ) -> Result<Option<(DbPromoCode, DbPromoCodePool)>> {
        let code = sqlx::query_as::<_, DbPromoCode>(
            r#"
            SELECT id, pool_id, code, is_used, used_by_user_id, used_at, created_at
            FROM promo_codes
            WHERE used_by_user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(code) = code else {
            return Ok(None);
        };

        let pool = sqlx::query_as::<_, DbPromoCodePool>(
            r#"
            SELECT id, name, tier, min_score, discount_label, total_codes,
                   used_codes, alert_threshold, is_active, created_at
            FROM promo_code_pools
            WHERE id = $1
            "#,
        )
        .bind(code.pool_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some((code, pool)))
    }

    /// Best active tier the score qualifies for (highest threshold first)
    pub async fn get_eligible_pool(&self, quest_score: i64) -> Result<Option<DbPromoCodePool>> {
        let pool = sqlx::query_as::<_, DbPromoCodePool>(
            r#"
            SELECT id, name, tier, min_score, discount_label, total_codes,
                   used_codes, alert_threshold, is_active, created_at
            FROM promo_code_pools
            WHERE is_active = TRUE AND min_score <= $1
            ORDER BY min_score DESC
            LIMIT 1
            "#,
        )
        .bind(quest_score)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pool)
    }

    /// Allocate one unused code from the best tier the score qualifies for.
    ///
    /// The row lock (FOR UPDATE SKIP LOCKED) guarantees two concurrent
    /// claims never receive the same code; a claimant that finds nothing
    /// lockable gets the retry-able exhaustion error. Code update and pool
    /// counter move in the same transaction.
    pub async fn claim_promo_code(
        &self,
        user_id: i64,
        quest_score: i64,
    ) -> Result<(DbPromoCode, DbPromoCodePool)> {
        let mut tx = self.pool.begin().await?;

        let pool = sqlx::query_as::<_, DbPromoCodePool>(
            r#"
            SELECT id, name, tier, min_score, discount_label, total_codes,
                   used_codes, alert_threshold, is_active, created_at
            FROM promo_code_pools
            WHERE is_active = TRUE AND min_score <= $1
            ORDER BY min_score DESC
            LIMIT 1
            "#,
        )
        .bind(quest_score)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::PromoIneligible)?;

        let code_id: i64 = sqlx::query_scalar(
            r#"
            SELECT id
            FROM promo_codes
            WHERE pool_id = $1 AND is_used = FALSE
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(pool.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::PromoExhausted)?;

        let code = sqlx::query_as::<_, DbPromoCode>(
            r#"
            UPDATE promo_codes
            SET is_used = TRUE, used_by_user_id = $2, used_at = NOW()
            WHERE id = $1
            RETURNING id, pool_id, code, is_used, used_by_user_id, used_at, created_at
            "#,
        )
        .bind(code_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE promo_code_pools
            SET used_codes = used_codes + 1
            WHERE id = $1
            "#,
        )
        .bind(pool.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if pool.is_low() {
            tracing::warn!(
                pool = %pool.name,
                remaining = pool.remaining_codes() - 1,
                "promo pool running low"
            );
        }

        Ok((code, pool))
    }

    // === Leaderboard Repository ===

    /// Global leaderboard by total score, optionally filtered by city
    pub async fn get_global_leaderboard(
        &self,
        limit: i64,
        city: Option<&str>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let rows = match city {
            Some(city) => {
                sqlx::query(
                    r#"
                    SELECT u.id, u.username, u.total_score, u.city,
                           COUNT(p.id) FILTER (WHERE p.completed_at IS NOT NULL) AS completed_levels,
                           COALESCE(SUM(p.stars), 0)::BIGINT AS total_stars
                    FROM users u
                    LEFT JOIN user_level_progress p ON p.user_id = u.id
                    WHERE u.is_verified = TRUE AND u.total_score > 0 AND u.city = $1
                    GROUP BY u.id
                    ORDER BY u.total_score DESC
                    LIMIT $2
                    "#,
                )
                .bind(city)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT u.id, u.username, u.total_score, u.city,
                           COUNT(p.id) FILTER (WHERE p.completed_at IS NOT NULL) AS completed_levels,
                           COALESCE(SUM(p.stars), 0)::BIGINT AS total_stars
                    FROM users u
                    LEFT JOIN user_level_progress p ON p.user_id = u.id
                    WHERE u.is_verified = TRUE AND u.total_score > 0
                    GROUP BY u.id
                    ORDER BY u.total_score DESC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let leaderboard = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| LeaderboardEntry {
                rank: idx + 1,
                user_id: row.get("id"),
                username: row.get("username"),
                total_score: row.get("total_score"),
                completed_levels: row.get("completed_levels"),
                total_stars: row.get("total_stars"),
                city: row.get("city"),
            })
            .collect();

        Ok(leaderboard)
    }

    /// Weekly leaderboard from won sessions since `week_start`
    pub async fn get_weekly_leaderboard(
        &self,
        week_start: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<WeeklyLeaderboardEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT s.user_id, u.username, SUM(s.score)::BIGINT AS weekly_score
            FROM game_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.created_at >= $1 AND s.is_won = TRUE AND u.is_verified = TRUE
            GROUP BY s.user_id, u.username
            ORDER BY weekly_score DESC
            LIMIT $2
            "#,
        )
        .bind(week_start)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let leaderboard = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| WeeklyLeaderboardEntry {
                rank: idx + 1,
                user_id: row.get("user_id"),
                username: row.get("username"),
                weekly_score: row.get("weekly_score"),
            })
            .collect();

        Ok(leaderboard)
    }

    /// Global and regional rank for one user
    pub async fn get_user_rank(&self, user: &DbUser) -> Result<MyRankResponse> {
        let global_rank: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE is_verified = TRUE AND total_score > $1
            "#,
        )
        .bind(user.total_score)
        .fetch_one(&self.pool)
        .await?;

        let total_players: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE is_verified = TRUE AND total_score > 0
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let regional_rank: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE is_verified = TRUE AND city = $1 AND total_score > $2
            "#,
        )
        .bind(&user.city)
        .bind(user.total_score)
        .fetch_one(&self.pool)
        .await?;

        let regional_total_players: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE is_verified = TRUE AND city = $1 AND total_score > 0
            "#,
        )
        .bind(&user.city)
        .fetch_one(&self.pool)
        .await?;

        Ok(MyRankResponse {
            rank: global_rank + 1,
            total_score: user.total_score,
            total_players,
            city: user.city.clone(),
            regional_rank: regional_rank + 1,
            regional_total_players,
        })
    }

    // === Activity Repository ===

    /// Best-effort activity log entry; failures are logged, never fatal.
    pub async fn log_activity(&self, user_id: i64, action: &str, details: serde_json::Value) {
        let result = sqlx::query(
            r#"
            INSERT INTO user_activities (user_id, action, details)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(details)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(action, "failed to log activity: {}", e);
        }
    }
}
