//! Common test utilities and fixtures for integration tests.
//!
//! Provides a TestContext wiring the router to a real database plus
//! helpers for creating users, levels, quest pages, and promo pools.
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL).
//! The cache is disabled, so every cache read misses and rate limits are
//! never enforced.

pub mod fixtures;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use serde_json::Value;

use crispy_crush_backend::db::Database;
use crispy_crush_backend::routes;
use crispy_crush_backend::services::cache::CacheService;
use crispy_crush_backend::AppState;

/// Test context containing database connection and test router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);

        let state = AppState {
            db: db.clone(),
            cache: Arc::new(CacheService::connect(None).await),
        };

        let app = build_test_router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Create a verified user with a bearer token.
    pub async fn create_verified_user(&self, email: &str) -> (i64, String) {
        let password_hash =
            bcrypt::hash("password123", 4).expect("Failed to hash test password");
        let user = self
            .db
            .create_user(
                email,
                &password_hash,
                "tester",
                "region",
                None,
                "game",
                "000000",
                chrono::Utc::now() + chrono::Duration::minutes(5),
            )
            .await
            .expect("Failed to create test user");

        self.db
            .mark_verified(user.id)
            .await
            .expect("Failed to verify test user");
        let token = self
            .db
            .issue_auth_token(user.id)
            .await
            .expect("Failed to issue test token");

        (user.id, token)
    }

    /// Insert a level with the given targets.
    pub async fn create_level(&self, name: &str, max_moves: i32, targets: Value) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO levels (name, sort_order, max_moves, targets)
            VALUES ($1, 0, $2, $3)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(max_moves)
        .bind(targets)
        .fetch_one(self.db.pool())
        .await
        .expect("Failed to create test level")
    }

    /// Insert an active quest page.
    pub async fn create_quest_page(
        &self,
        slug: &str,
        sort_order: i32,
        qr_token: &str,
        points: i32,
    ) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO quest_pages (slug, sort_order, title, riddle_text, fact_text,
                                    qr_token, points)
            VALUES ($1, $2, $3, 'Riddle text', 'Fact text', $4, $5)
            RETURNING id
            "#,
        )
        .bind(slug)
        .bind(sort_order)
        .bind(format!("Exhibit {}", sort_order))
        .bind(qr_token)
        .bind(points)
        .fetch_one(self.db.pool())
        .await
        .expect("Failed to create test quest page")
    }

    /// Insert a promo pool with the given number of unused codes.
    pub async fn create_promo_pool(
        &self,
        tier: &str,
        min_score: i64,
        code_count: usize,
    ) -> i64 {
        let pool_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO promo_code_pools (name, tier, min_score, discount_label, total_codes)
            VALUES ($1, $2, $3, '10% off', $4)
            RETURNING id
            "#,
        )
        .bind(format!("{} pool", tier))
        .bind(tier)
        .bind(min_score)
        .bind(code_count as i32)
        .fetch_one(self.db.pool())
        .await
        .expect("Failed to create test promo pool");

        for i in 0..code_count {
            sqlx::query(
                r#"
                INSERT INTO promo_codes (pool_id, code)
                VALUES ($1, $2)
                "#,
            )
            .bind(pool_id)
            .bind(format!("{}-{}-{}", tier, pool_id, i))
            .execute(self.db.pool())
            .await
            .expect("Failed to create test promo code");
        }

        pool_id
    }

    /// Set a user's cumulative quest score directly.
    pub async fn set_quest_score(&self, user_id: i64, quest_score: i64) {
        sqlx::query("UPDATE users SET quest_score = $2 WHERE id = $1")
            .bind(user_id)
            .bind(quest_score)
            .execute(self.db.pool())
            .await
            .expect("Failed to set quest score");
    }

    /// Clean up a user and everything hanging off it.
    pub async fn cleanup_user(&self, user_id: i64) {
        // promo_codes reference users with SET NULL; the rest cascades.
        let _ = sqlx::query("DELETE FROM promo_codes WHERE used_by_user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }

    /// Clean up a level and its sessions/progress.
    pub async fn cleanup_level(&self, level_id: i64) {
        let _ = sqlx::query("DELETE FROM levels WHERE id = $1")
            .bind(level_id)
            .execute(self.db.pool())
            .await;
    }

    /// Clean up a quest page and its progress entries.
    pub async fn cleanup_quest_page(&self, page_id: i64) {
        let _ = sqlx::query("DELETE FROM quest_pages WHERE id = $1")
            .bind(page_id)
            .execute(self.db.pool())
            .await;
    }

    /// Clean up a promo pool and its codes.
    pub async fn cleanup_promo_pool(&self, pool_id: i64) {
        let _ = sqlx::query("DELETE FROM promo_code_pools WHERE id = $1")
            .bind(pool_id)
            .execute(self.db.pool())
            .await;
    }
}

/// Build the test router with all routes.
fn build_test_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/game/start", post(routes::game::start))
        .route("/api/game/complete", post(routes::game::complete))
        .route(
            "/api/levels/user/progress",
            get(routes::levels::user_progress),
        )
        .route("/api/quest/scan", post(routes::quest::scan))
        .route("/api/quest/skip", post(routes::quest::skip))
        .route("/api/quest/progress", get(routes::quest::progress))
        .route("/api/quest/result", get(routes::quest::result))
        .route("/api/quest/claim-promo", post(routes::quest::claim_promo))
        .route(
            "/api/leaderboard/my-rank",
            get(routes::leaderboard::my_rank),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/verify", post(routes::auth::verify_email))
        .route("/api/auth/resend-code", post(routes::auth::resend_code))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/levels", get(routes::levels::list))
        .route("/api/levels/{level_id}", get(routes::levels::get_one))
        .route(
            "/api/levels/{level_id}/leaderboard",
            get(routes::levels::leaderboard),
        )
        .route("/api/quest/pages", get(routes::quest::pages))
        .route("/api/quest/pages/{slug}", get(routes::quest::page))
        .route("/api/leaderboard", get(routes::leaderboard::global))
        .route("/api/leaderboard/weekly", get(routes::leaderboard::weekly))
        .merge(protected_routes)
        .with_state(state)
}
