//! Best-effort Redis cache.
//!
//! Holds verification codes, rate-limit counters, leaderboard snapshots,
//! and ephemeral game-session markers. The relational store is always
//! authoritative: when Redis is unconfigured or unreachable every read
//! misses and every write is a no-op, changing latency but never
//! correctness.

use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const VERIFICATION_CODE_TTL: u64 = 300; // 5 minutes
const VERIFICATION_CODE_PREFIX: &str = "verify:";

const RATE_LIMIT_PREFIX: &str = "ratelimit:";

const LEADERBOARD_PREFIX: &str = "leaderboard:";

const GAME_SESSION_TTL: u64 = 3600; // games shouldn't take longer
const GAME_SESSION_PREFIX: &str = "game_session:";

/// Active-session marker used for anti-cheat validation.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionMarker {
    pub user_id: i64,
    pub level_id: i64,
    pub started_at: DateTime<Utc>,
}

/// Redis-backed cache with graceful degradation.
#[derive(Clone)]
pub struct CacheService {
    conn: Option<ConnectionManager>,
}

impl CacheService {
    /// Connect to Redis. A missing URL or failed connection yields a
    /// disabled cache rather than an error.
    pub async fn connect(redis_url: Option<&str>) -> Self {
        let Some(url) = redis_url else {
            tracing::info!("REDIS_URL not set, running without cache");
            return Self { conn: None };
        };

        let client = match redis::Client::open(url) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!("invalid Redis URL, running without cache: {}", e);
                return Self { conn: None };
            }
        };

        match ConnectionManager::new(client).await {
            Ok(conn) => {
                tracing::info!("Connected to Redis");
                Self { conn: Some(conn) }
            }
            Err(e) => {
                tracing::warn!("Redis unreachable, running without cache: {}", e);
                Self { conn: None }
            }
        }
    }

    // === Verification codes ===

    /// Store a verification code with TTL. The DB column is the durable
    /// copy; this write is the latency optimization.
    pub async fn store_verification_code(&self, email: &str, code: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };

        let key = format!("{}{}", VERIFICATION_CODE_PREFIX, email.to_lowercase());
        if let Err(e) = conn
            .set_ex::<_, _, ()>(&key, code, VERIFICATION_CODE_TTL)
            .await
        {
            tracing::warn!("Redis error storing verification code: {}", e);
        }
    }

    /// Get a verification code, or None on miss or Redis failure.
    pub async fn get_verification_code(&self, email: &str) -> Option<String> {
        let mut conn = self.conn.clone()?;

        let key = format!("{}{}", VERIFICATION_CODE_PREFIX, email.to_lowercase());
        match conn.get::<_, Option<String>>(&key).await {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!("Redis error getting verification code: {}", e);
                None
            }
        }
    }

    /// Delete a verification code after successful verification.
    pub async fn delete_verification_code(&self, email: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };

        let key = format!("{}{}", VERIFICATION_CODE_PREFIX, email.to_lowercase());
        if let Err(e) = conn.del::<_, ()>(&key).await {
            tracing::warn!("Redis error deleting verification code: {}", e);
        }
    }

    // === Rate limiting ===

    /// Fixed-window rate limit check. Allows the request when Redis is
    /// unavailable.
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: u64) -> bool {
        let Some(mut conn) = self.conn.clone() else {
            return true;
        };

        let full_key = format!("{}{}", RATE_LIMIT_PREFIX, key);

        let current: Option<i64> = match conn.get(&full_key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Redis rate limit error: {}", e);
                return true;
            }
        };

        match current {
            None => {
                // First request in window
                if let Err(e) = conn.set_ex::<_, _, ()>(&full_key, 1i64, window_seconds).await {
                    tracing::warn!("Redis rate limit error: {}", e);
                }
                true
            }
            Some(count) if count >= limit => false,
            Some(_) => {
                if let Err(e) = conn.incr::<_, _, i64>(&full_key, 1i64).await {
                    tracing::warn!("Redis rate limit error: {}", e);
                }
                true
            }
        }
    }

    // === Leaderboard caching ===

    /// Cache a leaderboard snapshot for `ttl_seconds`.
    pub async fn cache_leaderboard<T: Serialize>(&self, key: &str, data: &T, ttl_seconds: u64) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };

        let payload = match serde_json::to_string(data) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("failed to serialize leaderboard: {}", e);
                return;
            }
        };

        let full_key = format!("{}{}", LEADERBOARD_PREFIX, key);
        if let Err(e) = conn.set_ex::<_, _, ()>(&full_key, payload, ttl_seconds).await {
            tracing::warn!("Redis error caching leaderboard: {}", e);
        }
    }

    /// Get a cached leaderboard snapshot.
    pub async fn get_cached_leaderboard<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone()?;

        let full_key = format!("{}{}", LEADERBOARD_PREFIX, key);
        let payload: Option<String> = match conn.get(&full_key).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Redis error getting leaderboard: {}", e);
                None
            }
        };

        payload.and_then(|p| serde_json::from_str(&p).ok())
    }

    // === Game session markers ===

    /// Record an active session marker for anti-cheat validation.
    pub async fn store_session_marker(&self, session_id: i64, user_id: i64, level_id: i64) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };

        let marker = SessionMarker {
            user_id,
            level_id,
            started_at: Utc::now(),
        };
        let payload = match serde_json::to_string(&marker) {
            Ok(payload) => payload,
            Err(_) => return,
        };

        let key = format!("{}{}", GAME_SESSION_PREFIX, session_id);
        if let Err(e) = conn.set_ex::<_, _, ()>(&key, payload, GAME_SESSION_TTL).await {
            tracing::warn!("Redis error storing game session: {}", e);
        }
    }

    /// Check a session marker against the submitting user.
    ///
    /// A missing marker (expired, never stored, or cache disabled) passes:
    /// the relational session row stays authoritative.
    pub async fn validate_session_marker(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> std::result::Result<(), String> {
        let Some(mut conn) = self.conn.clone() else {
            return Ok(());
        };

        let key = format!("{}{}", GAME_SESSION_PREFIX, session_id);
        let payload: Option<String> = match conn.get(&key).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Redis error getting game session: {}", e);
                None
            }
        };

        let Some(marker) = payload.and_then(|p| serde_json::from_str::<SessionMarker>(&p).ok())
        else {
            return Ok(());
        };

        if marker.user_id != user_id {
            return Err("Session does not belong to this user".to_string());
        }

        let elapsed = Utc::now().signed_duration_since(marker.started_at);
        if elapsed.num_seconds() > GAME_SESSION_TTL as i64 {
            return Err("Session expired".to_string());
        }

        Ok(())
    }

    /// Drop a session marker after completion.
    pub async fn delete_session_marker(&self, session_id: i64) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };

        let key = format!("{}{}", GAME_SESSION_PREFIX, session_id);
        if let Err(e) = conn.del::<_, ()>(&key).await {
            tracing::warn!("Redis error deleting game session: {}", e);
        }
    }
}
