//! Test fixtures and factory functions for creating test data.

use serde_json::{json, Value};
use uuid::Uuid;

/// Generate a unique test email to avoid collisions.
pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, &Uuid::new_v4().to_string()[..8])
}

/// Generate a unique quest page slug.
pub fn unique_slug(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().to_string()[..8])
}

/// Generate a unique QR token.
pub fn unique_qr_token() -> String {
    format!("qr-{}", Uuid::new_v4())
}

/// Level targets with a collect goal and a score goal.
pub fn targets_collect_and_score(item: &str, count: u32, min_score: i64) -> Value {
    json!({ "collect": { item: count }, "min_score": min_score })
}

/// Level targets with only a collect goal.
pub fn targets_collect_only(item: &str, count: u32) -> Value {
    json!({ "collect": { item: count } })
}

/// Create a register request body.
pub fn register_request(email: &str, password: &str, source: Option<&str>) -> Value {
    match source {
        Some(s) => json!({
            "email": email,
            "password": password,
            "username": "tester",
            "source": s,
        }),
        None => json!({
            "email": email,
            "password": password,
            "username": "tester",
        }),
    }
}

/// Create a verify request body.
pub fn verify_request(email: &str, code: &str) -> Value {
    json!({ "email": email, "code": code })
}

/// Create a login request body.
pub fn login_request(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

/// Create a game start request body.
pub fn start_game_request(level_id: i64) -> Value {
    json!({ "level_id": level_id })
}

/// Create a game complete request body.
pub fn complete_game_request(
    session_id: i64,
    score: i64,
    moves_used: i32,
    targets_met: Value,
) -> Value {
    json!({
        "session_id": session_id,
        "score": score,
        "moves_used": moves_used,
        "targets_met": targets_met,
        "duration_seconds": 120,
    })
}

/// Create a quest scan request body.
pub fn scan_request(qr_token: &str) -> Value {
    json!({ "qr_token": qr_token })
}
