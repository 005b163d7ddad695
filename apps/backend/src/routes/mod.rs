pub mod auth;
pub mod game;
pub mod leaderboard;
pub mod levels;
pub mod quest;

use axum::http::HeaderMap;

/// Client address for rate-limit keys. Trusts the reverse proxy's
/// X-Real-IP header; absent one, all unproxied clients share a bucket.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
