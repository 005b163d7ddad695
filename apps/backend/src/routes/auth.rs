//! Authentication middleware and account endpoints

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use chrono::{Duration, Utc};
use rand::Rng;
use serde_json::json;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::client_ip;
use crate::AppState;

/// Authenticated user info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

/// Auth middleware - extracts bearer token from Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?;

    let user = state
        .db
        .get_user_by_auth_token(token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid access token".to_string()))?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id: user.id });

    Ok(next.run(request).await)
}

fn generate_verification_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    let key = format!("{}:register", client_ip(&headers));
    if !state.cache.check_rate_limit(&key, 3, 3600).await {
        return Err(ApiError::RateLimited);
    }

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let city = match payload.city.as_deref() {
        Some("moscow") => "moscow",
        _ => "region",
    };
    let source = match payload.source.as_deref() {
        Some("quest") => "quest",
        _ => "game",
    };

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let code = generate_verification_code();
    let user = state
        .db
        .create_user(
            &email,
            &password_hash,
            &username,
            city,
            payload.city_name.as_deref().map(str::trim).filter(|c| !c.is_empty()),
            source,
            &code,
            Utc::now() + Duration::minutes(5),
        )
        .await?;

    // The cached copy carries its own TTL; the DB column above is the
    // durable fallback.
    state.cache.store_verification_code(&email, &code).await;

    // Email delivery is handled by an external sender watching the log.
    tracing::info!(user_id = user.id, "verification code issued");

    state.db.log_activity(user.id, "register", json!({})).await;

    Ok(Json(RegisterResponse {
        message: "Registration successful. Please check your email for verification code."
            .to_string(),
        user: user.to_api_user(),
    }))
}

/// POST /api/auth/verify
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<VerifyEmailResponse>> {
    let email = payload.email.trim().to_lowercase();
    let code = payload.code.trim().to_string();

    if email.is_empty() || code.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and verification code are required".to_string(),
        ));
    }

    let key = format!("verify:{}", email);
    if !state.cache.check_rate_limit(&key, 10, 60).await {
        return Err(ApiError::RateLimited);
    }

    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if user.is_verified {
        return Err(ApiError::Conflict("Email already verified".to_string()));
    }

    // Cache first, DB fallback.
    let cached_code = state.cache.get_verification_code(&email).await;
    let stored_code = cached_code.clone().or_else(|| user.verification_code.clone());

    if stored_code.as_deref() != Some(code.as_str()) {
        return Err(ApiError::BadRequest(
            "Invalid verification code".to_string(),
        ));
    }

    // The cached copy expires on its own; the DB fallback needs the
    // explicit expiry check.
    if cached_code.is_none() {
        if let Some(expires_at) = user.verification_expires_at {
            if expires_at < Utc::now() {
                return Err(ApiError::BadRequest(
                    "Verification code expired".to_string(),
                ));
            }
        }
    }

    state.db.mark_verified(user.id).await?;
    let access_token = state.db.issue_auth_token(user.id).await?;

    state.cache.delete_verification_code(&email).await;

    state.db.log_activity(user.id, "verify_email", json!({})).await;

    let user = state
        .db
        .get_user(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(VerifyEmailResponse {
        message: "Email verified successfully".to_string(),
        access_token,
        user: user.to_api_user(),
    }))
}

/// POST /api/auth/resend-code
pub async fn resend_code(
    State(state): State<AppState>,
    Json(payload): Json<ResendCodeRequest>,
) -> Result<Json<MessageResponse>> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }

    let key = format!("resend:{}", email);
    if !state.cache.check_rate_limit(&key, 3, 600).await {
        return Err(ApiError::RateLimited);
    }

    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if user.is_verified {
        return Err(ApiError::Conflict("Email already verified".to_string()));
    }

    let code = generate_verification_code();
    state
        .db
        .set_verification_code(user.id, &code, Utc::now() + Duration::minutes(5))
        .await?;
    state.cache.store_verification_code(&email, &code).await;

    tracing::info!(user_id = user.id, "verification code reissued");

    Ok(Json(MessageResponse {
        message: "Verification code sent".to_string(),
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let key = format!("{}:login", client_ip(&headers));
    if !state.cache.check_rate_limit(&key, 5, 60).await {
        return Err(ApiError::RateLimited);
    }

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let password_ok = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !password_ok {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    if !user.is_verified {
        return Err(ApiError::Unauthorized(
            "Please verify your email first".to_string(),
        ));
    }

    state.db.update_last_login(user.id).await?;
    let access_token = state.db.issue_auth_token(user.id).await?;

    state.db.log_activity(user.id, "login", json!({})).await;

    Ok(Json(LoginResponse {
        access_token,
        user: user.to_api_user(),
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<MeResponse>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse {
        user: user.to_api_user(),
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<MessageResponse>> {
    state.db.clear_auth_token(auth.user_id).await?;
    state.db.log_activity(auth.user_id, "logout", json!({})).await;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}
