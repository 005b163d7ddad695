pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;
use crate::services::cache::CacheService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub cache: Arc<CacheService>,
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect to database
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let redis_url = std::env::var("REDIS_URL").ok();
    let cache = CacheService::connect(redis_url.as_deref()).await;

    let state = AppState {
        db: Arc::new(db),
        cache: Arc::new(cache),
    };

    // Build router with protected routes
    let protected_routes = Router::new()
        // Account routes
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/auth/logout", post(routes::auth::logout))
        // Game routes
        .route("/api/game/start", post(routes::game::start))
        .route("/api/game/complete", post(routes::game::complete))
        .route("/api/levels/user/progress", get(routes::levels::user_progress))
        // Quest routes
        .route("/api/quest/scan", post(routes::quest::scan))
        .route("/api/quest/skip", post(routes::quest::skip))
        .route("/api/quest/progress", get(routes::quest::progress))
        .route("/api/quest/result", get(routes::quest::result))
        .route("/api/quest/claim-promo", post(routes::quest::claim_promo))
        // Leaderboard routes
        .route("/api/leaderboard/my-rank", get(routes::leaderboard::my_rank))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    // Build full router
    let app = Router::new()
        .route("/health", get(health_check))
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
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
